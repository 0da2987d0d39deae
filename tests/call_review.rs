use std::collections::BTreeMap;

use tempfile::TempDir;
use voicetrace_lib::{
    db::models::{CallAnnotation, CallMessage, MessageRole},
    history::{
        commands::{
            create_document, delete_document, get_document, redo_document_edit,
            remove_document_content, undo_document_edit, RemovalInput,
        },
        TextRemoval,
    },
    timeline::{
        commands::{delete_call, get_call_timeline, import_call, CallImport},
        AnnotationKind, HighlightOutcome, PlaybackMode, TimelineConfig,
    },
    compute_overlaps, Annotation, AppState, EditLogStore, OverlapRange, TimedItem,
};

fn ids(map: &voicetrace_lib::OverlapMap) -> BTreeMap<usize, Vec<String>> {
    map.item_to_annotations
        .iter()
        .map(|(index, list)| (*index, list.iter().map(|a| a.id.clone()).collect()))
        .collect()
}

#[test]
fn three_message_scenario() {
    let items = vec![
        TimedItem::new(0, 0.0),
        TimedItem::new(1, 5.0),
        TimedItem::new(2, 10.0),
    ];
    let annotations = vec![Annotation::new("e1", 6.0, 2.0)];

    let map = compute_overlaps(&items, &annotations);

    assert_eq!(ids(&map), BTreeMap::from([(1, vec!["e1".to_string()])]));
    assert_eq!(
        map.annotation_to_range,
        BTreeMap::from([("e1".to_string(), OverlapRange::new(1, 1))])
    );
}

#[test]
fn transitive_chain_spreads_to_every_item() {
    let items = TimedItem::sequence([0.0, 10.0, 20.0, 30.0, 40.0, 50.0]);
    let annotations = vec![
        Annotation::new("C", 28.0, 4.0), // items 2-3
        Annotation::new("A", 8.0, 4.0),  // items 0-1
        Annotation::new("B", 18.0, 4.0), // items 1-2
    ];

    let map = compute_overlaps(&items, &annotations);

    for id in ["A", "B", "C"] {
        assert_eq!(map.range_of(id), Some(OverlapRange::new(0, 3)));
    }
    for index in 0..=3 {
        let listed: Vec<_> = map.annotations_for(index).iter().map(|a| a.id.as_str()).collect();
        assert_eq!(listed, vec!["C", "A", "B"]);
    }
    assert!(map.annotations_for(4).is_empty());
}

#[test]
fn undo_redo_sequence_from_a_fresh_log() {
    let mut log = EditLogStore::new();
    log.record_edit("x1");
    log.record_edit("x2");
    log.undo();
    log.undo();
    log.redo();

    assert_eq!(log.undo_stack(), ["x1"]);
    assert_eq!(log.redo_stack(), ["x2"]);
    assert_eq!(log.redo().as_deref(), Some("x2"));
    assert_eq!(log.undo_stack(), ["x1", "x2"]);
    assert!(log.redo_stack().is_empty());
}

fn call_import() -> CallImport {
    let message = |id: &str, role, at: f64, duration: f64| CallMessage {
        id: id.into(),
        role,
        content: format!("message {id}"),
        seconds_from_start: at,
        duration: Some(duration),
    };
    let annotation = |id: &str, kind, at: f64, duration: f64, success| CallAnnotation {
        id: id.into(),
        kind,
        name: None,
        seconds_from_start: at,
        duration,
        success,
    };

    CallImport {
        id: "call-42".into(),
        agent_id: Some("agent-1".into()),
        transcribed_locally: false,
        messages: vec![
            message("sys", MessageRole::System, 0.0, 0.0),
            message("m0", MessageRole::Bot, 2.0, 2.5),
            message("m1", MessageRole::User, 6.0, 3.0),
            message("m2", MessageRole::Bot, 11.0, 4.0),
        ],
        annotations: vec![
            annotation("greet", AnnotationKind::Evaluation, 2.5, 5.0, Some(true)),
            annotation("intent", AnnotationKind::Evaluation, 7.0, 1.0, Some(false)),
            annotation("lat", AnnotationKind::Latency, 9.0, 2.0, None),
        ],
    }
}

#[tokio::test]
async fn stored_call_produces_merged_timeline() {
    let dir = TempDir::new().unwrap();
    let state = AppState::open(dir.path()).unwrap();

    import_call(&state, call_import()).await.unwrap();
    let timeline = get_call_timeline(&state, "call-42".into(), Some("lat".into()), Some(5.0))
        .await
        .unwrap();

    assert_eq!(timeline.items.len(), 3);
    assert_eq!(timeline.offset_from_start, 2.0);
    let message_ids: Vec<_> = timeline.messages.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(message_ids, vec!["m0", "m1", "m2"]);
    assert_eq!(timeline.active_item, Some(1));

    let report = &timeline.report;
    assert_eq!(report.overlaps.range_of("greet"), Some(OverlapRange::new(0, 1)));
    assert_eq!(report.overlaps.range_of("intent"), Some(OverlapRange::new(0, 1)));
    assert_eq!(report.highlights[&0].outcome, HighlightOutcome::Mixed);
    assert!(report.highlights[&0].is_first);
    assert!(report.highlights[&1].is_last);
    assert_eq!(report.latency_before.get(&2).map(String::as_str), Some("lat"));
    assert_eq!(report.active_items, vec![2]);
}

#[tokio::test]
async fn unknown_call_is_an_error() {
    let dir = TempDir::new().unwrap();
    let state = AppState::open(dir.path()).unwrap();

    let err = get_call_timeline(&state, "nope".into(), None, None)
        .await
        .unwrap_err();
    assert!(err.contains("not found"));
}

#[tokio::test]
async fn playback_mode_setting_picks_the_active_item() {
    let dir = TempDir::new().unwrap();
    let state = AppState::open(dir.path()).unwrap();
    import_call(&state, call_import()).await.unwrap();

    // 3s into the recording: m0 ended at 2.5s, m1 starts at 4s.
    let test_mode = get_call_timeline(&state, "call-42".into(), None, Some(3.0))
        .await
        .unwrap();
    assert_eq!(test_mode.active_item, Some(0));

    state
        .settings
        .update_timeline(TimelineConfig {
            playback_mode: PlaybackMode::Latency,
            ..TimelineConfig::default()
        })
        .unwrap();
    let latency_mode = get_call_timeline(&state, "call-42".into(), None, Some(3.0))
        .await
        .unwrap();
    assert_eq!(latency_mode.active_item, Some(1));

    let idle = get_call_timeline(&state, "call-42".into(), None, None)
        .await
        .unwrap();
    assert_eq!(idle.active_item, None);
}

#[tokio::test]
async fn deleting_records_removes_them() {
    let dir = TempDir::new().unwrap();
    let state = AppState::open(dir.path()).unwrap();

    import_call(&state, call_import()).await.unwrap();
    delete_call(&state, "call-42".into()).await.unwrap();
    assert!(get_call_timeline(&state, "call-42".into(), None, None).await.is_err());
    assert!(delete_call(&state, "call-42".into()).await.is_err());

    let doc = create_document(&state, "Flyer".into(), None).await.unwrap();
    delete_document(&state, doc.id.clone()).await.unwrap();
    assert!(get_document(&state, doc.id.clone()).await.is_err());
    assert!(delete_document(&state, doc.id).await.is_err());
}

#[tokio::test]
async fn caller_supplied_ids_cannot_corrupt_a_document() {
    let dir = TempDir::new().unwrap();
    let state = AppState::open(dir.path()).unwrap();
    let doc = create_document(&state, "Flyer".into(), None).await.unwrap();

    let input: RemovalInput = serde_json::from_value(serde_json::json!({
        "text": [{ "id": "client", "page": 0, "text": "Sale", "x": 0.0, "y": 0.0, "width": 5.0, "height": 2.0 }],
        "rectangles": [
            { "id": "dup", "page": 0, "x": 0.0, "y": 0.0, "width": 3.0, "height": 3.0 },
            { "id": "dup", "page": 1, "x": 0.0, "y": 0.0, "width": 3.0, "height": 3.0 }
        ]
    }))
    .unwrap();

    let outcome = remove_document_content(&state, doc.id.clone(), input).await.unwrap();
    assert_eq!(outcome.edit_ids.len(), 3);
    assert!(!outcome.edit_ids.iter().any(|id| id == "dup" || id == "client"));
    assert_eq!(outcome.document.visible_text.len(), 1);
    assert_eq!(outcome.document.visible_rectangles.len(), 2);

    undo_document_edit(&state, doc.id.clone()).await.unwrap();
    let reloaded = get_document(&state, doc.id).await.unwrap();
    assert_eq!(reloaded.visible_rectangles.len(), 1);
    assert!(reloaded.can_redo);
}

#[tokio::test]
async fn document_edits_persist_across_reopen() {
    let dir = TempDir::new().unwrap();
    let doc_id = {
        let state = AppState::open(dir.path()).unwrap();
        let doc = create_document(&state, "Listing".into(), None).await.unwrap();

        let input = RemovalInput {
            text: vec![TextRemoval {
                id: None,
                page: 0,
                text: "Call now".into(),
                x: 10.0,
                y: 10.0,
                width: 40.0,
                height: 6.0,
            }],
            ..RemovalInput::default()
        };
        let outcome = remove_document_content(&state, doc.id.clone(), input)
            .await
            .unwrap();
        assert_eq!(outcome.edit_ids.len(), 1);
        assert_eq!(outcome.document.visible_text.len(), 1);

        let undone = undo_document_edit(&state, doc.id.clone()).await.unwrap();
        assert_eq!(undone.edit_ids, outcome.edit_ids);
        assert!(undone.document.visible_text.is_empty());
        assert!(undone.document.can_redo);

        let noop = undo_document_edit(&state, doc.id.clone()).await.unwrap();
        assert!(noop.edit_ids.is_empty());
        doc.id
    };

    let state = AppState::open(dir.path()).unwrap();
    let redone = redo_document_edit(&state, doc_id).await.unwrap();
    assert_eq!(redone.edit_ids.len(), 1);
    assert_eq!(redone.document.visible_text.len(), 1);
    assert!(!redone.document.can_redo);
}
