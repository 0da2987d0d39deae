use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    history::commands::{
        create_document, delete_document, get_document, redo_document_edit,
        remove_document_content, set_page_deleted, undo_document_edit, RemovalInput,
    },
    timeline::commands::{
        compute_overlap_report, delete_call, get_call_timeline, import_call, CallImport,
        TimelineInput,
    },
    AppState,
};

#[derive(Debug, Parser)]
#[command(name = "voicetrace", about = "Review annotated call transcripts and undoable document edits")]
pub struct Cli {
    /// Directory holding the SQLite database and settings.json.
    #[arg(long, env = "VOICETRACE_DATA_DIR", default_value = ".voicetrace")]
    pub data_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Map annotations onto transcript items from a JSON file.
    Overlaps {
        #[arg(long)]
        input: PathBuf,
    },
    /// Store a call (messages and annotations) from a JSON file.
    ImportCall {
        #[arg(long)]
        input: PathBuf,
    },
    /// Print the overlap report for a stored call.
    CallTimeline {
        #[arg(long)]
        call_id: String,
        /// Annotation currently hovered or selected.
        #[arg(long)]
        active: Option<String>,
        /// Playback position in seconds from the start of the recording.
        #[arg(long)]
        at: Option<f64>,
    },
    /// Delete a stored call with its messages and annotations.
    DeleteCall {
        #[arg(long)]
        call_id: String,
    },
    DocCreate {
        #[arg(long)]
        title: String,
        #[arg(long)]
        source_url: Option<String>,
    },
    /// Remove content described by a JSON file from a document.
    DocRemove {
        #[arg(long)]
        doc_id: String,
        #[arg(long)]
        input: PathBuf,
    },
    DocUndo {
        #[arg(long)]
        doc_id: String,
    },
    DocRedo {
        #[arg(long)]
        doc_id: String,
    },
    DocShow {
        #[arg(long)]
        doc_id: String,
    },
    DocDelete {
        #[arg(long)]
        doc_id: String,
    },
    DocDeletePage {
        #[arg(long)]
        doc_id: String,
        #[arg(long)]
        page: u32,
        /// Restore the page instead of deleting it.
        #[arg(long)]
        restore: bool,
    },
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Execute one CLI command against the state in `cli.data_dir`.
pub async fn dispatch(cli: Cli) -> Result<()> {
    let state = AppState::open(&cli.data_dir)?;

    match cli.command {
        Command::Overlaps { input } => {
            let input: TimelineInput = read_json(&input)?;
            let report = compute_overlap_report(&state, &input).map_err(|e| anyhow!(e))?;
            print_json(&report)
        }
        Command::ImportCall { input } => {
            let input: CallImport = read_json(&input)?;
            let call = import_call(&state, input).await.map_err(|e| anyhow!(e))?;
            print_json(&call)
        }
        Command::CallTimeline {
            call_id,
            active,
            at,
        } => {
            let timeline = get_call_timeline(&state, call_id, active, at)
                .await
                .map_err(|e| anyhow!(e))?;
            print_json(&timeline)
        }
        Command::DeleteCall { call_id } => {
            delete_call(&state, call_id).await.map_err(|e| anyhow!(e))
        }
        Command::DocCreate { title, source_url } => {
            let doc = create_document(&state, title, source_url)
                .await
                .map_err(|e| anyhow!(e))?;
            print_json(&doc)
        }
        Command::DocRemove { doc_id, input } => {
            let input: RemovalInput = read_json(&input)?;
            let outcome = remove_document_content(&state, doc_id, input)
                .await
                .map_err(|e| anyhow!(e))?;
            print_json(&outcome)
        }
        Command::DocUndo { doc_id } => {
            let outcome = undo_document_edit(&state, doc_id).await.map_err(|e| anyhow!(e))?;
            print_json(&outcome)
        }
        Command::DocRedo { doc_id } => {
            let outcome = redo_document_edit(&state, doc_id).await.map_err(|e| anyhow!(e))?;
            print_json(&outcome)
        }
        Command::DocShow { doc_id } => {
            let doc = get_document(&state, doc_id).await.map_err(|e| anyhow!(e))?;
            print_json(&doc)
        }
        Command::DocDelete { doc_id } => {
            delete_document(&state, doc_id).await.map_err(|e| anyhow!(e))
        }
        Command::DocDeletePage {
            doc_id,
            page,
            restore,
        } => {
            let doc = set_page_deleted(&state, doc_id, page, !restore)
                .await
                .map_err(|e| anyhow!(e))?;
            print_json(&doc)
        }
    }
}
