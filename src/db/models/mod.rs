pub mod call;
pub mod document;

pub use call::{transcript_items, transcript_messages, Call, CallAnnotation, CallMessage, MessageRole};
pub use document::{Document, DocumentView};
