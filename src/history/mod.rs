pub mod commands;
pub mod document;
pub mod edit_log;
pub mod ids;

pub use document::{EditTagged, PathRemoval, Rectangle, RemovalEdits, TextRemoval};
pub use edit_log::{EditLogSnapshot, EditLogStore};
pub use ids::{IdGenerator, SequentialIds, UuidIds};
