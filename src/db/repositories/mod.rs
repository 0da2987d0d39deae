pub mod calls;
pub mod documents;
