//! Terminal request handlers.

pub mod docs;
pub mod users;

pub use docs::DocsHandlers;
pub use users::UserHandlers;
