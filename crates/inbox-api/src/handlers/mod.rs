//! HTTP handlers, one module per resource.

pub mod document_tags;
pub mod documents;
pub mod inbox;
pub mod teams;
pub mod users;
