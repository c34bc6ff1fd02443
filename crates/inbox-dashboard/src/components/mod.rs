//! Headless dashboard components.

pub mod create_team_form;
pub mod document_tags;

#[cfg(test)]
pub(crate) mod fake;

pub use create_team_form::{CreateTeamForm, CreateTeamValues};
pub use document_tags::{DocumentTags, TagOption};
