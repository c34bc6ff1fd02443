//! # inbox-dashboard
//!
//! Client-side logic of the inbox dashboard: the query cache and its
//! invalidation rules, the mutation definitions, an HTTP procedure client and
//! the headless `DocumentTags` and `CreateTeamForm` components.
//!
//! Rendering is left to the embedding UI. Components only read cached data,
//! call procedures and invalidate what a successful mutation made stale.

pub mod client;
pub mod components;
pub mod error;
pub mod mutations;
pub mod navigation;
pub mod query;

pub use client::{ClientConfig, HttpProcedures, Procedures};
pub use components::{CreateTeamForm, CreateTeamValues, DocumentTags, TagOption};
pub use error::{ClientError, CreateTeamError, Result};
pub use mutations::{
    CreateDocumentTagAssignment, CreateTeam, DeleteDocumentTagAssignment, MutationDef, Pending,
    UpdateUser,
};
pub use navigation::{History, Navigator};
pub use query::{Invalidation, QueryCache, QueryFamily, QueryKey, QueryKind};
