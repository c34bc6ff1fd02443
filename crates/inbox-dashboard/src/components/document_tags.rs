//! Tag picker for a single document.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use inbox_core::{DocumentTagAssignment, DocumentTagAssignmentRequest};

use crate::client::Procedures;
use crate::error::Result;
use crate::mutations::{CreateDocumentTagAssignment, DeleteDocumentTagAssignment, MutationDef};
use crate::query::QueryCache;

/// One entry of the tag select.
///
/// `id` is `None` for a tag the user typed that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagOption {
    pub value: String,
    pub label: String,
    pub id: Option<Uuid>,
}

impl From<&DocumentTagAssignment> for TagOption {
    fn from(assignment: &DocumentTagAssignment) -> Self {
        let tag = &assignment.document_tag;
        Self {
            value: tag.id.to_string(),
            label: tag.name.clone(),
            id: Some(tag.id),
        }
    }
}

pub struct DocumentTags {
    document_id: Uuid,
    tags: Option<Vec<DocumentTagAssignment>>,
    procedures: Arc<dyn Procedures>,
    cache: Arc<QueryCache>,
}

impl DocumentTags {
    pub fn new(
        document_id: Uuid,
        tags: Option<Vec<DocumentTagAssignment>>,
        procedures: Arc<dyn Procedures>,
        cache: Arc<QueryCache>,
    ) -> Self {
        Self {
            document_id,
            tags,
            procedures,
            cache,
        }
    }

    /// Select options for the current assignments, or `None` when the
    /// document's tags have not loaded (nothing is shown).
    pub fn options(&self) -> Option<Vec<TagOption>> {
        self.tags
            .as_ref()
            .map(|tags| tags.iter().map(TagOption::from).collect())
    }

    /// Assign the selected tag. Returns `Ok(false)` without calling the API
    /// when the option has no id.
    pub async fn on_select(&self, tag: &TagOption) -> Result<bool> {
        let Some(tag_id) = tag.id else {
            debug!(subsystem = "dashboard", label = %tag.label, "Ignoring tag without id");
            return Ok(false);
        };
        self.procedures
            .create_document_tag_assignment(self.link(tag_id))
            .await?;
        self.cache.apply(&CreateDocumentTagAssignment::invalidates());
        info!(
            subsystem = "dashboard",
            op = CreateDocumentTagAssignment::PATH,
            document_id = %self.document_id,
            tag_id = %tag_id,
            "Tag assigned"
        );
        Ok(true)
    }

    /// Remove the tag from the document. Options without an id were never
    /// assigned, so there is nothing to remove.
    pub async fn on_remove(&self, tag: &TagOption) -> Result<bool> {
        let Some(tag_id) = tag.id else {
            return Ok(false);
        };
        self.procedures
            .delete_document_tag_assignment(self.link(tag_id))
            .await?;
        self.cache.apply(&DeleteDocumentTagAssignment::invalidates());
        info!(
            subsystem = "dashboard",
            op = DeleteDocumentTagAssignment::PATH,
            document_id = %self.document_id,
            tag_id = %tag_id,
            "Tag removed"
        );
        Ok(true)
    }

    fn link(&self, tag_id: Uuid) -> DocumentTagAssignmentRequest {
        DocumentTagAssignmentRequest {
            tag_id,
            document_id: self.document_id,
        }
    }
}
