//! Task definitions.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

use inbox_core::{ProcessAttachmentInput, TeamScope};

/// A named background task with a typed payload.
pub trait Task {
    /// Identifier the job runner dispatches on.
    const ID: &'static str;

    type Payload: Serialize + DeserializeOwned + Send + Sync;
}

/// Extract data from an uploaded inbox attachment.
pub struct ProcessAttachment;

impl Task for ProcessAttachment {
    const ID: &'static str = "process-attachment";

    type Payload = ProcessAttachmentPayload;
}

/// Payload of one `process-attachment` run.
///
/// Serialized in camelCase; this is the shape the job runner reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessAttachmentPayload {
    pub file_path: String,
    pub mimetype: String,
    pub size: i64,
    pub team_id: Uuid,
}

impl ProcessAttachmentPayload {
    /// Merge the caller's team into a client-supplied attachment.
    pub fn scoped(scope: &TeamScope, input: ProcessAttachmentInput) -> Self {
        Self {
            file_path: input.file_path,
            mimetype: input.mimetype,
            size: input.size,
            team_id: scope.team_id,
        }
    }
}
