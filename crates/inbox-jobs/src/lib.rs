//! # inbox-jobs
//!
//! Typed dispatch of background tasks to the job queue.
//!
//! Dispatch is one-way: [`TaskClient::batch_trigger`] returns once the queue
//! has accepted the batch and hands back a [`BatchHandle`]. Running the tasks
//! is the job runner's business.
//!
//! ## Example
//!
//! ```ignore
//! use inbox_jobs::{ProcessAttachment, TaskClient};
//!
//! let client = TaskClient::new(db.jobs.clone());
//! let handle = client
//!     .batch_trigger::<ProcessAttachment>(&scope, payloads)
//!     .await?;
//! ```

pub mod client;
pub mod task;

// Re-export core types
pub use inbox_core::{BatchHandle, RunHandle};

pub use client::TaskClient;
pub use task::{ProcessAttachment, ProcessAttachmentPayload, Task};
