//! Structured logging field names.
//!
//! Fields declared `tracing::field::Empty` in an `#[instrument]` attribute and
//! filled in later with `Span::record`. Recording a name the span did not
//! declare is silently dropped, so these must match the declarations.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, request rejected for a client-side reason |
//! | INFO  | Lifecycle events (startup, shutdown), mutations, dispatches |
//! | DEBUG | Decision points, query parameters |
//! | TRACE | Per-item iteration |

/// Batch identifier returned by the job queue.
pub const BATCH_ID: &str = "batch_id";

/// Number of items submitted in a batch.
pub const ITEM_COUNT: &str = "item_count";

/// Number of rows returned by a query.
pub const RESULT_COUNT: &str = "result_count";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_names_are_snake_case() {
        for name in [BATCH_ID, ITEM_COUNT, RESULT_COUNT] {
            assert!(name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c == '_'));
        }
    }
}
