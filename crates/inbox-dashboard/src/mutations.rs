//! Mutation definitions.
//!
//! Each mutation names its procedure and the queries a success makes stale.
//! Components apply [`MutationDef::invalidates`] to the shared
//! [`QueryCache`](crate::QueryCache) only after the call returns `Ok`.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::query::{Invalidation, QueryFamily, QueryKey};

pub trait MutationDef {
    /// Dotted procedure path.
    const PATH: &'static str;

    fn invalidates() -> Invalidation;
}

/// Queries touched by any change to a document's tags.
fn document_tag_queries() -> Invalidation {
    Invalidation::Keys(vec![
        QueryKey::query(QueryFamily::DocumentsGetById),
        QueryKey::infinite(QueryFamily::DocumentsGet),
        QueryKey::query(QueryFamily::DocumentTagsGet),
    ])
}

pub struct CreateDocumentTagAssignment;

impl MutationDef for CreateDocumentTagAssignment {
    const PATH: &'static str = "documentTagAssignments.create";

    fn invalidates() -> Invalidation {
        document_tag_queries()
    }
}

pub struct DeleteDocumentTagAssignment;

impl MutationDef for DeleteDocumentTagAssignment {
    const PATH: &'static str = "documentTagAssignments.delete";

    fn invalidates() -> Invalidation {
        document_tag_queries()
    }
}

/// Creating a team caches nothing; the follow-up switch invalidates.
pub struct CreateTeam;

impl MutationDef for CreateTeam {
    const PATH: &'static str = "team.create";

    fn invalidates() -> Invalidation {
        Invalidation::none()
    }
}

/// Updating the user may switch the active team, so every cached query is
/// potentially from the wrong tenant.
pub struct UpdateUser;

impl MutationDef for UpdateUser {
    const PATH: &'static str = "user.update";

    fn invalidates() -> Invalidation {
        Invalidation::All
    }
}

/// In-flight flag for a mutation, cleared when the guard drops.
#[derive(Debug, Default)]
pub struct Pending(AtomicBool);

impl Pending {
    pub fn is_pending(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn start(&self) -> PendingGuard<'_> {
        self.0.store(true, Ordering::SeqCst);
        PendingGuard(&self.0)
    }
}

pub struct PendingGuard<'a>(&'a AtomicBool);

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn families(invalidation: Invalidation) -> Vec<QueryFamily> {
        match invalidation {
            Invalidation::Keys(keys) => keys.into_iter().map(|k| k.family).collect(),
            Invalidation::All => panic!("expected keys"),
        }
    }

    #[test]
    fn test_assignment_mutations_invalidate_three_families() {
        let expected = vec![
            QueryFamily::DocumentsGetById,
            QueryFamily::DocumentsGet,
            QueryFamily::DocumentTagsGet,
        ];
        assert_eq!(families(CreateDocumentTagAssignment::invalidates()), expected);
        assert_eq!(families(DeleteDocumentTagAssignment::invalidates()), expected);
    }

    #[test]
    fn test_team_mutations() {
        assert!(CreateTeam::invalidates().is_empty());
        assert_eq!(UpdateUser::invalidates(), Invalidation::All);
        assert_eq!(UpdateUser::PATH, "user.update");
    }

    #[test]
    fn test_pending_guard_clears_on_drop() {
        let pending = Pending::default();
        {
            let _guard = pending.start();
            assert!(pending.is_pending());
        }
        assert!(!pending.is_pending());
    }
}
