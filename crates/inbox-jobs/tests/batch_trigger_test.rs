//! Batch dispatch against the in-memory queue.

use std::sync::Arc;

use inbox_core::{Error, JobRepository, ProcessAttachmentInput, TeamScope};
use inbox_db::MemoryStore;
use inbox_jobs::{ProcessAttachment, ProcessAttachmentPayload, Task, TaskClient};

async fn setup() -> (MemoryStore, TaskClient, TeamScope) {
    let store = MemoryStore::new();
    let (user, _) = store.seed_user("ops@example.com").await.unwrap();
    let scope = store.seed_team(&user, "Ops").await.unwrap();
    let client = TaskClient::new(Arc::new(store.clone()));
    (store, client, scope)
}

fn attachment(path: &str) -> ProcessAttachmentInput {
    ProcessAttachmentInput {
        file_path: path.to_string(),
        mimetype: "application/pdf".to_string(),
        size: 100,
    }
}

#[tokio::test]
async fn test_empty_batch_enqueues_nothing() {
    let (store, client, scope) = setup().await;

    let handle = client
        .batch_trigger::<ProcessAttachment>(&scope, Vec::new())
        .await
        .unwrap();

    assert!(handle.runs.is_empty());
    assert!(store.queued_jobs().unwrap().is_empty());
}

#[tokio::test]
async fn test_single_attachment_carries_team_id() {
    let (store, client, scope) = setup().await;
    let payload = ProcessAttachmentPayload::scoped(&scope, attachment("a.pdf"));

    let handle = client
        .batch_trigger::<ProcessAttachment>(&scope, vec![payload])
        .await
        .unwrap();

    let jobs = store.queued_jobs().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(handle.runs.len(), 1);
    assert_eq!(handle.runs[0].id, jobs[0].id);
    assert_eq!(jobs[0].task_id, ProcessAttachment::ID);
    assert_eq!(jobs[0].batch_id, handle.batch_id);
    assert_eq!(
        jobs[0].payload,
        serde_json::json!({
            "filePath": "a.pdf",
            "mimetype": "application/pdf",
            "size": 100,
            "teamId": scope.team_id,
        })
    );
}

#[tokio::test]
async fn test_batch_keeps_input_order() {
    let (store, client, scope) = setup().await;
    let payloads = ["a.pdf", "b.pdf", "c.pdf"]
        .into_iter()
        .map(|p| ProcessAttachmentPayload::scoped(&scope, attachment(p)))
        .collect();

    let handle = client
        .batch_trigger::<ProcessAttachment>(&scope, payloads)
        .await
        .unwrap();

    let jobs = store.list_batch(handle.batch_id).await.unwrap();
    let paths: Vec<&str> = jobs
        .iter()
        .filter_map(|j| j.payload["filePath"].as_str())
        .collect();
    assert_eq!(paths, vec!["a.pdf", "b.pdf", "c.pdf"]);
}

#[tokio::test]
async fn test_enqueue_failure_propagates() {
    let (store, client, scope) = setup().await;
    store.fail_enqueue("queue unavailable").unwrap();
    let payload = ProcessAttachmentPayload::scoped(&scope, attachment("a.pdf"));

    let err = client
        .batch_trigger::<ProcessAttachment>(&scope, vec![payload])
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Job(msg) if msg == "queue unavailable"));
}
