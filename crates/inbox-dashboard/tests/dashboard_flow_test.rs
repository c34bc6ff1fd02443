//! Dashboard components driven against a live API server backed by the
//! in-memory store.

use std::sync::Arc;

use inbox_api::{router, AppState, ServerConfig};
use inbox_core::{CreateDocumentTagRequest, DocumentTagRepository, DocumentRepository, NewDocument};
use inbox_dashboard::{
    ClientConfig, CreateTeamError, CreateTeamForm, CreateTeamValues, DocumentTags, History,
    HttpProcedures, Procedures, QueryCache, TagOption,
};
use inbox_db::MemoryStore;

async fn spawn_api(store: MemoryStore) -> String {
    let app = router(AppState::with_store(store), &ServerConfig::default());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn procedures(base_url: &str, token: &str) -> Arc<HttpProcedures> {
    Arc::new(HttpProcedures::new(ClientConfig::new(base_url, token)).unwrap())
}

#[tokio::test]
async fn test_create_team_form_switches_active_team() {
    let store = MemoryStore::new();
    let (_, token) = store.seed_user("founder@example.com").await.unwrap();
    let base_url = spawn_api(store).await;
    let api = procedures(&base_url, &token);
    let history = Arc::new(History::new());
    let form = CreateTeamForm::new(
        api.clone(),
        Arc::new(QueryCache::new()),
        history.clone(),
        Some("EUR"),
    );

    let team_id = form
        .submit(CreateTeamValues {
            name: "Acme Co".to_string(),
            base_currency: form.initial_values().base_currency.clone(),
        })
        .await
        .unwrap();

    let me = api.current_user().await.unwrap();
    assert_eq!(me.team_id, Some(team_id));
    assert_eq!(history.current().as_deref(), Some("/"));
}

#[tokio::test]
async fn test_server_rejection_leaves_active_team_unchanged() {
    let store = MemoryStore::new();
    let (_, token) = store.seed_user("founder@example.com").await.unwrap();
    let base_url = spawn_api(store).await;
    let api = procedures(&base_url, &token);
    let history = Arc::new(History::new());
    let form = CreateTeamForm::new(api.clone(), Arc::new(QueryCache::new()), history.clone(), None);

    // Passes the client gate, fails the server's trimmed length check.
    let err = form
        .submit(CreateTeamValues {
            name: "A ".to_string(),
            base_currency: "USD".to_string(),
        })
        .await
        .unwrap_err();

    let CreateTeamError::Create(source) = err else {
        panic!("expected create failure");
    };
    assert_eq!(source.status(), Some(400));
    assert_eq!(api.current_user().await.unwrap().team_id, None);
    assert!(history.paths().is_empty());
}

#[tokio::test]
async fn test_document_tags_round_trip() {
    let store = MemoryStore::new();
    let (user, token) = store.seed_user("alice@example.com").await.unwrap();
    let scope = store.seed_team(&user, "Alpha").await.unwrap();
    let doc = DocumentRepository::insert(
        &store,
        &scope,
        NewDocument {
            name: "receipt.pdf".to_string(),
            title: None,
        },
    )
    .await
    .unwrap();
    let tag = DocumentTagRepository::create(
        &store,
        &scope,
        &CreateDocumentTagRequest {
            name: "Receipts".to_string(),
        },
    )
    .await
    .unwrap();
    let base_url = spawn_api(store).await;
    let api = procedures(&base_url, &token);
    let cache = Arc::new(QueryCache::new());

    let loaded = api.get_document(doc.id).await.unwrap();
    let tags = DocumentTags::new(
        doc.id,
        Some(loaded.document_tag_assignments),
        api.clone(),
        cache.clone(),
    );
    assert_eq!(tags.options(), Some(Vec::new()));

    let option = TagOption {
        value: tag.id.to_string(),
        label: tag.name.clone(),
        id: Some(tag.id),
    };
    assert!(tags.on_select(&option).await.unwrap());
    assert!(tags.on_select(&option).await.unwrap());
    let tagged = api.get_document(doc.id).await.unwrap();
    assert_eq!(tagged.document_tag_assignments.len(), 1);

    assert!(tags.on_remove(&option).await.unwrap());
    let untagged = api.get_document(doc.id).await.unwrap();
    assert!(untagged.document_tag_assignments.is_empty());
    assert_eq!(cache.invalidations().len(), 3);
}
