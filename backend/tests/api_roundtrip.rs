//! Drives a real server on an ephemeral port through the front end's
//! REST client and views.

use availability_backend::{build_app, DbConnection, ServerConfig};
use availability_frontend::{ApiClient, DocumentStore, MonthRef, StaffView, ViewConfig};
use shared::{Author, DateRange, DayPatch};
use std::sync::Arc;

async fn spawn_server() -> ApiClient {
    let db = DbConnection::init_in_memory().await.unwrap();
    let config = ServerConfig::from_lookup(|_| None).unwrap();
    let app = build_app(db, &config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    ApiClient::with_base_url(format!("http://{}", addr))
}

#[tokio::test]
async fn merge_write_keeps_prior_fields() {
    let client = spawn_server().await;

    client
        .merge_day("2024-03-05", &DayPatch::note("hi"), Author::Staff)
        .await
        .unwrap();
    client
        .merge_day("2024-03-05", &DayPatch::schedule(true, "09:00", "17:00"), Author::Staff)
        .await
        .unwrap();

    let record = client.get_day("2024-03-05").await.unwrap().unwrap();
    assert_eq!(record.available, Some(true));
    assert_eq!(record.start_time.as_deref(), Some("09:00"));
    assert_eq!(record.end_time.as_deref(), Some("17:00"));
    assert_eq!(record.note.as_deref(), Some("hi"));
    assert!(record.updated_at.is_some());
    assert!(record.manager_updated_at.is_none());
}

#[tokio::test]
async fn missing_documents_read_as_none() {
    let client = spawn_server().await;
    assert!(client.get_day("2024-03-05").await.unwrap().is_none());
    assert!(client.get_global_note().await.unwrap().is_none());
    assert!(client
        .query_days(&DateRange::new("2024-03-01", "2024-03-31"))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn global_note_roundtrip() {
    let client = spawn_server().await;
    client.merge_global_note("Inventory on Monday").await.unwrap();
    let note = client.get_global_note().await.unwrap().unwrap();
    assert_eq!(note.note, "Inventory on Monday");
}

#[tokio::test]
async fn staff_view_against_server() {
    let client = Arc::new(spawn_server().await);
    let view = StaffView::new(
        Arc::clone(&client),
        MonthRef::new(2024, 1).unwrap(),
        ViewConfig::default(),
    );
    view.start().await;
    assert_eq!(view.snapshot().grid.days.len(), 33);

    view.open_day("2024-02-29").await.unwrap();
    view.set_available(false).await;
    view.input_note("leap day off");
    view.close_panel().await;

    let record = client.get_day("2024-02-29").await.unwrap().unwrap();
    assert_eq!(record.available, Some(false));
    assert_eq!(record.note.as_deref(), Some("leap day off"));

    let grid = view.snapshot().grid;
    let cell = grid.day("2024-02-29").unwrap();
    assert!(cell.flags.unavailable);
    assert!(cell.flags.has_note);
}
