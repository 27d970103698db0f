//! Integration tests for [`AnnotationRepo`] against the in-memory backend.

use std::sync::Arc;

use assert_matches::assert_matches;
use perspecto_core::severity::Severity;
use perspecto_db::backend::tables;
use perspecto_db::models::NewAnnotation;
use perspecto_db::repositories::AnnotationRepo;
use perspecto_db::{Backend, DataError, MemoryBackend};
use serde_json::json;

const V1: &str = "11111111-1111-4111-8111-111111111111";

fn annotation_row(id: &str, user: &str, severity: &str) -> serde_json::Value {
    json!({
        "id": id,
        "videoId": V1,
        "userId": user,
        "content": format!("note {id}"),
        "title": "",
        "severity": severity,
        "timestamp": 1.5
    })
}

fn seeded() -> Arc<MemoryBackend> {
    let backend = Arc::new(MemoryBackend::with_user("u1"));
    backend.seed(
        tables::ANNOTATIONS,
        [
            annotation_row("a1", "u1", "high"),
            annotation_row("a2", "u1", "low"),
            annotation_row("a3", "u2", "medium"),
        ],
    );
    backend.seed(
        tables::ANNOTATION_COMMENTS,
        [
            json!({"id": "c1", "annotationId": "a1", "content": "agreed"}),
            json!({"id": "c2", "annotationId": "a1", "content": "fixed"}),
            json!({"id": "c3", "annotationId": "a3", "content": "other"}),
        ],
    );
    backend
}

fn repo(backend: &Arc<MemoryBackend>) -> AnnotationRepo {
    AnnotationRepo::new(backend.clone() as Arc<dyn Backend>)
}

/// The user's annotations come back with their own comment threads.
#[tokio::test]
async fn list_for_user_merges_comments() {
    let backend = seeded();
    let annotations = repo(&backend).list_for_current_user().await.unwrap();

    let ids: Vec<&str> = annotations.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["a1", "a2"]);
    assert_eq!(annotations[0].comments.len(), 2);
    assert!(annotations[1].comments.is_empty());
}

/// Comments are fetched in a single batch.
#[tokio::test]
async fn comments_fetched_once_per_listing() {
    let backend = seeded();
    repo(&backend).list_for_current_user().await.unwrap();
    let comment_calls = backend
        .calls()
        .iter()
        .filter(|c| c.as_str() == "select annotation_comments")
        .count();
    assert_eq!(comment_calls, 1);
}

/// A failing comment batch yields annotations with empty threads.
#[tokio::test]
async fn comment_failure_degrades_to_empty_threads() {
    let backend = seeded();
    backend.fail(tables::ANNOTATION_COMMENTS);
    let annotations = repo(&backend).list_for_current_user().await.unwrap();
    assert_eq!(annotations.len(), 2);
    assert!(annotations.iter().all(|a| a.comments.is_empty()));
}

/// Every annotation on a video is listed regardless of author.
#[tokio::test]
async fn list_for_video_includes_all_authors() {
    let backend = seeded();
    let annotations = repo(&backend).list_for_video(V1).await.unwrap();
    assert_eq!(annotations.len(), 3);
    let a3 = annotations.iter().find(|a| a.id == "a3").unwrap();
    assert_eq!(a3.comments[0].content, "other");
}

/// A malformed video id returns nothing without contacting the backend.
#[tokio::test]
async fn malformed_video_id_returns_empty() {
    let backend = seeded();
    let annotations = repo(&backend).list_for_video("not-a-uuid").await.unwrap();
    assert!(annotations.is_empty());
    assert!(backend.calls().is_empty());
}

/// Created annotations are stamped with the signed-in user.
#[tokio::test]
async fn create_stamps_current_user() {
    let backend = Arc::new(MemoryBackend::with_user("u7"));
    let draft = NewAnnotation::point(
        "a9".into(),
        V1,
        "Colour shift".into(),
        Severity::High,
        4.0,
        Some(120),
    );
    repo(&backend).create(&draft).await.unwrap();

    let rows = backend.rows(tables::ANNOTATIONS);
    assert_eq!(rows[0]["userId"], "u7");
    assert_eq!(rows[0]["title"], "High Priority");
    assert_eq!(rows[0]["severity"], "high");
    assert_eq!(rows[0]["startFrame"], 120);
}

/// Delete only touches the signed-in user's annotation.
#[tokio::test]
async fn delete_is_scoped_to_author() {
    let backend = seeded();
    let repo = repo(&backend);
    repo.delete("a3").await.unwrap();
    repo.delete("a1").await.unwrap();

    let ids: Vec<String> = backend
        .rows(tables::ANNOTATIONS)
        .iter()
        .map(|r| r["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["a2", "a3"]);
}

/// Writes without a session are rejected.
#[tokio::test]
async fn writes_require_user() {
    let backend = Arc::new(MemoryBackend::new());
    let err = repo(&backend).delete("a1").await.unwrap_err();
    assert_matches!(err, DataError::NotAuthenticated);
}

/// Added comments show up on the next listing.
#[tokio::test]
async fn add_comment_appends_to_thread() {
    let backend = seeded();
    let repo = repo(&backend);
    let comment = repo.add_comment("a2", "looks good").await.unwrap();
    assert_eq!(comment.annotation_id, "a2");

    let annotations = repo.list_for_current_user().await.unwrap();
    let a2 = annotations.iter().find(|a| a.id == "a2").unwrap();
    assert_eq!(a2.comments.len(), 1);
    assert_eq!(a2.comments[0].content, "looks good");
}
