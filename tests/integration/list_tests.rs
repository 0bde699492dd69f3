//! Listing tests: filters, pagination and total counts.

use axum::http::{Method, StatusCode};

use session_api::session::SessionStatus;
use session_api::store::{Direction, MemoryDocumentStore};

use super::test_utils::{
    authed, seed_session, send, session_ids, test_router, FailingStore, RecordingStore,
};

/// Seed 30 sessions, a minute apart, cycling through regions and statuses.
///
/// Session `s-NN` is created at minute `NN`, so the newest is `s-29`.
async fn seed_many(store: &MemoryDocumentStore) {
    let regions = ["eu-central", "us-east", "us-west"];
    for i in 0..30 {
        let status = SessionStatus::ALL[i % SessionStatus::ALL.len()];
        seed_session(
            store,
            &format!("s-{:02}", i),
            regions[i % regions.len()],
            status,
            i as i64,
        )
        .await;
    }
}

#[tokio::test]
async fn test_list_defaults() {
    let store = MemoryDocumentStore::new();
    seed_many(&store).await;
    let router = test_router(store);

    let (status, body) = send(&router, authed(Method::GET, "/listSessions", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["meta"]["total"], 30);
    assert_eq!(body["meta"]["limit"], 20);
    assert_eq!(body["meta"]["offset"], 0);

    let ids = session_ids(&body);
    assert_eq!(ids.len(), 20);
    assert_eq!(ids[0], "s-29");
    assert_eq!(ids[19], "s-10");
}

#[tokio::test]
async fn test_list_empty_store() {
    let router = test_router(MemoryDocumentStore::new());

    let (status, body) = send(&router, authed(Method::GET, "/listSessions", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], serde_json::json!([]));
    assert_eq!(body["meta"]["total"], 0);
}

#[tokio::test]
async fn test_list_filter_by_region() {
    let store = MemoryDocumentStore::new();
    seed_many(&store).await;
    let router = test_router(store);

    let (status, body) = send(
        &router,
        authed(Method::GET, "/listSessions?region=us-east&limit=10", None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 10);
    assert_eq!(body["meta"]["limit"], 10);

    let sessions = body["data"].as_array().unwrap();
    assert_eq!(sessions.len(), 10);
    assert!(sessions.iter().all(|s| s["region"] == "us-east"));
    assert_eq!(sessions[0]["sessionId"], "s-28");
}

#[tokio::test]
async fn test_list_filter_by_status_and_region() {
    let store = MemoryDocumentStore::new();
    seed_many(&store).await;
    let router = test_router(store);

    let (_, body) = send(
        &router,
        authed(Method::GET, "/listSessions?status=active", None),
    )
    .await;
    assert_eq!(body["meta"]["total"], 8);
    assert!(body["data"]
        .as_array()
        .unwrap()
        .iter()
        .all(|s| s["status"] == "active"));

    // i % 4 == 1 and i % 3 == 0 -> 9, 21
    let (_, body) = send(
        &router,
        authed(
            Method::GET,
            "/listSessions?status=active&region=eu-central",
            None,
        ),
    )
    .await;
    assert_eq!(body["meta"]["total"], 2);
    assert_eq!(session_ids(&body), vec!["s-21", "s-09"]);
}

#[tokio::test]
async fn test_list_pages_cover_everything_in_order() {
    let store = MemoryDocumentStore::new();
    seed_many(&store).await;
    let router = test_router(store);

    let (_, full) = send(&router, authed(Method::GET, "/listSessions?limit=100", None)).await;
    let expected = session_ids(&full);
    assert_eq!(expected.len(), 30);

    let mut collected = Vec::new();
    for offset in (0..30).step_by(7) {
        let (status, page) = send(
            &router,
            authed(
                Method::GET,
                &format!("/listSessions?limit=7&offset={}", offset),
                None,
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["meta"]["total"], 30);
        assert_eq!(page["meta"]["offset"], offset);
        collected.extend(session_ids(&page));
    }

    assert_eq!(collected, expected);
}

#[tokio::test]
async fn test_list_offset_past_end() {
    let store = MemoryDocumentStore::new();
    seed_many(&store).await;
    let router = test_router(store);

    let (status, body) = send(
        &router,
        authed(Method::GET, "/listSessions?offset=50", None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], serde_json::json!([]));
    assert_eq!(body["meta"]["total"], 30);
    assert_eq!(body["meta"]["offset"], 50);
}

#[tokio::test]
async fn test_list_empty_params_are_ignored() {
    let store = MemoryDocumentStore::new();
    seed_many(&store).await;
    let router = test_router(store);

    let (status, body) = send(
        &router,
        authed(
            Method::GET,
            "/listSessions?status=&region=&limit=&offset=",
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 30);
    assert_eq!(body["meta"]["limit"], 20);
    assert_eq!(body["meta"]["offset"], 0);
}

#[tokio::test]
async fn test_list_rejects_invalid_limit() {
    let router = test_router(MemoryDocumentStore::new());

    for limit in ["0", "101", "-5", "abc", "2.5"] {
        let (status, body) = send(
            &router,
            authed(Method::GET, &format!("/listSessions?limit={}", limit), None),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "limit={}", limit);
        assert_eq!(
            body["error"]["message"],
            "Limit must be a number between 1 and 100"
        );
    }
}

#[tokio::test]
async fn test_list_accepts_limit_bounds() {
    let router = test_router(MemoryDocumentStore::new());

    for limit in [1, 100] {
        let (status, body) = send(
            &router,
            authed(Method::GET, &format!("/listSessions?limit={}", limit), None),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["meta"]["limit"], limit);
    }
}

#[tokio::test]
async fn test_list_rejects_invalid_offset() {
    let router = test_router(MemoryDocumentStore::new());

    for offset in ["-1", "ten"] {
        let (status, body) = send(
            &router,
            authed(Method::GET, &format!("/listSessions?offset={}", offset), None),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"]["message"],
            "Offset must be a non-negative number"
        );
    }
}

#[tokio::test]
async fn test_list_rejects_invalid_filters() {
    let router = test_router(MemoryDocumentStore::new());

    let (status, body) = send(
        &router,
        authed(Method::GET, "/listSessions?status=ACTIVE", None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"]["message"],
        "Invalid status. Must be one of: pending, active, completed, failed"
    );

    let (status, body) = send(
        &router,
        authed(Method::GET, "/listSessions?region=atlantis", None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"]["message"],
        "Invalid region. Must be one of: eu-central, us-east, us-west, ap-southeast"
    );
}

#[tokio::test]
async fn test_list_rejects_repeated_params() {
    let router = test_router(MemoryDocumentStore::new());

    let cases = [
        (
            "/listSessions?limit=1&limit=2",
            "Limit must be a number between 1 and 100",
        ),
        (
            "/listSessions?offset=0&offset=5",
            "Offset must be a non-negative number",
        ),
        (
            "/listSessions?status=active&status=failed",
            "Status is required and must be a string",
        ),
        (
            "/listSessions?region=us-east&region=us-west",
            "Region is required and must be a non-empty string",
        ),
    ];

    for (uri, message) in cases {
        let (status, body) = send(&router, authed(Method::GET, uri, None)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], message);
    }
}

#[tokio::test]
async fn test_list_store_failure() {
    let router = test_router(FailingStore);

    let (status, body) = send(&router, authed(Method::GET, "/listSessions", None)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
    assert_eq!(body["error"]["message"], "An unexpected error occurred");
}

// =============================================================================
// Store Access Pattern
// =============================================================================

#[tokio::test]
async fn test_list_without_offset_issues_single_query() {
    let store = RecordingStore::new();
    let router = test_router(store.clone());

    let (status, _) = send(
        &router,
        authed(Method::GET, "/listSessions?region=us-west&limit=5", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(store.count_calls(), 1);

    let queries = store.queries().await;
    assert_eq!(queries.len(), 1);

    let query = &queries[0];
    assert_eq!(query.collection_name(), "sessions");
    assert_eq!(query.limit_value(), Some(5));
    assert!(query.cursor().is_none());

    let ordering = query.ordering().unwrap();
    assert_eq!(ordering.field, "createdAt");
    assert_eq!(ordering.direction, Direction::Descending);

    assert_eq!(
        query.filters(),
        &[("region".to_string(), serde_json::json!("us-west"))]
    );
}

#[tokio::test]
async fn test_list_offset_walks_to_cursor() {
    let store = RecordingStore::new();
    for i in 0..10 {
        seed_session(
            &store,
            &format!("s-{:02}", i),
            "eu-central",
            SessionStatus::Pending,
            i,
        )
        .await;
    }
    store.reset().await;

    let router = test_router(store.clone());

    let (status, body) = send(
        &router,
        authed(Method::GET, "/listSessions?limit=3&offset=4", None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(session_ids(&body), vec!["s-05", "s-04", "s-03"]);

    // One count plus two reads: each is a full collection scan on S3
    assert_eq!(store.count_calls(), 1);
    let queries = store.queries().await;
    assert_eq!(queries.len(), 2);

    // First read skips exactly `offset` sessions
    assert_eq!(queries[0].limit_value(), Some(4));
    assert!(queries[0].cursor().is_none());

    // Then the page resumes after the last skipped session
    assert_eq!(queries[1].limit_value(), Some(3));
    assert_eq!(queries[1].cursor().map(|doc| doc.id.as_str()), Some("s-06"));
    assert_eq!(queries[1].filters(), queries[0].filters());
}
