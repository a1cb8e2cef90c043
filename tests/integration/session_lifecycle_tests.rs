//! End-to-end lifecycle flows against the in-memory catalog.
//!
//! Validates:
//! - Create/get round-trip preserves the item descriptor
//! - Caller-requested transitions are observed by the waiter
//! - Remote state rules surface as transport errors
//! - Delete removes the session from list and get

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use update_session::models::session::{SessionOutcome, SessionState, UpdateSession};
use update_session::AppError;

use super::test_helpers::{manager_over, InMemoryCatalog};

const POLL: Duration = Duration::from_millis(10);

#[tokio::test]
async fn create_then_get_round_trips_descriptor() {
    let catalog = InMemoryCatalog::default();
    let manager = manager_over(&catalog);
    let ct = CancellationToken::new();

    let id = manager
        .create(&ct, &UpdateSession::create_spec("X", "v1"))
        .await
        .expect("create");
    assert!(!id.is_empty());

    let session = manager.get(&ct, &id).await.expect("get");
    assert_eq!(session.id, id);
    assert_eq!(session.item_id, "X");
    assert_eq!(session.item_content_version, "v1");
    assert_eq!(session.state, Some(SessionState::Active));
    assert!(session.expiration.is_some());
}

#[tokio::test]
async fn create_without_item_is_rejected_remotely() {
    let catalog = InMemoryCatalog::default();
    let manager = manager_over(&catalog);
    let ct = CancellationToken::new();

    let err = manager
        .create(&ct, &UpdateSession::default())
        .await
        .expect_err("remote rejects");

    assert!(matches!(err, AppError::Transport(ref e) if e.status == Some(400)));
}

#[tokio::test(start_paused = true)]
async fn cancel_is_observed_by_the_next_poll() {
    let catalog = InMemoryCatalog::default();
    let manager = manager_over(&catalog);
    let ct = CancellationToken::new();
    let id = manager
        .create(&ct, &UpdateSession::create_spec("X", "v1"))
        .await
        .expect("create");

    manager.cancel(&ct, &id).await.expect("cancel");

    let settled = manager
        .waiter(POLL)
        .wait(&ct, &id, None)
        .await
        .expect("canceled is settled, not an error");
    assert_eq!(settled.state, Some(SessionState::Canceled));
    assert_eq!(settled.outcome(), Some(SessionOutcome::Canceled));
    assert_eq!(catalog.get_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn fail_is_observed_as_error_outcome() {
    let catalog = InMemoryCatalog::default();
    let manager = manager_over(&catalog);
    let ct = CancellationToken::new();
    let id = manager
        .create(&ct, &UpdateSession::create_spec("X", "v1"))
        .await
        .expect("create");

    manager.fail(&ct, &id).await.expect("fail");

    let settled = manager.waiter(POLL).wait(&ct, &id, None).await.expect("settled");
    assert_eq!(settled.outcome(), Some(SessionOutcome::Error));
}

#[tokio::test]
async fn upload_flow_completes_and_cleans_up() {
    let catalog = InMemoryCatalog::default();
    let manager = manager_over(&catalog);
    let ct = CancellationToken::new();

    let id = manager
        .create(&ct, &UpdateSession::create_spec("item-7", "4"))
        .await
        .expect("create");
    assert_eq!(manager.list(&ct).await.expect("list"), vec![id.clone()]);

    manager.keep_alive(&ct, &id).await.expect("keep-alive");
    assert_eq!(catalog.keep_alive_count(), 1);
    assert_eq!(
        manager.get(&ct, &id).await.expect("get").state,
        Some(SessionState::Active),
        "keep-alive leaves the state alone"
    );

    manager.complete(&ct, &id).await.expect("complete");
    assert_eq!(
        catalog.session(&id).and_then(|s| s.state),
        Some(SessionState::Done)
    );

    manager.delete(&ct, &id).await.expect("delete");
    assert!(manager.list(&ct).await.expect("list").is_empty());

    let err = manager.get(&ct, &id).await.expect_err("deleted");
    assert!(matches!(err, AppError::Transport(ref e) if e.is_not_found()));
}

#[tokio::test]
async fn terminal_session_rejects_further_actions() {
    let catalog = InMemoryCatalog::default();
    let manager = manager_over(&catalog);
    let ct = CancellationToken::new();
    let id = manager
        .create(&ct, &UpdateSession::create_spec("X", "v1"))
        .await
        .expect("create");

    manager.complete(&ct, &id).await.expect("complete");

    for err in [
        manager.complete(&ct, &id).await.expect_err("complete twice"),
        manager.cancel(&ct, &id).await.expect_err("cancel after done"),
        manager.keep_alive(&ct, &id).await.expect_err("keep-alive after done"),
    ] {
        assert!(matches!(err, AppError::Transport(ref e) if e.status == Some(400)));
    }
}

#[tokio::test]
async fn server_side_expiry_is_visible_to_get() {
    let catalog = InMemoryCatalog::default();
    let manager = manager_over(&catalog);
    let ct = CancellationToken::new();
    let id = manager
        .create(&ct, &UpdateSession::create_spec("X", "v1"))
        .await
        .expect("create");

    catalog.set_state(&id, SessionState::Error);

    let session = manager.get(&ct, &id).await.expect("get");
    assert_eq!(session.outcome(), Some(SessionOutcome::Error));
}

#[tokio::test]
async fn unknown_ids_fail_every_operation() {
    let catalog = InMemoryCatalog::default();
    let manager = manager_over(&catalog);
    let ct = CancellationToken::new();

    let results = [
        manager.get(&ct, "nope").await.map(|_| ()),
        manager.cancel(&ct, "nope").await,
        manager.complete(&ct, "nope").await,
        manager.fail(&ct, "nope").await,
        manager.keep_alive(&ct, "nope").await,
        manager.delete(&ct, "nope").await,
    ];

    for result in results {
        let err = result.expect_err("unknown id");
        assert!(matches!(err, AppError::Transport(ref e) if e.is_not_found()));
    }
}

#[tokio::test]
async fn list_returns_ids_in_creation_order() {
    let catalog = InMemoryCatalog::default();
    let manager = manager_over(&catalog);
    let ct = CancellationToken::new();

    let mut created = Vec::new();
    for item in ["a", "b", "c"] {
        created.push(
            manager
                .create(&ct, &UpdateSession::create_spec(item, "1"))
                .await
                .expect("create"),
        );
    }

    assert_eq!(manager.list(&ct).await.expect("list"), created);
}
