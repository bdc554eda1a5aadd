// tests/reservation_tests.rs
mod common;
use common::*;
use std::sync::Arc;
use vitrine::reservation::{aggregate_quantities, reserve};
use vitrine::{Backend, CartLine, Contact, RequestStatus, ReservationConfig, VitrineError};

fn line(product_id: &str, quantity: u32) -> CartLine {
    CartLine::new(product_id, quantity)
}

#[tokio::test]
async fn test_submission_within_stock_decrements_and_clears_cart() {
    let h = harness();
    seed(&h.backend, &[product("ring", "Silver Ring", Some(3))]).await;
    let session = client(&h.storefront, "ana@example.com").await;

    h.storefront.add_to_cart(&session, "ring", 2).await.unwrap();
    let request_id = h.storefront.submit_cart(&session).await.unwrap();

    assert_eq!(stock_of(&h.backend, "ring").await, Some(1));
    assert!(h.storefront.cart(&session).await.unwrap().is_empty());

    let requests = h.storefront.my_requests(&session).await.unwrap();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.id, request_id);
    assert_eq!(request.request_number, request_id);
    assert_eq!(request.status, RequestStatus::Pending);
    assert_eq!(request.items.len(), 1);
    assert_eq!(request.items[0].quantity, 2);
    assert_eq!(request.items[0].product_name.as_deref(), Some("Silver Ring"));
    assert_eq!(request.contact.full_name.as_deref(), Some("Ana Burmes"));
    assert_eq!(request.contact.user_email.as_deref(), Some("ana@example.com"));
    assert!(request.contact.has_whatsapp);
}

#[tokio::test]
async fn test_submission_over_stock_changes_nothing() {
    let h = harness();
    seed(&h.backend, &[product("ring", "Silver Ring", Some(1))]).await;
    let session = client(&h.storefront, "ana@example.com").await;

    let lines = vec![line("ring", 2)];
    h.storefront.set_cart(&session, lines.clone()).await.unwrap();
    let err = h.storefront.submit_request(&session, &lines).await.unwrap_err();

    match err {
        VitrineError::InsufficientStock {
            product_id,
            product_name,
            available,
        } => {
            assert_eq!(product_id, "ring");
            assert_eq!(product_name, "Silver Ring");
            assert_eq!(available, 1);
        }
        other => panic!("Expected InsufficientStock, got {:?}", other),
    }
    assert_eq!(stock_of(&h.backend, "ring").await, Some(1));
    assert!(h.storefront.my_requests(&session).await.unwrap().is_empty());
    assert_eq!(h.storefront.cart(&session).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_insufficient_stock_message_names_product() {
    let err = VitrineError::InsufficientStock {
        product_id: "ring".to_string(),
        product_name: "Silver Ring".to_string(),
        available: 1,
    };
    assert_eq!(err.to_string(), "Not enough stock for Silver Ring. Only 1 left.");
}

#[tokio::test]
async fn test_one_short_product_aborts_the_whole_request() {
    let h = harness();
    seed(
        &h.backend,
        &[product("ring", "Silver Ring", Some(5)), product("chain", "Gold Chain", Some(1))],
    )
    .await;
    let session = client(&h.storefront, "ana@example.com").await;

    let err = h
        .storefront
        .submit_request(&session, &[line("ring", 2), line("chain", 3)])
        .await
        .unwrap_err();

    assert!(matches!(err, VitrineError::InsufficientStock { ref product_id, .. } if product_id == "chain"));
    assert_eq!(stock_of(&h.backend, "ring").await, Some(5));
    assert_eq!(stock_of(&h.backend, "chain").await, Some(1));
    assert_eq!(h.backend.committed_transactions(), 0);
}

#[tokio::test]
async fn test_duplicate_lines_are_aggregated() {
    let lines = vec![line("ring", 2), line("chain", 1), line("ring", 2), line("", 4)];
    let totals = aggregate_quantities(&lines);
    assert_eq!(totals.len(), 2);
    assert_eq!(totals["ring"], 4);
    assert_eq!(totals["chain"], 1);

    let h = harness();
    seed(&h.backend, &[product("ring", "Silver Ring", Some(3))]).await;
    let session = client(&h.storefront, "ana@example.com").await;
    let err = h
        .storefront
        .submit_request(&session, &[line("ring", 2), line("ring", 2)])
        .await
        .unwrap_err();
    assert!(matches!(err, VitrineError::InsufficientStock { available: 3, .. }));

    h.storefront
        .submit_request(&session, &[line("ring", 2), line("ring", 1)])
        .await
        .unwrap();
    assert_eq!(stock_of(&h.backend, "ring").await, Some(0));

    // Each submitted line is recorded as-is; only the stock check aggregates.
    let requests = h.storefront.my_requests(&session).await.unwrap();
    assert_eq!(requests[0].items.len(), 2);
}

#[tokio::test]
async fn test_missing_product_and_untracked_stock_skip_the_check() {
    let h = harness();
    seed(&h.backend, &[product("bespoke", "Bespoke Piece", None)]).await;
    let session = client(&h.storefront, "ana@example.com").await;

    let id = h
        .storefront
        .submit_request(&session, &[line("retired-sku", 4), line("bespoke", 10)])
        .await
        .unwrap();

    assert!(!id.is_empty());
    assert_eq!(stock_of(&h.backend, "bespoke").await, None);
    assert!(h.backend.get_product("retired-sku").await.unwrap().is_none());
}

#[tokio::test]
async fn test_zero_quantity_is_coerced_to_one() {
    let h = harness();
    seed(&h.backend, &[product("ring", "Silver Ring", Some(2))]).await;
    let session = client(&h.storefront, "ana@example.com").await;

    h.storefront.submit_request(&session, &[line("ring", 0)]).await.unwrap();

    assert_eq!(stock_of(&h.backend, "ring").await, Some(1));
    let requests = h.storefront.my_requests(&session).await.unwrap();
    assert_eq!(requests[0].items[0].quantity, 1);
}

#[tokio::test]
async fn test_empty_submission_is_rejected() {
    let h = harness();
    let session = client(&h.storefront, "ana@example.com").await;
    let err = h.storefront.submit_request(&session, &[]).await.unwrap_err();
    assert!(matches!(err, VitrineError::EmptyCart));
    let err = h.storefront.submit_cart(&session).await.unwrap_err();
    assert!(matches!(err, VitrineError::EmptyCart));
}

#[tokio::test]
async fn test_conflicts_are_retried_transparently() {
    let h = harness();
    seed(&h.backend, &[product("ring", "Silver Ring", Some(3))]).await;
    let session = client(&h.storefront, "ana@example.com").await;

    h.backend.inject_conflicts(2);
    h.storefront.submit_request(&session, &[line("ring", 1)]).await.unwrap();

    assert_eq!(h.backend.conflicted_transactions(), 2);
    assert_eq!(h.backend.committed_transactions(), 1);
    assert_eq!(stock_of(&h.backend, "ring").await, Some(2));
    assert_eq!(h.storefront.my_requests(&session).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_conflict_surfaces_after_attempts_are_exhausted() {
    let h = harness_with(ReservationConfig {
        max_attempts: 3,
        ..fast_reservation()
    });
    seed(&h.backend, &[product("ring", "Silver Ring", Some(3))]).await;
    let session = client(&h.storefront, "ana@example.com").await;

    h.backend.inject_conflicts(3);
    let err = h
        .storefront
        .submit_request(&session, &[line("ring", 1)])
        .await
        .unwrap_err();

    assert!(matches!(err, VitrineError::Conflict(_)));
    assert_eq!(h.backend.conflicted_transactions(), 3);
    assert_eq!(stock_of(&h.backend, "ring").await, Some(3));
    assert!(h.storefront.my_requests(&session).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_admin_edit_mid_transaction_forces_a_retry() {
    let h = harness();
    seed(&h.backend, &[product("ring", "Silver Ring", Some(3))]).await;

    let mut tx = h.backend.begin().await.unwrap();
    let seen = tx.product("ring").await.unwrap().unwrap();
    tx.set_stock("ring", seen.stock.unwrap() - 1, chrono::Utc::now());

    // Admin restocks while the transaction is open.
    let mut restocked = seen.clone();
    restocked.stock = Some(10);
    h.backend.update_product(&restocked).await.unwrap();

    let err = tx.commit().await.unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(stock_of(&h.backend, "ring").await, Some(10));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_submissions_never_oversell() {
    setup_tracing();
    let h = harness();
    seed(&h.backend, &[product("ring", "Silver Ring", Some(3))]).await;
    let backend = Arc::new(h.backend.clone());
    let config = fast_reservation();

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..10 {
        let backend = backend.clone();
        let config = config.clone();
        tasks.spawn(async move {
            let uid = format!("buyer-{}", i);
            reserve(backend.as_ref(), &config, &uid, Contact::default(), &[line("ring", 1)]).await
        });
    }

    let mut succeeded = 0;
    let mut refused = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined.expect("task panicked") {
            Ok(_) => succeeded += 1,
            Err(VitrineError::InsufficientStock { available: 0, .. }) => refused += 1,
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    assert_eq!(succeeded, 3);
    assert_eq!(refused, 7);
    assert_eq!(stock_of(&h.backend, "ring").await, Some(0));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_same_cart_submitted_twice_concurrently() {
    let h = harness();
    seed(&h.backend, &[product("ring", "Silver Ring", Some(2))]).await;
    let session = client(&h.storefront, "ana@example.com").await;
    let storefront = Arc::new(h.storefront.clone());
    let lines = vec![line("ring", 2)];

    let first = {
        let (sf, s, l) = (storefront.clone(), session.clone(), lines.clone());
        tokio::spawn(async move { sf.submit_request(&s, &l).await })
    };
    let second = {
        let (sf, s, l) = (storefront.clone(), session.clone(), lines.clone());
        tokio::spawn(async move { sf.submit_request(&s, &l).await })
    };

    let results = [first.await.unwrap(), second.await.unwrap()];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(VitrineError::InsufficientStock { available: 0, .. }))));
    assert_eq!(stock_of(&h.backend, "ring").await, Some(0));
    assert_eq!(storefront.my_requests(&session).await.unwrap().len(), 1);
}
