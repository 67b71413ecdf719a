//! Simulation and commit: split resolution, idempotency, reconciliation

mod helpers;

use alp_common::models::{LedgerStatus, SplitSource};
use alp_common::{Caller, CommitDisposition, Error};
use helpers::{admin, d, request, setup};
use std::collections::HashSet;

#[tokio::test]
async fn test_simulate_global_split_scenario() {
    let t = setup().await;
    t.seed("ath-1", "item-1", "1000.00").await;

    let result = t.engine.simulation.simulate(&request("item-1", "ath-1")).await.unwrap();

    assert_eq!(result.item_title, "Item item-1");
    assert_eq!(result.total_value, d("1000.00"));
    assert_eq!(result.athlete_payout, d("700.00"));
    assert_eq!(result.platform_commission, d("300.00"));
    assert_eq!(result.athlete_pix_key, "ath-1@pix");
    assert_eq!(result.split_source, SplitSource::Global);
}

#[tokio::test]
async fn test_simulate_uses_athlete_override() {
    let t = setup().await;
    t.seed("ath-1", "item-1", "1000.00").await;
    t.engine
        .fees
        .set_athlete_override("ath-1", d("0.20"), &admin())
        .await
        .unwrap();

    let result = t.engine.simulation.simulate(&request("item-1", "ath-1")).await.unwrap();
    assert_eq!(result.athlete_payout, d("800.00"));
    assert_eq!(result.platform_commission, d("200.00"));
    assert_eq!(result.split_source, SplitSource::AthleteOverride);

    // Global change does not leak into an overridden athlete
    t.engine.fees.replace(d("0.5"), d("0.5"), "", &admin()).await.unwrap();
    let result = t.engine.simulation.simulate(&request("item-1", "ath-1")).await.unwrap();
    assert_eq!(result.athlete_payout, d("800.00"));
}

#[tokio::test]
async fn test_simulate_is_idempotent_and_side_effect_free() {
    let t = setup().await;
    t.seed("ath-1", "item-1", "333.33").await;

    let first = t.engine.simulation.simulate(&request("item-1", "ath-1")).await.unwrap();
    let second = t.engine.simulation.simulate(&request("item-1", "ath-1")).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.athlete_payout + first.platform_commission, first.total_value);
    assert_eq!(t.ledger_rows().await, 0);
}

#[tokio::test]
async fn test_simulate_not_found() {
    let t = setup().await;
    t.seed("ath-1", "item-1", "10.00").await;

    assert!(matches!(
        t.engine.simulation.simulate(&request("item-404", "ath-1")).await,
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        t.engine.simulation.simulate(&request("item-1", "ath-404")).await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn test_commit_creates_pending_entry_with_recomputed_amounts() {
    let t = setup().await;
    t.seed("ath-1", "item-1", "1000.00").await;

    let outcome = t
        .engine
        .settlement
        .commit(&request("item-1", "ath-1"), "req-1", &Caller::athlete("ath-1"))
        .await
        .unwrap();

    assert_eq!(outcome.disposition, CommitDisposition::Created);
    let entry = outcome.entry;
    assert_eq!(entry.status, LedgerStatus::Pending);
    assert_eq!(entry.request_id, "req-1");
    assert_eq!(entry.term_months, 12);
    assert_eq!(entry.total_value, d("1000.00"));
    assert_eq!(entry.athlete_payout, d("700.00"));
    assert_eq!(entry.platform_commission, d("300.00"));
    assert_eq!(t.ledger_rows().await, 1);
}

#[tokio::test]
async fn test_commit_replay_returns_same_entry() {
    let t = setup().await;
    t.seed("ath-1", "item-1", "1000.00").await;

    let first = t
        .engine
        .settlement
        .commit(&request("item-1", "ath-1"), "req-42", &admin())
        .await
        .unwrap();
    let second = t
        .engine
        .settlement
        .commit(&request("item-1", "ath-1"), "req-42", &admin())
        .await
        .unwrap();

    assert_eq!(second.disposition, CommitDisposition::Replayed);
    assert_eq!(first.entry.id, second.entry.id);
    assert_eq!(t.ledger_rows().await, 1);
}

#[tokio::test]
async fn test_replay_keeps_original_amounts_after_config_change() {
    let t = setup().await;
    t.seed("ath-1", "item-1", "1000.00").await;

    let first = t
        .engine
        .settlement
        .commit(&request("item-1", "ath-1"), "req-7", &admin())
        .await
        .unwrap();
    t.engine.fees.replace(d("0.9"), d("0.1"), "", &admin()).await.unwrap();

    let replay = t
        .engine
        .settlement
        .commit(&request("item-1", "ath-1"), "req-7", &admin())
        .await
        .unwrap();
    assert_eq!(replay.entry, first.entry);
    assert_eq!(replay.entry.athlete_payout, d("700.00"));
}

#[tokio::test]
async fn test_commit_reused_key_with_other_arguments_rejected() {
    let t = setup().await;
    t.seed("ath-1", "item-1", "1000.00").await;

    t.engine
        .settlement
        .commit(&request("item-1", "ath-1"), "req-9", &admin())
        .await
        .unwrap();

    let mut other = request("item-1", "ath-1");
    other.term_months = 24;
    assert!(matches!(
        t.engine.settlement.commit(&other, "req-9", &admin()).await,
        Err(Error::InvalidInput(_))
    ));
    assert_eq!(t.ledger_rows().await, 1);
}

#[tokio::test]
async fn test_concurrent_commits_same_key_create_one_entry() {
    let t = setup().await;
    t.seed("ath-1", "item-1", "1000.00").await;

    let mut handles = Vec::new();
    for _ in 0..16 {
        let settlement = t.engine.settlement.clone();
        handles.push(tokio::spawn(async move {
            settlement
                .commit(&request("item-1", "ath-1"), "req-race", &Caller::admin("admin-1"))
                .await
                .unwrap()
        }));
    }

    let mut ids = HashSet::new();
    let mut created = 0;
    for handle in handles {
        let outcome = handle.await.unwrap();
        ids.insert(outcome.entry.id);
        if outcome.disposition == CommitDisposition::Created {
            created += 1;
        }
    }

    assert_eq!(ids.len(), 1, "all callers must observe the same entry");
    assert_eq!(created, 1);
    assert_eq!(t.ledger_rows().await, 1);
}

#[tokio::test]
async fn test_failed_commit_writes_nothing() {
    let t = setup().await;
    t.seed("ath-1", "item-1", "1000.00").await;
    t.seed("ath-2", "item-2", "50.00").await;

    assert!(matches!(
        t.engine
            .settlement
            .commit(&request("item-404", "ath-1"), "req-a", &admin())
            .await,
        Err(Error::NotFound(_))
    ));
    // item-2 belongs to ath-2
    assert!(matches!(
        t.engine
            .settlement
            .commit(&request("item-2", "ath-1"), "req-b", &admin())
            .await,
        Err(Error::InvalidInput(_))
    ));
    assert!(matches!(
        t.engine
            .settlement
            .commit(&request("item-1", "ath-1"), "  ", &admin())
            .await,
        Err(Error::InvalidInput(_))
    ));
    assert_eq!(t.ledger_rows().await, 0);

    // The key stays usable after a failure
    let outcome = t
        .engine
        .settlement
        .commit(&request("item-1", "ath-1"), "req-a", &admin())
        .await
        .unwrap();
    assert_eq!(outcome.disposition, CommitDisposition::Created);
}

#[tokio::test]
async fn test_commit_authorization() {
    let t = setup().await;
    t.seed("ath-1", "item-1", "1000.00").await;

    for caller in [Caller::athlete("ath-2"), Caller::anonymous()] {
        assert!(matches!(
            t.engine
                .settlement
                .commit(&request("item-1", "ath-1"), "req-x", &caller)
                .await,
            Err(Error::Forbidden(_))
        ));
    }
    assert_eq!(t.ledger_rows().await, 0);
}

#[tokio::test]
async fn test_status_transitions() {
    let t = setup().await;
    t.seed("ath-1", "item-1", "1000.00").await;

    let a = t
        .engine
        .settlement
        .commit(&request("item-1", "ath-1"), "req-a", &admin())
        .await
        .unwrap()
        .entry;
    let b = t
        .engine
        .settlement
        .commit(&request("item-1", "ath-1"), "req-b", &admin())
        .await
        .unwrap()
        .entry;

    let approved = t
        .engine
        .settlement
        .update_status(a.id, LedgerStatus::Approved, &admin())
        .await
        .unwrap();
    assert_eq!(approved.status, LedgerStatus::Approved);
    assert!(approved.status_updated_at.is_some());
    assert_eq!(approved.total_value, a.total_value);

    let err = t
        .engine
        .settlement
        .update_status(a.id, LedgerStatus::Cancelled, &admin())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidTransition {
            from: LedgerStatus::Approved,
            to: LedgerStatus::Cancelled
        }
    ));

    assert!(matches!(
        t.engine
            .settlement
            .update_status(b.id, LedgerStatus::Pending, &admin())
            .await,
        Err(Error::InvalidTransition { .. })
    ));
    assert!(matches!(
        t.engine
            .settlement
            .update_status(b.id, LedgerStatus::Cancelled, &Caller::athlete("ath-1"))
            .await,
        Err(Error::Forbidden(_))
    ));
    assert!(matches!(
        t.engine
            .settlement
            .update_status(uuid::Uuid::new_v4(), LedgerStatus::Approved, &admin())
            .await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn test_ledger_amounts_cannot_be_rewritten() {
    let t = setup().await;
    t.seed("ath-1", "item-1", "1000.00").await;
    let entry = t
        .engine
        .settlement
        .commit(&request("item-1", "ath-1"), "req-1", &admin())
        .await
        .unwrap()
        .entry;

    let result = sqlx::query("UPDATE ledger_entries SET athlete_payout_cents = 1 WHERE id = ?")
        .bind(entry.id.to_string())
        .execute(&t.pool)
        .await;
    assert!(result.is_err(), "amount update must be rejected by the schema");
}
