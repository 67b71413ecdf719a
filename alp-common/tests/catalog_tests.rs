//! Catalog upserts: validation and persistence of listings

mod helpers;

use alp_common::catalog::{Catalog, ItemListing};
use alp_common::Error;
use helpers::{admin, d, setup};
use rust_decimal::Decimal;

fn listing(athlete_id: &str, base_price: Decimal) -> ItemListing {
    ItemListing {
        athlete_id: athlete_id.to_string(),
        title: "Final goal".to_string(),
        base_price,
    }
}

#[tokio::test]
async fn test_upsert_item_rejects_price_beyond_storage_range() {
    let t = setup().await;
    t.seed("ath-1", "item-1", "1000.00").await;

    for price in [Decimal::MAX, d("79228162514264337593543950335"), d("100000000000000000000.00")] {
        let err = t
            .engine
            .catalog
            .upsert_item("item-huge", &listing("ath-1", price), &admin())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)), "price {}: {:?}", price, err);
    }

    assert!(matches!(
        t.engine.catalog.item("item-huge").await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn test_upsert_item_updates_existing_listing() {
    let t = setup().await;
    t.seed("ath-1", "item-1", "1000.00").await;

    let updated = t
        .engine
        .catalog
        .upsert_item("item-1", &listing("ath-1", d("250.5")), &admin())
        .await
        .unwrap();

    assert_eq!(updated.base_price, d("250.50"));
    assert_eq!(t.engine.catalog.item("item-1").await.unwrap().title, "Final goal");
}
