use mongodb::{
    Database, IndexModel,
    bson::{doc, oid::ObjectId},
    options::IndexOptions,
};

use crate::error::StoreError;
use crate::models::Company;

pub async fn ensure_indexes(db: &Database) -> Result<(), StoreError> {
    // companies: unique symbol
    {
        let col = db.collection::<mongodb::bson::Document>("companies");
        let model = IndexModel::builder()
            .keys(doc! { "symbol": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        col.create_index(model, None).await?;
    }

    // alerts: the monitor scan (is_active + symbol)
    {
        let col = db.collection::<mongodb::bson::Document>("alerts");
        let model = IndexModel::builder()
            .keys(doc! { "is_active": 1, "symbol": 1 })
            .build();

        col.create_index(model, None).await?;
    }

    // triggered_alerts: per-user history, newest first
    {
        let col = db.collection::<mongodb::bson::Document>("triggered_alerts");
        let model = IndexModel::builder()
            .keys(doc! { "user_id": 1, "fired_at": -1 })
            .build();

        col.create_index(model, None).await?;
    }

    Ok(())
}

/// The tracked universe. Small and fixed; alerts only reference these.
const COMPANIES: &[(&str, &str)] = &[
    ("AAPL", "Apple Inc."),
    ("MSFT", "Microsoft Corporation"),
    ("GOOGL", "Alphabet Inc."),
    ("AMZN", "Amazon.com, Inc."),
    ("NVDA", "NVIDIA Corporation"),
    ("TSLA", "Tesla, Inc."),
];

/// Insert any missing companies. Idempotent; existing records are left
/// untouched.
pub async fn seed_companies(db: &Database) -> Result<(), StoreError> {
    let col = db.collection::<Company>("companies");

    for &(symbol, name) in COMPANIES {
        if col.find_one(doc! { "symbol": symbol }, None).await?.is_some() {
            continue;
        }

        let company = Company {
            id: ObjectId::new(),
            symbol: symbol.to_string(),
            name: name.to_string(),
        };

        col.insert_one(&company, None).await?;
    }

    Ok(())
}
