//! `SeaORM` Entity for the idempotency_keys table.
//!
//! One row per client-supplied key, written in the same database
//! transaction as the operation it deduplicates, so the mapping survives
//! restarts and is visible to every instance of the service.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A deduplicated operation request.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "idempotency_keys")]
pub struct Model {
    /// The caller-supplied key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    /// Hex SHA-256 fingerprint of the original request.
    pub request_hash: String,
    /// The transaction the original request produced.
    pub transaction_id: Uuid,
    /// First-seen timestamp.
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
