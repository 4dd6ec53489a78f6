//! Order rows, read only for the admin dashboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopfront_core::{OrderId, Price, UserId};

use super::null_as_default;

/// Table holding orders.
pub const TABLE: &str = "orders";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: Price,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    pub created_at: DateTime<Utc>,
}
