//! Result records returned by the billing routes

use serde::{Deserialize, Serialize};

/// In-app purchase as reported by `validatePurchase`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Purchase {
    /// 0 = consumed, 1 = not yet consumed
    pub consumption_state: i32,
    /// 0 = purchased, 1 = refunded
    pub purchase_state: i32,
    pub kind: String,
    pub developer_payload: String,
    /// Unix milliseconds
    pub purchase_time: i64,
}

/// Subscription status as reported by `getSubscriptionStatus`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Subscription {
    pub kind: String,
    pub initiation_timestamp_msec: i64,
    pub valid_until_timestamp_msec: i64,
    pub auto_renewing: bool,
}
