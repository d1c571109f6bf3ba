use chrono::NaiveDate;
use serde::Deserialize;

use models::subscription;

/// Input for creating a subscription. `id` and `created_at` are not accepted.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct NewSubscription {
    pub service_name: String,
    pub price: i32,
    pub user_id: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

/// Sparse update: only `Some` fields are written.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct SubscriptionPatch {
    #[serde(default)]
    pub service_name: Option<String>,
    #[serde(default)]
    pub price: Option<i32>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl SubscriptionPatch {
    pub fn is_empty(&self) -> bool {
        self.service_name.is_none() && self.price.is_none() && self.start_date.is_none() && self.end_date.is_none()
    }

    /// Apply present fields onto an existing row.
    pub fn apply_to(&self, row: &mut subscription::Model) {
        if let Some(name) = &self.service_name { row.service_name = name.clone(); }
        if let Some(price) = self.price { row.price = price; }
        if let Some(start) = self.start_date { row.start_date = start; }
        if let Some(end) = self.end_date { row.end_date = Some(end); }
    }
}

/// Dimensions of the spend summary. `None` means no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionFilter {
    pub user_id: Option<String>,
    pub service_name: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl SubscriptionFilter {
    /// Same predicate the SQL summary applies; `from`/`to` bound `start_date` inclusively.
    pub fn matches(&self, row: &subscription::Model) -> bool {
        self.user_id.as_deref().map_or(true, |u| row.user_id == u)
            && self.service_name.as_deref().map_or(true, |s| row.service_name == s)
            && self.from.map_or(true, |from| row.start_date >= from)
            && self.to.map_or(true, |to| row.start_date <= to)
    }
}
