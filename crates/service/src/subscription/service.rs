use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, instrument};

use models::subscription;

use super::domain::{NewSubscription, SubscriptionFilter, SubscriptionPatch};
use super::repository::SubscriptionRepository;
use crate::errors::ServiceError;

/// Calendar date format accepted by the summary query.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Application service encapsulating subscription business rules.
/// Validates inputs, parses summary dates and adds operation context to store errors.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use chrono::NaiveDate;
/// use service::subscription::{NewSubscription, SubscriptionService, repository::mock::InMemorySubscriptionRepository};
///
/// let svc = SubscriptionService::new(Arc::new(InMemorySubscriptionRepository::default()));
/// let input = NewSubscription {
///     service_name: "Yandex Plus".into(),
///     price: 400,
///     user_id: "60601fee-2bf1-4721-ae6f-7636e79a0cba".into(),
///     start_date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
///     end_date: None,
/// };
/// let id = tokio_test::block_on(svc.create(input)).unwrap();
/// let total = tokio_test::block_on(svc.sum_by_period(
///     "60601fee-2bf1-4721-ae6f-7636e79a0cba", "", "2025-01-01", "2025-12-31",
/// )).unwrap();
/// assert_eq!(id, 1);
/// assert_eq!(total, 400);
/// ```
pub struct SubscriptionService {
    repo: Arc<dyn SubscriptionRepository>,
}

impl SubscriptionService {
    pub fn new(repo: Arc<dyn SubscriptionRepository>) -> Self { Self { repo } }

    #[instrument(skip(self, input), fields(user_id = %input.user_id, service_name = %input.service_name))]
    pub async fn create(&self, input: NewSubscription) -> Result<i32, ServiceError> {
        subscription::validate_service_name(&input.service_name)?;
        subscription::validate_user_id(&input.user_id)?;
        subscription::validate_price(input.price)?;
        subscription::validate_period(input.start_date, input.end_date)?;

        let id = self.repo.create(&input).await.map_err(|e| e.context("create subscription"))?;
        info!(id, "subscription_created");
        Ok(id)
    }

    pub async fn list(&self) -> Result<Vec<subscription::Model>, ServiceError> {
        self.repo.list().await.map_err(|e| e.context("list subscriptions"))
    }

    pub async fn get(&self, id: i32) -> Result<subscription::Model, ServiceError> {
        self.repo.get(id).await.map_err(|e| e.context(format!("get subscription {id}")))
    }

    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: i32, patch: SubscriptionPatch) -> Result<(), ServiceError> {
        if let Some(name) = &patch.service_name { subscription::validate_service_name(name)?; }
        if let Some(price) = patch.price { subscription::validate_price(price)?; }

        self.repo.update(id, &patch).await.map_err(|e| e.context(format!("update subscription {id}")))?;
        if !patch.is_empty() {
            info!(id, "subscription_updated");
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        self.repo.delete(id).await.map_err(|e| e.context(format!("delete subscription {id}")))?;
        info!(id, "subscription_deleted");
        Ok(())
    }

    /// Total price of subscriptions starting within `[from, to]` (inclusive,
    /// `YYYY-MM-DD`). Empty `user_id` / `service_name` leave that dimension unfiltered.
    #[instrument(skip(self))]
    pub async fn sum_by_period(
        &self,
        user_id: &str,
        service_name: &str,
        from: &str,
        to: &str,
    ) -> Result<i64, ServiceError> {
        let from_date = parse_date("from", from)?;
        let to_date = parse_date("to", to)?;
        if from_date > to_date {
            return Err(ServiceError::Validation(format!("'from' ({from}) must not be after 'to' ({to})")));
        }

        let filter = SubscriptionFilter {
            user_id: non_empty(user_id),
            service_name: non_empty(service_name),
            from: Some(from_date),
            to: Some(to_date),
        };
        self.repo.sum_by_filter(&filter).await.map_err(|e| e.context("sum subscriptions by period"))
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

/// Parse a `YYYY-MM-DD` calendar date; `field` names the parameter in the error.
pub fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, ServiceError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| {
        ServiceError::Validation(format!("invalid '{field}' date {raw:?}, expected YYYY-MM-DD: {e}"))
    })
}
