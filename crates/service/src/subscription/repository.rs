use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
    UpdateMany, Value,
};

use models::subscription::{self, Column, Entity as SubscriptionEntity};

use super::domain::{NewSubscription, SubscriptionFilter, SubscriptionPatch};
use crate::errors::ServiceError;

/// Persistence of subscription records and the spend aggregation.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Insert a row; the store assigns `id` and `created_at`.
    async fn create(&self, input: &NewSubscription) -> Result<i32, ServiceError>;
    /// All rows ordered by `id`.
    async fn list(&self) -> Result<Vec<subscription::Model>, ServiceError>;
    async fn get(&self, id: i32) -> Result<subscription::Model, ServiceError>;
    /// An empty patch succeeds without touching storage.
    async fn update(&self, id: i32, patch: &SubscriptionPatch) -> Result<(), ServiceError>;
    async fn delete(&self, id: i32) -> Result<(), ServiceError>;
    /// `SUM(price)` over matching rows, `0` when none match.
    async fn sum_by_filter(&self, filter: &SubscriptionFilter) -> Result<i64, ServiceError>;
}

fn missing(id: i32) -> ServiceError {
    ServiceError::not_found(&format!("subscription {id}"))
}

/// `UPDATE subscriptions SET <present columns> WHERE id = $n`, or `None` for an empty patch.
pub fn update_statement(id: i32, patch: &SubscriptionPatch) -> Option<UpdateMany<SubscriptionEntity>> {
    let mut assignments: Vec<(Column, Value)> = Vec::new();
    if let Some(name) = &patch.service_name { assignments.push((Column::ServiceName, name.clone().into())); }
    if let Some(price) = patch.price { assignments.push((Column::Price, price.into())); }
    if let Some(start) = patch.start_date { assignments.push((Column::StartDate, start.into())); }
    if let Some(end) = patch.end_date { assignments.push((Column::EndDate, end.into())); }

    if assignments.is_empty() {
        return None;
    }

    let stmt = assignments
        .into_iter()
        .fold(SubscriptionEntity::update_many(), |q, (col, val)| q.col_expr(col, Expr::val(val).into()));
    Some(stmt.filter(Column::Id.eq(id)))
}

/// `SELECT COALESCE(SUM(price), 0) AS total FROM subscriptions [WHERE ...]`,
/// with one bound condition per present filter dimension.
pub fn sum_statement(filter: &SubscriptionFilter) -> Select<SubscriptionEntity> {
    let mut conditions: Vec<SimpleExpr> = Vec::new();
    if let Some(user_id) = filter.user_id.as_deref() { conditions.push(Column::UserId.eq(user_id)); }
    if let Some(service_name) = filter.service_name.as_deref() { conditions.push(Column::ServiceName.eq(service_name)); }
    if let Some(from) = filter.from { conditions.push(Column::StartDate.gte(from)); }
    if let Some(to) = filter.to { conditions.push(Column::StartDate.lte(to)); }

    let total: SimpleExpr = Func::coalesce([Expr::col(Column::Price).sum(), Expr::val(0i64).into()]).into();
    conditions
        .into_iter()
        .fold(SubscriptionEntity::find().select_only().column_as(total, "total"), |q, c| q.filter(c))
}

/// SeaORM-backed repository implementation.
pub struct SeaOrmSubscriptionRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmSubscriptionRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

#[async_trait]
impl SubscriptionRepository for SeaOrmSubscriptionRepository {
    async fn create(&self, input: &NewSubscription) -> Result<i32, ServiceError> {
        let am = subscription::ActiveModel {
            service_name: Set(input.service_name.clone()),
            price: Set(input.price),
            user_id: Set(input.user_id.clone()),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            ..Default::default()
        };
        let res = SubscriptionEntity::insert(am).exec(&self.db).await?;
        Ok(res.last_insert_id)
    }

    async fn list(&self) -> Result<Vec<subscription::Model>, ServiceError> {
        let rows = SubscriptionEntity::find().order_by_asc(Column::Id).all(&self.db).await?;
        Ok(rows)
    }

    async fn get(&self, id: i32) -> Result<subscription::Model, ServiceError> {
        SubscriptionEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| missing(id))
    }

    async fn update(&self, id: i32, patch: &SubscriptionPatch) -> Result<(), ServiceError> {
        let Some(stmt) = update_statement(id, patch) else { return Ok(()); };
        let res = stmt.exec(&self.db).await?;
        if res.rows_affected == 0 {
            return Err(missing(id));
        }
        Ok(())
    }

    async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let res = SubscriptionEntity::delete_by_id(id).exec(&self.db).await?;
        if res.rows_affected == 0 {
            return Err(missing(id));
        }
        Ok(())
    }

    async fn sum_by_filter(&self, filter: &SubscriptionFilter) -> Result<i64, ServiceError> {
        let total = sum_statement(filter).into_tuple::<i64>().one(&self.db).await?;
        Ok(total.unwrap_or(0))
    }
}

/// Simple in-memory repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Mutex, MutexGuard};

    use chrono::Utc;

    #[derive(Default)]
    struct Rows {
        next_id: i32,
        by_id: BTreeMap<i32, subscription::Model>,
    }

    #[derive(Default)]
    pub struct InMemorySubscriptionRepository {
        rows: Mutex<Rows>,
        unavailable: AtomicBool,
        // Counts statements that reached storage; empty patches must not.
        writes: std::sync::atomic::AtomicUsize,
    }

    impl InMemorySubscriptionRepository {
        /// Make every call fail with a storage error, as if the database were down.
        pub fn set_unavailable(&self, down: bool) {
            self.unavailable.store(down, Ordering::SeqCst);
        }

        pub fn write_count(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }

        fn rows(&self) -> Result<MutexGuard<'_, Rows>, ServiceError> {
            if self.unavailable.load(Ordering::SeqCst) {
                return Err(ServiceError::Db("connection refused".into()));
            }
            self.rows.lock().map_err(|e| ServiceError::Db(e.to_string()))
        }
    }

    #[async_trait]
    impl SubscriptionRepository for InMemorySubscriptionRepository {
        async fn create(&self, input: &NewSubscription) -> Result<i32, ServiceError> {
            let mut rows = self.rows()?;
            rows.next_id += 1;
            let id = rows.next_id;
            rows.by_id.insert(id, subscription::Model {
                id,
                service_name: input.service_name.clone(),
                price: input.price,
                user_id: input.user_id.clone(),
                start_date: input.start_date,
                end_date: input.end_date,
                created_at: Utc::now().into(),
            });
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(id)
        }

        async fn list(&self) -> Result<Vec<subscription::Model>, ServiceError> {
            Ok(self.rows()?.by_id.values().cloned().collect())
        }

        async fn get(&self, id: i32) -> Result<subscription::Model, ServiceError> {
            self.rows()?.by_id.get(&id).cloned().ok_or_else(|| missing(id))
        }

        async fn update(&self, id: i32, patch: &SubscriptionPatch) -> Result<(), ServiceError> {
            if patch.is_empty() {
                return Ok(());
            }
            let mut rows = self.rows()?;
            let row = rows.by_id.get_mut(&id).ok_or_else(|| missing(id))?;
            patch.apply_to(row);
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn delete(&self, id: i32) -> Result<(), ServiceError> {
            let mut rows = self.rows()?;
            rows.by_id.remove(&id).ok_or_else(|| missing(id))?;
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn sum_by_filter(&self, filter: &SubscriptionFilter) -> Result<i64, ServiceError> {
            let rows = self.rows()?;
            Ok(rows.by_id.values().filter(|r| filter.matches(r)).map(|r| i64::from(r.price)).sum())
        }
    }
}
