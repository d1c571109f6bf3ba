use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct CreateSubscriptionDoc {
    #[schema(example = "Yandex Plus")]
    pub service_name: String,
    #[schema(example = 400)]
    pub price: i32,
    #[schema(example = "60601fee-2bf1-4721-ae6f-7636e79a0cba")]
    pub user_id: String,
    #[schema(format = Date, example = "2025-07-01")]
    pub start_date: String,
    #[schema(format = Date)]
    pub end_date: Option<String>,
}

#[derive(ToSchema)]
pub struct UpdateSubscriptionDoc {
    pub service_name: Option<String>,
    pub price: Option<i32>,
    #[schema(format = Date)]
    pub start_date: Option<String>,
    #[schema(format = Date)]
    pub end_date: Option<String>,
}

#[derive(ToSchema)]
pub struct SubscriptionDoc {
    pub id: i32,
    pub service_name: String,
    pub price: i32,
    pub user_id: String,
    #[schema(format = Date)]
    pub start_date: String,
    #[schema(format = Date)]
    pub end_date: Option<String>,
    #[schema(format = DateTime)]
    pub created_at: String,
}

#[derive(ToSchema)]
pub struct CreatedDoc { pub id: i32 }

#[derive(ToSchema)]
pub struct SummaryDoc { pub total: i64 }

#[derive(ToSchema)]
pub struct StatusDoc {
    #[schema(example = "ok")]
    pub status: String,
}

#[derive(ToSchema)]
pub struct ErrorDoc {
    pub error: String,
    pub message: String,
    /// 1001 validation, 1003 not found, 1200 storage
    pub code: u16,
}

#[derive(OpenApi)]
#[openapi(
    info(title = "Subscription Service", description = "Service for managing user subscriptions"),
    paths(
        crate::routes::health,
        crate::routes::subscriptions::create,
        crate::routes::subscriptions::list,
        crate::routes::subscriptions::summary,
        crate::routes::subscriptions::get_one,
        crate::routes::subscriptions::update,
        crate::routes::subscriptions::delete,
    ),
    components(
        schemas(
            HealthResponse,
            CreateSubscriptionDoc,
            UpdateSubscriptionDoc,
            SubscriptionDoc,
            CreatedDoc,
            SummaryDoc,
            StatusDoc,
            ErrorDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "subscriptions")
    )
)]
pub struct ApiDoc;
