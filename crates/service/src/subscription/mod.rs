pub mod domain;
pub mod repository;
pub mod service;

pub use domain::{NewSubscription, SubscriptionFilter, SubscriptionPatch};
pub use repository::{SeaOrmSubscriptionRepository, SubscriptionRepository};
pub use service::SubscriptionService;
