//! MongoDB connection management

mod codec;
mod config;
mod connector;
mod health;

pub use codec::{
    datetime_bson, fixed_rfc3339, is_duplicate_key_error, to_stored_document, uuid_bson,
};
pub use config::MongoConfig;
pub use connector::{connect_from_config, connect_from_config_with_retry};
pub use health::{HealthStatus, check_health, check_health_detailed};

pub use mongodb::{Client, Collection, Database};
