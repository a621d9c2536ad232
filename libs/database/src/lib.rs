//! Database plumbing shared by the API binary and the repository integration tests.
//!
//! # Features
//!
//! - `postgres` (default) - SeaORM connection pool, migrations, health probe
//! - `config` - `core_config::FromEnv` for [`postgres::PostgresConfig`]
//!
//! # Example
//!
//! ```ignore
//! use database::postgres::{self, PostgresConfig};
//! use database::common::RetryConfig;
//! use migration::Migrator;
//!
//! let config = PostgresConfig::from_env()?;
//! let db = postgres::connect_from_config_with_retry(config, Some(RetryConfig::new().with_max_retries(5))).await?;
//! postgres::run_migrations::<Migrator>(&db, "lume_api").await?;
//! ```

pub mod common;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use common::{DatabaseError, DatabaseResult};
