pub mod art_object;
pub mod checks;
pub mod client;
pub mod config;
pub mod error;
pub mod runner;
pub mod scenarios;
pub mod schema;

pub use client::{CollectionClient, CollectionQuery};
pub use config::ApiConfig;
pub use error::{Error, Result};
