pub mod config;
pub mod domain;
pub mod events;
pub mod models;
pub mod observability;
pub mod services;
pub mod workers;

pub use config::*;
pub use models::*;
pub use services::*;
