pub mod calendar_repository;
pub mod tracker_repository;

pub use calendar_repository::*;
pub use tracker_repository::*;
