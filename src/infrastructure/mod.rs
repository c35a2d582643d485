pub mod database;
pub mod memory;
pub mod metrics;

// Re-export the factory functions for easy access
pub use database::{connect_with_retry, create_postgres_stores};
pub use memory::create as create_memory_stores;
pub use metrics::{create_metrics, create_noop_metrics, create_prom_metrics};
