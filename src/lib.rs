pub mod app;
pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::inventory_service::{InventoryError, InventoryService};
pub use domain::analytics::{Dashboard, ProductMetrics, RestockItem};
pub use domain::model::{Category, CategoryChoice, NewCategory, NewProduct, Product};
pub use infra::config::Config;
pub use storage::{InventoryStore, MemoryStore, PostgresStore, PostgrestStore};
