//! Business logic services.

pub mod api_key;
pub mod auth_admin;
pub mod dashboard;
pub mod header_map;
pub mod ingest;
pub mod reconcile;
pub mod search;
pub mod spreadsheet;
pub mod status;
pub mod storage;

pub use auth_admin::configure_routes as configure_auth_routes;
pub use reconcile::start_reconciliation_task;
pub use storage::Storage;
