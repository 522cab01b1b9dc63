//! API endpoint modules.

pub mod batches;
pub mod clients;
pub mod dashboard;
pub mod field_mappings;
pub mod health;
pub mod openapi;
pub mod templates;
pub mod tenants;
pub mod vehicles;

pub use batches::configure_routes as configure_batch_routes;
pub use clients::configure_routes as configure_client_routes;
pub use dashboard::configure_routes as configure_dashboard_routes;
pub use field_mappings::configure_routes as configure_mapping_routes;
pub use health::configure_health_routes;
pub use openapi::ApiDoc;
pub use templates::configure_routes as configure_template_routes;
pub use tenants::configure_routes as configure_tenant_routes;
pub use vehicles::configure_routes as configure_vehicle_routes;
