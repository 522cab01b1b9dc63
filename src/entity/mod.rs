//! SeaORM entity definitions for PostgreSQL database.

pub mod api_key;
pub mod client;
pub mod field_mapping;
pub mod status_event;
pub mod tenant;
pub mod upload_batch;
pub mod vehicle_record;
