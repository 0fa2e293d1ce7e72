//! sea-orm entities for the marketplace database.
//!
//! Status and kind columns are plain strings; the service maps them to the
//! typed enums in `fixlane-domain`. Money columns are `NUMERIC(12,2)`.

pub mod activities;
pub mod jobs;
pub mod maintenance_records;
pub mod messages;
pub mod notifications;
pub mod payments;
pub mod quote_parts;
pub mod quotes;
pub mod service_request_images;
pub mod service_requests;
pub mod users;
pub mod vehicles;
