pub mod activities;
pub mod jobs;
pub mod maintenance;
pub mod messages;
pub mod notifications;
pub mod payments;
pub mod platform;
pub mod providers;
pub mod quotes;
pub mod requests;
pub mod users;
pub mod vehicles;
pub mod webhooks;
