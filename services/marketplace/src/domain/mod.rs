pub mod realtime;
pub mod repository;
pub mod types;
pub mod webhook;
