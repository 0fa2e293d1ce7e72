pub mod db;
pub mod realtime;
pub mod stripe;
