pub mod cache;
pub mod clock;
pub mod config;
pub mod db;
pub mod errors;
pub mod forms;
pub mod handlers;
pub mod models;
pub mod notify;
pub mod page;
pub mod store;
pub mod table;
pub mod utils;
