pub mod config;
pub mod db;
pub mod error;
pub mod log_event;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod validation;
