//! HTTP API handlers for salesdash-web

pub mod dashboard;
pub mod health;

pub use dashboard::{get_channel, get_overview, list_channels, trigger_refresh};
pub use health::health_routes;
