// Presentation layer - HTTP surface over the dashboard registry
pub mod app_state;
pub mod handlers;
