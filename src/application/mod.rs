// Application layer - Use cases and the ports they depend on
pub mod dashboard_surface;
pub mod label_formatter;
pub mod metrics_backend;
pub mod refresh_controller;
pub mod scheduler;
pub mod series_synthesizer;
pub mod service_gateway;
pub mod status_aggregator;
