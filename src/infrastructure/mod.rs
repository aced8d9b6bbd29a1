// Infrastructure layer - External dependencies and adapters
pub mod chunked_json;
pub mod config;
pub mod dashboard_registry;
pub mod http_backend;
pub mod http_response;
