// Domain layer - Pure models of the dashboard
pub mod chart;
pub mod metrics;
pub mod notification;
pub mod range;
pub mod service;
pub mod status;
