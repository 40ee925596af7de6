// Application layer - sampling engine and use cases
pub mod chart_service;
pub mod sampler;
