// Domain layer - chart, window and sampling models
pub mod agent_status;
pub mod chart;
pub mod error;
pub mod sample;
pub mod time_window;
