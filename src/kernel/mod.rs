pub mod cancel;
pub mod ducking;
pub mod event;
pub mod plan;
pub mod reactor;
pub mod scheduler;
pub mod sources;
pub mod state;
pub mod telemetry;
pub mod time;
