pub mod protocol;
pub mod quiz;
pub mod rest;
pub mod router;
pub mod state;
pub mod timer_task;

pub use router::build_router;
pub use state::AppState;
