//! Child process supervision

pub mod supervisor;

pub use supervisor::{
    DEFAULT_KILL_GRACE, DEFAULT_OUTPUT_CAP, LocalProcessSupervisor, SupervisorSettings,
};
