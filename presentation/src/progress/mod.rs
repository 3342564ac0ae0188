//! Progress reporting for dispatches

pub mod reporter;

pub use reporter::DispatchProgress;
