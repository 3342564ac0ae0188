//! Use cases (application services)

pub mod dispatch;
pub mod handle_request;
pub(crate) mod shared;
