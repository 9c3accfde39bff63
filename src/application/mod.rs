// Application layer - use cases and orchestration.
// Front ends talk to `LedgerService`; it validates input, drives the
// repository and saves after every change.

pub mod error;
pub mod reporting;
pub mod service;

pub use error::*;
pub use reporting::*;
pub use service::*;
