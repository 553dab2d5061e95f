// Issue tracker REST access: raw record types, errors and the rate-limited client

pub mod client;
pub mod errors;
pub mod types;

pub use client::{TrackerClient, TrackerOps};
pub use errors::TrackerError;
pub use types::{Board, RawIssue};

#[cfg(test)]
pub use client::MockTrackerOps;
