// Read-only web dashboard serving live reports over HTTP

pub mod server;

pub use server::{build_router, start_server, DashboardState, SharedState};
