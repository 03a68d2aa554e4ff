//! tabclean API Server module
//!
//! Provides the HTTP upload API. Run with `tabclean-server`.

pub mod handlers;
pub mod server;

pub use server::{build_router, run_api_server, ApiConfig};
