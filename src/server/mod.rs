//! Server module for building the dashboard HTTP server
//!
//! This module provides a `ServerBuilder` that wires the stores into a
//! `ServerHost` and exposes it through:
//! - Sign-in and sign-out routes
//! - Session-guarded invoice and customer routes

pub mod builder;
pub mod handlers;
pub mod host;
pub mod router;

pub use builder::ServerBuilder;
pub use host::ServerHost;
pub use router::build_router;
