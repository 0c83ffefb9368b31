//! Gateway runtime: configuration, handler chain and HTTP server.

mod config;
mod handler;
mod server;

pub use config::GatewayConfig;
pub use crate::error::BoxError;
pub use handler::{full_body, Gateway, GatewayBody, NextHandler, NotFound};
pub use server::GatewayServer;
