//! HTTP gateway: router, handlers and server lifecycle

mod access_log;
mod coins;
mod extract;
mod response;
pub mod router;
pub mod server;
mod token_metrics;
mod tools;

pub use router::{AppState, create_router};
pub use server::Gateway;
