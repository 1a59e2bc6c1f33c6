pub mod cli;
pub mod config;
pub mod docs;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod security;
pub mod server;
pub mod state;

pub use server::app;
pub use state::AppState;
