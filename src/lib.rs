pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod startup;
pub mod votes;

pub use config::Config;
pub use startup::{AppState, router};
