//! HTTP request handlers for the Leaflet web server

pub mod analysis;
pub mod config;
pub mod health;
pub mod history;
pub mod types;

pub use analysis::*;
pub use config::*;
pub use health::*;
pub use history::*;
pub use types::*;
