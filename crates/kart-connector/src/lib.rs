//! Kart Connector - wires layout, names and the name server together.

pub mod config;
pub mod console;
pub mod controller;
pub mod logging;

pub use config::KartConfig;
pub use controller::Controller;
