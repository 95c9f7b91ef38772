pub mod app;
pub mod config;
pub mod keybinds;
pub mod qr;
pub mod setup;
pub mod ui;
pub mod verification;

pub use config::Config;
