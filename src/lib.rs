pub mod bootstrap;
pub mod config;
pub mod error;
pub mod events;
pub mod navigator;
pub mod surface;
pub mod terminal;
pub mod timer;
pub mod tasks {
    pub mod driver;
}
