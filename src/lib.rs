pub mod color;
pub mod config;
pub mod error;
pub mod export;
pub mod import;
pub mod mapping;
pub mod path_data;
pub mod scene;
pub mod xml;

#[cfg(feature = "cli")]
pub mod cli;

#[cfg(feature = "cli")]
pub use cli::run;
