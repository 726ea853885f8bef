//! TOML config file loading and path resolution.

mod loader;
mod paths;


pub use loader::{load_default, load_from_path, load_optional};
pub use paths::default_config_path;
