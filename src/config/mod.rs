mod r#impl;
mod structs;
pub mod validators;

pub use r#impl::{DEFAULT_CONFIG_PATH, get_config, init_config, try_get_config};
pub use structs::*;
pub use validators::validate_config;
