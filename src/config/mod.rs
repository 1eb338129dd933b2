//! Hook configuration: layered TOML settings and their validation

pub mod hook_toml;
pub mod validation;

pub use hook_toml::{HookConfig, TomlSection, DEFAULT_CONFIG_NAME, PYPROJECT_SECTION};
pub use validation::validate_config;
