//! Validation of the merged hook configuration

use std::path::Path;

use anyhow::Result;

use super::hook_toml::{flag, HookConfig};
use crate::error::HookError;
use crate::utils::terminal::print_warning;

/// Validate the merged configuration before anything is executed
pub fn validate_config(config: &HookConfig) -> Result<()> {
    if let Some(preset) = &config.preset {
        validate_preset(preset)?;
    }

    validate_source_dir(&config.source_dir())?;

    if flag(config.dev_warnings) && flag(config.no_dev_warnings) {
        print_warning("both -Wdev and -Wno-dev given; CMake will honor the last one (-Wno-dev)");
    }
    if flag(config.dev_errors) && flag(config.no_dev_errors) {
        print_warning(
            "both -Werror=dev and -Wno-error=dev given; CMake will honor the last one (-Wno-error=dev)",
        );
    }

    Ok(())
}

/// A configure preset is referenced by name, never by path
fn validate_preset(preset: &str) -> Result<()> {
    let looks_like_path = preset.contains('/')
        || preset.contains('\\')
        || preset.ends_with(".json")
        || preset.is_empty();

    if looks_like_path {
        return Err(HookError::invalid_argument_with_hint(
            format!("'{}' is not a configure preset name", preset),
            "pass --preset as a CMake argument naming one of the configure presets of\n\
             CMakePresets.json or CMakeUserPresets.json (e.g. --preset=default)",
        )
        .into());
    }
    Ok(())
}

fn validate_source_dir(source_dir: &Path) -> Result<()> {
    if !source_dir.is_dir() {
        return Err(HookError::invalid_argument_with_hint(
            format!("{} is not a valid source directory", source_dir.display()),
            "use -S/--source-dir to point to the directory containing the top-level CMakeLists.txt",
        )
        .into());
    }
    Ok(())
}
