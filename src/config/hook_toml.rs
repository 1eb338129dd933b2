//! Hook configuration from TOML files and the command line
//!
//! Settings are merged from several layers, lowest precedence first:
//!
//! 1. the `[tool.cmake_pc_hooks]` table of `pyproject.toml`
//! 2. the root table of `cmake_pc_hooks.toml`
//! 3. the root table of the file given with `--config`
//! 4. the command line
//!
//! ```toml
//! # cmake_pc_hooks.toml
//! build_dir = ["build", "build-debug"]
//! defines = ["BUILD_TESTING=ON"]
//! all_at_once = true
//! linux = ["-DCMAKE_CXX_COMPILER=g++"]
//! ```
//!
//! Scalars set in a higher layer replace lower ones. A list set in a TOML
//! layer replaces the lists of lower TOML layers, while values given on the
//! command line are appended to it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::{hints, HookError};

/// Name of the default configuration file looked up in the working directory
pub const DEFAULT_CONFIG_NAME: &str = "cmake_pc_hooks.toml";

/// Dotted path of the hooks table inside `pyproject.toml`
pub const PYPROJECT_SECTION: &str = "tool.cmake_pc_hooks";

/// Default source directory
pub const DEFAULT_SOURCE_DIR: &str = ".";

/// Hook configuration
///
/// Every field is optional so that a value of `None` means "not set in this
/// layer". Use the accessor methods to read values with defaults applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HookConfig {
    /// Path to the source directory (`-S`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_dir: Option<PathBuf>,

    /// Candidate build directories, in order of preference (`-B`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_dir: Option<Vec<PathBuf>>,

    /// Cache entries to create or update (`-D`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defines: Option<Vec<String>>,

    /// Cache entries to remove (`-U`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub undefines: Option<Vec<String>>,

    /// Build system generator (`-G`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,

    /// Generator toolset (`-T`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toolset: Option<String>,

    /// Generator platform (`-A`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,

    /// Configure preset name (`--preset`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,

    /// `-Wdev`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_warnings: Option<bool>,

    /// `-Wno-dev`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_dev_warnings: Option<bool>,

    /// `-Werror=dev`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_errors: Option<bool>,

    /// `-Wno-error=dev`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_dev_errors: Option<bool>,

    /// CMake arguments for Linux and macOS
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unix: Option<Vec<String>>,

    /// CMake arguments for Linux only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linux: Option<Vec<String>>,

    /// CMake arguments for macOS only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac: Option<Vec<String>>,

    /// CMake arguments for Windows only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub win: Option<Vec<String>>,

    /// Start from an empty build directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clean: Option<bool>,

    /// Explicit path to the CMake executable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmake: Option<PathBuf>,

    /// Trace `configure_file()` calls and lint the generated files too
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detect_configured_files: Option<bool>,

    /// Look for an existing build directory inside the source directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub automatic_discovery: Option<bool>,

    /// Never run CMake configure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_cmake_configure: Option<bool>,

    /// Run the tool once with all files instead of once per file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_at_once: Option<bool>,

    /// Also process every file listed in the compilation database
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_json_db: Option<bool>,

    /// Required version of the wrapped tool
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Formatters only: do not print a diff of the changes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_diff: Option<bool>,
}

/// Which part of a TOML document a layer is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TomlSection<'a> {
    /// Top-level keys only; nested tables are ignored
    Root,
    /// A dotted table path such as `tool.cmake_pc_hooks`
    Table(&'a str),
}

impl HookConfig {
    /// Parse a configuration layer from TOML text
    pub fn parse(content: &str, section: TomlSection<'_>, origin: &Path) -> Result<Option<Self>> {
        let document: toml::Table = toml::from_str(content).map_err(|e| {
            HookError::config_error_with_hint(
                format!("Failed to parse {}", origin.display()),
                Some(e.into()),
                hints::invalid_toml(),
            )
        })?;

        let table = match section {
            TomlSection::Root => document
                .into_iter()
                .filter(|(_, value)| !value.is_table())
                .collect::<toml::Table>(),
            TomlSection::Table(path) => {
                let mut current = document;
                for key in path.split('.') {
                    match current.remove(key) {
                        Some(toml::Value::Table(inner)) => current = inner,
                        _ => {
                            tracing::debug!(
                                "{} does not have a [{}] table (not an error)",
                                origin.display(),
                                path
                            );
                            return Ok(None);
                        }
                    }
                }
                current
            }
        };

        tracing::debug!("loading hook settings from {}", origin.display());
        let config: Self = toml::Value::Table(table).try_into().map_err(|e: toml::de::Error| {
            HookError::config_error_with_hint(
                format!("Invalid settings in {}: {}", origin.display(), e.message()),
                Some(e.into()),
                hints::invalid_toml(),
            )
        })?;
        Ok(Some(config))
    }

    /// Load a configuration layer from a file
    ///
    /// A missing file is only an error when `must_exist` is set.
    pub fn load(path: &Path, section: TomlSection<'_>, must_exist: bool) -> Result<Option<Self>> {
        if !path.is_file() {
            if must_exist {
                return Err(HookError::config_error(format!(
                    "Unable to locate TOML file {}",
                    path.display()
                ))
                .into());
            }
            tracing::debug!("TOML file {} does not exist (not an error)", path.display());
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;
        Self::parse(&content, section, path)
    }

    /// Load and merge every configuration layer
    ///
    /// `cwd` is the directory where `pyproject.toml` and the default TOML
    /// file are looked up; `config_file` is the `--config` argument and `cli`
    /// the layer built from the command line.
    pub fn load_layered(cwd: &Path, config_file: Option<&Path>, cli: HookConfig) -> Result<Self> {
        let mut merged = HookConfig::default();

        let toml_layers = [
            Self::load(
                &cwd.join("pyproject.toml"),
                TomlSection::Table(PYPROJECT_SECTION),
                false,
            )?,
            Self::load(&cwd.join(DEFAULT_CONFIG_NAME), TomlSection::Root, false)?,
            match config_file {
                Some(path) => Self::load(&cwd.join(path), TomlSection::Root, true)?,
                None => None,
            },
        ];

        for layer in toml_layers.into_iter().flatten() {
            merged.overlay(layer);
        }
        merged.apply_command_line(cli);
        Ok(merged)
    }

    /// Overlay a higher-precedence TOML layer: every value it sets wins
    pub fn overlay(&mut self, upper: HookConfig) {
        macro_rules! replace {
            ($($field:ident),* $(,)?) => {
                $(if upper.$field.is_some() { self.$field = upper.$field; })*
            };
        }
        replace!(
            source_dir, build_dir, defines, undefines, generator, toolset, platform, preset,
            dev_warnings, no_dev_warnings, dev_errors, no_dev_errors, unix, linux, mac, win,
            clean, cmake, detect_configured_files, automatic_discovery, no_cmake_configure,
            all_at_once, read_json_db, version, no_diff,
        );
    }

    /// Apply the command-line layer: scalars win, lists are appended
    pub fn apply_command_line(&mut self, cli: HookConfig) {
        macro_rules! append {
            ($($field:ident),* $(,)?) => {
                $(if let Some(values) = cli.$field {
                    self.$field.get_or_insert_with(Vec::new).extend(values);
                })*
            };
        }
        macro_rules! replace {
            ($($field:ident),* $(,)?) => {
                $(if cli.$field.is_some() { self.$field = cli.$field; })*
            };
        }
        append!(build_dir, defines, undefines, unix, linux, mac, win);
        replace!(
            source_dir, generator, toolset, platform, preset, dev_warnings, no_dev_warnings,
            dev_errors, no_dev_errors, clean, cmake, detect_configured_files,
            automatic_discovery, no_cmake_configure, all_at_once, read_json_db, version, no_diff,
        );
    }

    /// Render the settings that differ from their defaults as TOML
    pub fn dump_toml(&self) -> Result<String> {
        let mut changed = self.clone();
        changed.strip_defaults();
        toml::to_string(&changed).context("Failed to serialize hook settings to TOML")
    }

    /// Unset every value equal to its default
    fn strip_defaults(&mut self) {
        macro_rules! unset_false {
            ($($field:ident),* $(,)?) => {
                $(if self.$field == Some(false) { self.$field = None; })*
            };
        }
        macro_rules! unset_empty {
            ($($field:ident),* $(,)?) => {
                $(if self.$field.as_ref().is_some_and(|values| values.is_empty()) {
                    self.$field = None;
                })*
            };
        }
        unset_false!(
            dev_warnings, no_dev_warnings, dev_errors, no_dev_errors, clean,
            detect_configured_files, no_cmake_configure, all_at_once, read_json_db, no_diff,
        );
        unset_empty!(build_dir, defines, undefines, unix, linux, mac, win);
        if self.automatic_discovery == Some(true) {
            self.automatic_discovery = None;
        }
        if self.source_dir.as_deref() == Some(Path::new(DEFAULT_SOURCE_DIR)) {
            self.source_dir = None;
        }
    }

    /// Source directory (defaults to the working directory)
    pub fn source_dir(&self) -> PathBuf {
        self.source_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE_DIR))
    }

    /// Candidate build directories
    pub fn build_dirs(&self) -> &[PathBuf] {
        self.build_dir.as_deref().unwrap_or_default()
    }

    /// Whether automatic build directory discovery is enabled (default: yes)
    pub fn automatic_discovery(&self) -> bool {
        self.automatic_discovery.unwrap_or(true)
    }

    /// CMake arguments for the given OS (as in `std::env::consts::OS`)
    pub fn platform_args(&self, os: &str) -> Vec<String> {
        let unix = self.unix.as_deref().unwrap_or_default();
        let specific = match os {
            "linux" => self.linux.as_deref(),
            "macos" => self.mac.as_deref(),
            "windows" => self.win.as_deref(),
            _ => None,
        }
        .unwrap_or_default();

        let mut args = Vec::new();
        if matches!(os, "linux" | "macos") {
            args.extend(unix.iter().cloned());
        }
        args.extend(specific.iter().cloned());
        args
    }
}

/// Read a boolean setting, treating "not set" as false
pub fn flag(value: Option<bool>) -> bool {
    value.unwrap_or(false)
}

/// Read a list setting, treating "not set" as empty
pub fn list(value: &Option<Vec<String>>) -> &[String] {
    value.as_deref().unwrap_or_default()
}
