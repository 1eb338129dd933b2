//! Reading the CMake compilation database (`compile_commands.json`)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// File name of the compilation database inside a build directory
pub const COMPILE_COMMANDS: &str = "compile_commands.json";

/// One entry of the compilation database
#[derive(Debug, Clone, Deserialize)]
pub struct CompileCommand {
    /// Working directory of the compilation
    #[serde(default)]
    pub directory: PathBuf,
    /// Main translation unit source
    pub file: PathBuf,
    /// Compile command as a single shell-escaped string
    #[serde(default)]
    pub command: Option<String>,
    /// Compile command as a list of arguments
    #[serde(default)]
    pub arguments: Option<Vec<String>>,
}

impl CompileCommand {
    /// Absolute path of the source file
    pub fn source_path(&self) -> PathBuf {
        if self.file.is_absolute() {
            self.file.clone()
        } else {
            self.directory.join(&self.file)
        }
    }
}

/// Path of the compilation database of `build_dir`
pub fn compile_db_path(build_dir: &Path) -> PathBuf {
    build_dir.join(COMPILE_COMMANDS)
}

/// Parse a compilation database from its JSON text
pub fn parse_compile_commands(content: &str) -> Result<Vec<CompileCommand>> {
    serde_json::from_str(content).context("Invalid compilation database")
}

/// List the source files of a compilation database
///
/// A missing database yields an empty list.
pub fn read_compile_commands(path: &Path) -> Result<Vec<String>> {
    if !path.is_file() {
        tracing::debug!("no compilation database at {}", path.display());
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let commands = parse_compile_commands(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    Ok(commands
        .iter()
        .map(|entry| entry.source_path().to_string_lossy().into_owned())
        .collect())
}
