//! Tool detection and validation
//!
//! This module locates the wrapped executables (on `PATH` or inside the
//! active Python virtual environment) and extracts their version strings.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use regex::Regex;
use which::which;

use crate::error::HookError;

/// Locate the first of `names` present on `PATH`
pub fn find_tool(names: &[&str]) -> Option<PathBuf> {
    names.iter().find_map(|name| which(name).ok())
}

/// Require one of `names` to exist, return error with hint if missing
pub fn require_tool(names: &[&str], required_for: &str, hint: &str) -> Result<PathBuf> {
    find_tool(names).ok_or_else(|| {
        HookError::missing_tool(names.join(" / "), required_for, hint).into()
    })
}

/// Whether `command --version` runs and exits successfully
pub fn responds_to_version(command: &[OsString]) -> bool {
    let Some((program, args)) = command.split_first() else {
        return false;
    };
    Command::new(program)
        .args(args)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Look for `name` inside the active Python environment
///
/// The search covers `$VIRTUAL_ENV` (or the directory of the `python3`
/// interpreter when no virtualenv is active) and its `bin` and `Scripts`
/// subdirectories. Each candidate is first tried as an executable and then as
/// a script run through the interpreter (pip-installed `cmake` wrappers).
pub fn find_in_virtualenv(name: &str) -> Option<Vec<OsString>> {
    let python = which("python3").or_else(|_| which("python")).ok();

    let root = match env::var_os("VIRTUAL_ENV") {
        Some(venv) => PathBuf::from(venv),
        None => python.as_deref()?.parent()?.to_path_buf(),
    };
    let search_paths = [root.clone(), root.join("bin"), root.join("Scripts")];

    for base in &search_paths {
        let cmd = vec![base.join(name).into_os_string()];
        if responds_to_version(&cmd) {
            tracing::debug!("found {} in {}", name, base.display());
            return Some(cmd);
        }
    }

    let python = python?;
    for base in &search_paths {
        let cmd = vec![python.clone().into_os_string(), base.join(name).into_os_string()];
        if responds_to_version(&cmd) {
            tracing::debug!("found {} in {} (through Python)", name, base.display());
            return Some(cmd);
        }
    }

    None
}

/// Clap value parser: path must point to an executable file
pub fn executable_path(value: &str) -> Result<PathBuf, String> {
    let path = Path::new(value);
    if path.is_file() && is_executable(path) {
        Ok(path.to_path_buf())
    } else {
        Err(format!(
            "{} is not a valid file and/or does not appear executable",
            value
        ))
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext.to_ascii_lowercase().as_str(), "exe" | "bat" | "cmd" | "com"))
}

/// Extract a version number following `look_behind` in `output`
///
/// With an empty `look_behind` the first version-looking token is returned.
pub fn extract_version(output: &str, look_behind: &str) -> Option<String> {
    let pattern = format!(r"{}((?:\d+\.)+[\d+_+\-a-z]+)", regex::escape(look_behind));
    let re = Regex::new(&pattern).ok()?;
    re.captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Get tool version by running `tool --version`
pub fn tool_version(tool: &Path, look_behind: &str) -> Result<String> {
    let output = Command::new(tool)
        .arg("--version")
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("Failed to run {} --version", tool.display()))?;

    let text = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    extract_version(&text, look_behind).with_context(|| {
        format!(
            "Unable to find a version string in the output of {} --version",
            tool.display()
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_extract_version() {
        assert_eq!(
            extract_version("Ubuntu clang-format version 14.0.0-1ubuntu1\n", "clang-format version "),
            Some("14.0.0-1ubuntu1".to_string())
        );
        assert_eq!(
            extract_version("LLVM (http://llvm.org/):\n  LLVM version 16.0.6\n", "LLVM version "),
            Some("16.0.6".to_string())
        );
        assert_eq!(
            extract_version("Cppcheck 2.13.0\n", "Cppcheck "),
            Some("2.13.0".to_string())
        );
        assert_eq!(
            extract_version("lizard 1.17.10\n", ""),
            Some("1.17.10".to_string())
        );
        assert_eq!(extract_version("no version here", "Cppcheck "), None);
    }

    #[test]
    fn test_find_tool_missing() {
        assert!(find_tool(&["this-tool-does-not-exist-42"]).is_none());
        let err = require_tool(&["this-tool-does-not-exist-42"], "tests", "install it").unwrap_err();
        assert!(err.to_string().contains("this-tool-does-not-exist-42"));
    }

    #[cfg(unix)]
    #[test]
    fn test_executable_path() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let executable = temp_dir.path().join("my-exec");
        fs::write(&executable, "").unwrap();
        fs::set_permissions(&executable, fs::Permissions::from_mode(0o755)).unwrap();

        let a_file = temp_dir.path().join("file.txt");
        fs::write(&a_file, "").unwrap();

        assert_eq!(
            executable_path(executable.to_str().unwrap()).unwrap(),
            executable
        );
        assert!(executable_path(temp_dir.path().to_str().unwrap()).is_err());
        assert!(executable_path(a_file.to_str().unwrap()).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_responds_to_version() {
        assert!(responds_to_version(&[OsString::from("true")]));
        assert!(!responds_to_version(&[OsString::from("false")]));
        assert!(!responds_to_version(&[]));
    }
}
