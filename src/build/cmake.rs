//! CMake discovery, build directory resolution and configure step
//!
//! Linters such as clang-tidy or cppcheck need a compilation database. This
//! module either finds a build directory that already has one, or runs a
//! CMake configure step (at most once across concurrently running hooks) to
//! generate it.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::compile_db::compile_db_path;
use super::lock::{ConfigureLock, ConfigureRole};
use super::trace;
use crate::config::hook_toml::{flag, list, HookConfig};
use crate::error::{hints, HookError};
use crate::exec::subprocess::{run_command, ProcessOutput};
use crate::utils::terminal::print_info;
use crate::utils::tools::{find_in_virtualenv, responds_to_version};

/// Build directory created when no existing one can be found
pub const DEFAULT_BUILD_DIR: &str = ".cmake_build";

/// Trace log written inside the build directory with `--detect-configured-files`
pub const DEFAULT_TRACE_LOG: &str = "trace_log.json";

/// File marking a directory as a CMake build directory
pub const CMAKE_CACHE: &str = "CMakeCache.txt";

/// Names tried when looking for CMake
const CMAKE_NAMES: &[&str] = &["cmake", "cmake3"];

/// Find a working CMake command
///
/// `PATH` is searched first, then the active Python virtual environment
/// (where `pip install cmake` puts it). The result may be a script that has
/// to be run through the Python interpreter, hence the argument vector.
pub fn find_cmake() -> Option<Vec<OsString>> {
    for name in CMAKE_NAMES {
        if let Ok(path) = which::which(name) {
            let cmd = vec![path.into_os_string()];
            if responds_to_version(&cmd) {
                return Some(cmd);
            }
        }
        if let Some(cmd) = find_in_virtualenv(name) {
            return Some(cmd);
        }
    }
    None
}

/// Everything related to calling CMake for a hook
#[derive(Debug, Clone)]
pub struct CMakeCommand {
    /// CMake command line prefix (None if CMake could not be found)
    command: Option<Vec<OsString>>,
    /// Absolute source directory
    source_dir: PathBuf,
    /// Selected build directory (None with --no-cmake-configure and no existing one)
    build_dir: Option<PathBuf>,
    /// Arguments passed to CMake on configure
    cmake_args: Vec<String>,
    /// Trace log to parse for configure_file() calls
    trace_log: Option<PathBuf>,
    /// Files generated by configure_file()
    configured_files: Vec<PathBuf>,
    no_cmake_configure: bool,
    clean: bool,
}

impl CMakeCommand {
    /// Set up CMake from the merged hook configuration
    ///
    /// This resolves the source and build directories and builds the list of
    /// CMake arguments, but does not run anything.
    pub fn from_config(config: &HookConfig) -> Result<Self> {
        let command = match &config.cmake {
            Some(path) => Some(vec![std::path::absolute(path)
                .with_context(|| format!("Invalid CMake path {}", path.display()))?
                .into_os_string()]),
            None => find_cmake(),
        };

        let mut cmake = Self {
            command,
            source_dir: normalize_dir(&config.source_dir())?,
            build_dir: None,
            cmake_args: cmake_arguments(config, std::env::consts::OS),
            trace_log: None,
            configured_files: Vec::new(),
            no_cmake_configure: flag(config.no_cmake_configure),
            clean: flag(config.clean),
        };

        cmake.resolve_build_directory(config.build_dirs(), config.automatic_discovery())?;

        if flag(config.detect_configured_files) {
            cmake.trace_log = cmake
                .build_dir
                .as_ref()
                .map(|dir| dir.join(DEFAULT_TRACE_LOG));
        }

        Ok(cmake)
    }

    /// Absolute source directory
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Selected build directory, if any
    pub fn build_dir(&self) -> Option<&Path> {
        self.build_dir.as_deref()
    }

    /// Path to the compilation database of the selected build directory
    pub fn compile_db(&self) -> Option<PathBuf> {
        self.build_dir.as_deref().map(compile_db_path)
    }

    /// Files generated by `configure_file()` during the last configure step
    pub fn configured_files(&self) -> &[PathBuf] {
        &self.configured_files
    }

    /// Pick the build directory to use
    ///
    /// In order: the first candidate with a CMake cache, the first
    /// subdirectory of the source directory with a CMake cache (if automatic
    /// discovery is enabled), nothing (with `--no-cmake-configure`), the first
    /// candidate, or `<source>/.cmake_build`.
    pub fn resolve_build_directory(
        &mut self,
        candidates: &[PathBuf],
        automatic_discovery: bool,
    ) -> Result<()> {
        for candidate in candidates {
            if candidate.join(CMAKE_CACHE).is_file() {
                let build_dir = normalize_dir(candidate)?;
                tracing::debug!(
                    "Located valid build directory with {} at: {}",
                    CMAKE_CACHE,
                    build_dir.display()
                );
                self.build_dir = Some(build_dir);
                return Ok(());
            }
        }

        if automatic_discovery {
            if let Some(build_dir) = discover_build_dir(&self.source_dir) {
                tracing::info!(
                    "Automatic build dir discovery resulted in: {}",
                    build_dir.display()
                );
                self.build_dir = Some(build_dir);
                return Ok(());
            }
        }

        if self.no_cmake_configure {
            tracing::info!("Unable to locate a valid build directory. Will not be creating one");
            self.build_dir = None;
            return Ok(());
        }

        let build_dir = match candidates.first() {
            Some(first) => std::path::absolute(first)
                .with_context(|| format!("Invalid build directory {}", first.display()))?,
            None => self.source_dir.join(DEFAULT_BUILD_DIR),
        };
        tracing::info!(
            "Unable to locate a valid build directory. Will be creating one at {}",
            build_dir.display()
        );
        self.build_dir = Some(build_dir);
        Ok(())
    }

    /// Run the CMake configure step (safe with concurrent hook processes)
    ///
    /// Only one process per build directory actually runs CMake; the others
    /// wait for it to finish. A failure is reported as
    /// [`HookError::CMakeConfigure`] after CMake's output has been echoed.
    pub fn configure(&mut self, hook_name: &str) -> Result<()> {
        if self.no_cmake_configure {
            tracing::debug!("Not calling CMake configure");
            return Ok(());
        }

        let build_dir = self
            .build_dir
            .clone()
            .context("No build directory was selected for CMake")?;
        fs::create_dir_all(&build_dir)
            .with_context(|| format!("Failed to create build directory {}", build_dir.display()))?;

        let lock = ConfigureLock::new(&build_dir);
        let pid = std::process::id();
        let result = match lock.acquire()? {
            ConfigureRole::Leader(guard) => {
                tracing::debug!("Command {} with id {} is running CMake configure", hook_name, pid);
                let result = self.run_configure(&build_dir, &lock);
                drop(guard);
                tracing::debug!(
                    "Command {} with id {} is done running CMake configure",
                    hook_name,
                    pid
                );
                result?
            }
            ConfigureRole::Follower => {
                tracing::debug!(
                    "Command {} with id {} did not run CMake configure and is done waiting",
                    hook_name,
                    pid
                );
                ProcessOutput::new("", "", 0)
            }
        };

        if !result.success() {
            result.echo();
            return Err(
                HookError::cmake_configure("see output for more information", result.exit_code)
                    .into(),
            );
        }

        if self.trace_log.is_some() {
            self.parse_trace_log()?;
        }
        Ok(())
    }

    fn run_configure(&self, build_dir: &Path, lock: &ConfigureLock) -> Result<ProcessOutput> {
        if self.clean {
            clean_build_dir(build_dir, lock)?;
        }

        let mut extra_args = Vec::new();
        if let Some(trace_log) = &self.trace_log {
            extra_args.push("--trace-expand".to_string());
            extra_args.push("--trace-format=json-v1".to_string());
            extra_args.push(format!("--trace-redirect={}", trace_log.display()));
        }

        let mut result = self.call_cmake(build_dir, &extra_args)?;

        let compile_db = compile_db_path(build_dir);
        if result.success() && !compile_db.exists() {
            result.exit_code = 1;
            result
                .stderr
                .push_str(&format!("\nUnable to locate {}\n\n", compile_db.display()));
        }
        Ok(result)
    }

    fn call_cmake(&self, build_dir: &Path, extra_args: &[String]) -> Result<ProcessOutput> {
        let command = self.command.as_ref().ok_or_else(|| {
            HookError::missing_tool("cmake", "generating the compilation database", hints::cmake())
        })?;
        let (program, prefix) = command
            .split_first()
            .context("Empty CMake command line")?;

        let mut args: Vec<OsString> = prefix.to_vec();
        args.push(self.source_dir.clone().into_os_string());
        args.extend(self.cmake_args.iter().map(OsString::from));

        let banner = format!(
            "Running CMake with: {} {}\n  from within {}\n",
            program.to_string_lossy(),
            args.iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" "),
            build_dir.display()
        );

        args.extend(extra_args.iter().map(OsString::from));
        let mut result = run_command(program, &args, Some(build_dir))?;
        result.stdout = format!("{}{}\n", banner, result.stdout);
        Ok(result)
    }

    fn parse_trace_log(&mut self) -> Result<()> {
        tracing::info!("attempting to parse CMake trace log to detect calls to configure_file()");
        self.configured_files.clear();

        let (Some(trace_log), Some(build_dir)) = (self.trace_log.clone(), self.build_dir.clone())
        else {
            tracing::info!("no trace log provided, aborting.");
            return Ok(());
        };

        let result = self.call_cmake(&build_dir, &["-N".to_string(), "-LA".to_string()])?;
        if !result.success() {
            tracing::error!("failed to retrieve CMake cache variables");
            return Ok(());
        }
        let cache_variables = trace::parse_cache_variables(&result.stdout);

        let content = fs::read_to_string(&trace_log)
            .with_context(|| format!("Failed to read CMake trace log {}", trace_log.display()))?;
        self.configured_files =
            trace::configured_files(&content, &self.source_dir, &build_dir, &cache_variables);
        Ok(())
    }
}

/// Build the CMake argument list for the given OS
pub fn cmake_arguments(config: &HookConfig, os: &str) -> Vec<String> {
    let mut args = vec!["-DCMAKE_EXPORT_COMPILE_COMMANDS:BOOL=ON".to_string()];

    args.extend(list(&config.defines).iter().map(|d| format!("-D{}", d)));
    args.extend(list(&config.undefines).iter().map(|u| format!("-U{}", u)));
    if flag(config.dev_errors) {
        args.push("-Werror=dev".to_string());
    }
    if flag(config.no_dev_errors) {
        args.push("-Wno-error=dev".to_string());
    }
    if let Some(generator) = &config.generator {
        args.push(format!("-G{}", generator));
    }
    if let Some(toolset) = &config.toolset {
        args.push(format!("-T{}", toolset));
    }
    if let Some(platform) = &config.platform {
        args.push(format!("-A{}", platform));
    }
    if let Some(preset) = &config.preset {
        args.push(format!("--preset={}", preset));
    }
    if flag(config.dev_warnings) {
        args.push("-Wdev".to_string());
    }
    if flag(config.no_dev_warnings) {
        args.push("-Wno-dev".to_string());
    }

    args.extend(
        config
            .platform_args(os)
            .iter()
            .map(|arg| arg.trim_matches(|c| c == '"' || c == '\'').to_string()),
    );
    args
}

/// First direct subdirectory of `source_dir` (by name) holding a CMake cache
fn discover_build_dir(source_dir: &Path) -> Option<PathBuf> {
    let pattern = format!(
        "{}/*",
        glob::Pattern::escape(&source_dir.to_string_lossy())
    );

    let mut candidates: Vec<PathBuf> = glob::glob(&pattern)
        .ok()?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_dir() && path.join(CMAKE_CACHE).is_file())
        .collect();
    candidates.sort();
    candidates.into_iter().next()
}

/// Remove everything from `build_dir` except the configure lock files
fn clean_build_dir(build_dir: &Path, lock: &ConfigureLock) -> Result<()> {
    print_info(&format!("Cleaning build directory {}", build_dir.display()));
    for entry in fs::read_dir(build_dir)
        .with_context(|| format!("Failed to read build directory {}", build_dir.display()))?
    {
        let path = entry?.path();
        if path.is_dir() {
            fs::remove_dir_all(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        } else if !lock.is_lock_file(&path) {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        }
    }
    Ok(())
}

fn normalize_dir(path: &Path) -> Result<PathBuf> {
    let normalized = if cfg!(windows) {
        std::path::absolute(path)
    } else {
        fs::canonicalize(path).or_else(|_| std::path::absolute(path))
    };
    normalized.with_context(|| format!("Invalid directory {}", path.display()))
}
