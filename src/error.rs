//! Error types and helpers for user-friendly error messages
//!
//! Every error a hook can raise on its own (as opposed to the wrapped tool
//! reporting problems) goes through [`HookError`], which carries an optional
//! hint telling the user how to fix the situation.

use thiserror::Error;

/// Errors raised by the hooks themselves
#[derive(Error, Debug)]
pub enum HookError {
    /// TOML configuration errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
        hint: Option<String>,
    },

    /// Invalid command-line argument
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String, hint: Option<String> },

    /// Tool/executable not found
    #[error("Missing tool: {tool}")]
    MissingTool {
        tool: String,
        required_for: String,
        hint: String,
    },

    /// CMake configure step failed
    #[error("CMake configure step failed: {message}")]
    CMakeConfigure {
        message: String,
        exit_code: i32,
        hint: Option<String>,
    },

    /// Installed tool does not match the requested version
    #[error("Version mismatch for {tool}: expected {expected}, found {found}")]
    VersionMismatch {
        tool: String,
        expected: String,
        found: String,
    },
}

impl HookError {
    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
            hint: None,
        }
    }

    /// Create a configuration error with source and hint
    pub fn config_error_with_hint(
        message: impl Into<String>,
        source: Option<anyhow::Error>,
        hint: impl Into<String>,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source,
            hint: Some(hint.into()),
        }
    }

    /// Create an invalid argument error with hint
    pub fn invalid_argument_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    /// Create a missing tool error
    pub fn missing_tool(
        tool: impl Into<String>,
        required_for: impl Into<String>,
        hint: impl Into<String>,
    ) -> Self {
        Self::MissingTool {
            tool: tool.into(),
            required_for: required_for.into(),
            hint: hint.into(),
        }
    }

    /// Create a CMake configure failure
    pub fn cmake_configure(message: impl Into<String>, exit_code: i32) -> Self {
        Self::CMakeConfigure {
            message: message.into(),
            exit_code,
            hint: Some(hints::cmake_configure().to_string()),
        }
    }

    /// Create a version mismatch error
    pub fn version_mismatch(
        tool: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::VersionMismatch {
            tool: tool.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Process exit code matching this error
    pub fn exit_code(&self) -> i32 {
        match self {
            HookError::CMakeConfigure { exit_code, .. } if *exit_code != 0 => *exit_code,
            HookError::InvalidArgument { .. } | HookError::Config { .. } => 2,
            _ => 1,
        }
    }

    /// Display error with formatting and hints
    pub fn display_with_hints(&self) {
        use console::style;

        eprintln!("\n{} {}", style("ERROR:").red().bold(), self);

        match self {
            HookError::Config { hint, .. }
            | HookError::InvalidArgument { hint, .. }
            | HookError::CMakeConfigure { hint, .. } => {
                if let Some(h) = hint {
                    eprintln!("\n{} {}", style("HINT:").yellow().bold(), h);
                }
            }
            HookError::MissingTool {
                hint, required_for, ..
            } => {
                eprintln!("  required for: {}", required_for);
                eprintln!("\n{} {}", style("HINT:").yellow().bold(), hint);
            }
            HookError::VersionMismatch { .. } => {
                eprintln!(
                    "\n{} {}",
                    style("HINT:").yellow().bold(),
                    hints::version_mismatch()
                );
            }
        }

        eprintln!();
    }
}

/// Common error hints
pub mod hints {
    /// Get hint for missing CMake
    pub fn cmake() -> &'static str {
        "Install CMake from https://cmake.org/ or use your package manager:\n\
         • macOS: brew install cmake\n\
         • Ubuntu: sudo apt install cmake\n\
         • pip: pip install cmake\n\
         Or point the hook at an executable with --cmake=/path/to/cmake"
    }

    /// Get hint for missing clang tools (clang-format, clang-tidy)
    pub fn clang_tools() -> &'static str {
        "Install the LLVM/Clang tools:\n\
         • macOS: brew install llvm\n\
         • Ubuntu: sudo apt install clang-format clang-tidy\n\
         • pip: pip install clang-format clang-tidy"
    }

    /// Get hint for missing cppcheck
    pub fn cppcheck() -> &'static str {
        "Install cppcheck:\n\
         • macOS: brew install cppcheck\n\
         • Ubuntu: sudo apt install cppcheck"
    }

    /// Get hint for missing cpplint
    pub fn cpplint() -> &'static str {
        "Install cpplint with: pip install cpplint"
    }

    /// Get hint for missing include-what-you-use
    pub fn include_what_you_use() -> &'static str {
        "Install include-what-you-use (which ships iwyu_tool.py):\n\
         • macOS: brew install include-what-you-use\n\
         • Ubuntu: sudo apt install iwyu"
    }

    /// Get hint for missing lizard
    pub fn lizard() -> &'static str {
        "Install lizard with: pip install lizard"
    }

    /// Get hint for an invalid TOML configuration
    pub fn invalid_toml() -> &'static str {
        "Check the [tool.cmake_pc_hooks] table of pyproject.toml, cmake_pc_hooks.toml\n\
         and any file passed with --config. Keys use underscores (e.g. build_dir)\n\
         and must match the hook command-line options.\n\
         Run the hook with --dump-toml to see the currently active settings."
    }

    /// Get hint for a failed CMake configure step
    pub fn cmake_configure() -> &'static str {
        "CMake could not configure the project. Try:\n\
         • Running the same CMake command manually to see the full error\n\
         • Passing --clean to start from an empty build directory\n\
         • Pointing the hook to an existing build directory with -B"
    }

    /// Get hint for a tool version mismatch
    pub fn version_mismatch() -> &'static str {
        "Install the requested version of the tool or update the --version\n\
         argument in your .pre-commit-config.yaml"
    }
}
