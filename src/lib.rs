//! Pre-commit hooks for C/C++ tools in CMake-based projects
//!
//! Each hook wraps one tool (clang-format, clang-tidy, cppcheck, cpplint,
//! include-what-you-use or lizard). Hooks that need a compilation database
//! locate an existing CMake build directory or configure one first.
//!
//! ## Architecture
//!
//! ```text
//! hook binary → hooks::main_for → cli (partition) → config (TOML layers)
//!             → build::cmake (configure, locked) → tool runs → exit code
//! ```

pub mod build;
pub mod cli;
pub mod config;
pub mod error;
pub mod exec;
pub mod hooks;
pub mod logging;
pub mod utils;
