//! CMake integration
//!
//! ## Modules
//!
//! - `cmake` - CMake discovery, build directory resolution and configure step
//! - `compile_db` - Reading `compile_commands.json`
//! - `lock` - Inter-process lock around the configure step
//! - `trace` - Detection of files generated by `configure_file()`

pub mod cmake;
pub mod compile_db;
pub mod lock;
pub mod trace;

pub use cmake::CMakeCommand;
