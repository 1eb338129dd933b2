//! lizard hook (cyclomatic complexity)

use super::{append_ddash, Hook};
use crate::error::hints;

/// Files lizard is run on; unlike the other tools it also reads Python
pub const LIZARD_FILES: &str = r"\.(?:c|cc|cxx|cpp|cu|h|hpp|hxx|py)$";

/// The lizard hook
#[derive(Debug, Default, Clone, Copy)]
pub struct Lizard;

impl Hook for Lizard {
    fn name(&self) -> &'static str {
        "lizard"
    }

    fn command_name(&self) -> &'static str {
        "lizard-hook"
    }

    fn executables(&self) -> &'static [&'static str] {
        &["lizard"]
    }

    fn look_behind(&self) -> &'static str {
        ""
    }

    fn install_hint(&self) -> &'static str {
        hints::lizard()
    }

    fn file_regex(&self) -> &'static str {
        LIZARD_FILES
    }

    fn command_line(&self, args: &[String], files: &[String], ddash: &[String]) -> Vec<String> {
        let mut command = files.to_vec();
        command.extend_from_slice(args);
        append_ddash(&mut command, ddash);
        command
    }
}
