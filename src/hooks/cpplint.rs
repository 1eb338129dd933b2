//! cpplint hook

use super::Hook;
use crate::error::hints;

/// The cpplint hook
#[derive(Debug, Default, Clone, Copy)]
pub struct Cpplint;

impl Hook for Cpplint {
    fn name(&self) -> &'static str {
        "cpplint"
    }

    fn command_name(&self) -> &'static str {
        "cpplint-hook"
    }

    fn executables(&self) -> &'static [&'static str] {
        &["cpplint"]
    }

    fn look_behind(&self) -> &'static str {
        "cpplint "
    }

    fn install_hint(&self) -> &'static str {
        hints::cpplint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::subprocess::ProcessOutput;

    #[test]
    fn test_options_come_before_files() {
        let command = Cpplint.command_line(
            &["--linelength=120".to_string()],
            &["a.cpp".to_string(), "b.hpp".to_string()],
            &[],
        );
        assert_eq!(command, vec!["--linelength=120", "a.cpp", "b.hpp"]);
    }

    #[test]
    fn test_exit_code_decides() {
        let mut output = ProcessOutput::new("", "a.cpp:0:  No copyright message found.", 1);
        assert!(Cpplint.parse_output(&mut output));
        let mut output = ProcessOutput::new("", "Done processing a.cpp", 0);
        assert!(!Cpplint.parse_output(&mut output));
    }
}
