//! include-what-you-use hook
//!
//! The hook drives `iwyu_tool.py`, which runs include-what-you-use on the
//! entries of the compilation database. Its exit code carries no meaning, so
//! the verdict comes from the text it prints.

use std::path::Path;

use super::{append_ddash, Hook};
use crate::build::compile_db::compile_db_path;
use crate::error::hints;
use crate::exec::subprocess::ProcessOutput;
use crate::utils::terminal::print_block;

/// Printed by include-what-you-use for a file that needs no change
const CORRECT_INCLUDES: &str = "has correct #includes/fwd-decls";

/// The include-what-you-use hook
#[derive(Debug, Default, Clone, Copy)]
pub struct IncludeWhatYouUse;

impl Hook for IncludeWhatYouUse {
    fn name(&self) -> &'static str {
        "include-what-you-use"
    }

    fn command_name(&self) -> &'static str {
        "include-what-you-use-hook"
    }

    fn executables(&self) -> &'static [&'static str] {
        &["iwyu_tool.py", "iwyu-tool", "iwyu_tool"]
    }

    fn version_executables(&self) -> &'static [&'static str] {
        &["include-what-you-use"]
    }

    fn look_behind(&self) -> &'static str {
        "include-what-you-use "
    }

    fn install_hint(&self) -> &'static str {
        hints::include_what_you_use()
    }

    fn needs_compile_db(&self) -> bool {
        true
    }

    fn splits_ddash_args(&self) -> bool {
        true
    }

    fn default_args(&self, build_dir: Option<&Path>) -> Vec<String> {
        build_dir
            .map(|dir| vec![format!("-p={}", compile_db_path(dir).display())])
            .unwrap_or_default()
    }

    fn command_line(&self, args: &[String], files: &[String], ddash: &[String]) -> Vec<String> {
        let mut command = files.to_vec();
        command.extend_from_slice(args);
        append_ddash(&mut command, ddash);
        command
    }

    fn parse_output(&self, output: &mut ProcessOutput) -> bool {
        !output.stdout.contains(CORRECT_INCLUDES) && !output.stdout.is_empty()
    }

    fn report_failures(&self, failures: &[ProcessOutput]) {
        let violations: String = failures.iter().map(violations).collect();
        if !violations.is_empty() {
            print_block("Include-What-You-Use violations found", &violations);
        }
    }
}

/// Lines of a failed run worth showing (comment lines are dropped)
fn violations(output: &ProcessOutput) -> String {
    output
        .stdout
        .lines()
        .chain(output.stderr.lines())
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| format!("{}\n", line))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIOLATION: &str = "\
main.cpp should add these lines:
#include <vector>  // for vector

main.cpp should remove these lines:
- #include <list>  // lines 2-2

The full include-list for main.cpp:
#include <vector>  // for vector
---
";

    #[test]
    fn test_parse_output() {
        let mut correct = ProcessOutput::new("\n(main.cpp has correct #includes/fwd-decls)\n", "", 2);
        assert!(!IncludeWhatYouUse.parse_output(&mut correct));

        let mut silent = ProcessOutput::new("", "", 1);
        assert!(!IncludeWhatYouUse.parse_output(&mut silent));

        let mut violation = ProcessOutput::new(VIOLATION, "", 2);
        assert!(IncludeWhatYouUse.parse_output(&mut violation));
    }

    #[test]
    fn test_violations_skip_comment_lines() {
        let output = ProcessOutput::new(VIOLATION, "# note from stderr\nwarning: x\n", 2);
        assert_eq!(
            violations(&output),
            "main.cpp should add these lines:\n\
             main.cpp should remove these lines:\n\
             - #include <list>  // lines 2-2\n\
             The full include-list for main.cpp:\n\
             ---\n\
             warning: x\n"
        );
    }

    #[test]
    fn test_version_comes_from_iwyu_binary() {
        assert_eq!(IncludeWhatYouUse.version_executables(), &["include-what-you-use"]);
        assert_ne!(
            IncludeWhatYouUse.version_executables(),
            IncludeWhatYouUse.executables()
        );
    }
}
