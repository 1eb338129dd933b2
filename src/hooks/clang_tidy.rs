//! clang-tidy hook

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::{append_ddash, Hook};
use crate::build::compile_db::compile_db_path;
use crate::error::hints;
use crate::exec::subprocess::ProcessOutput;

static ERRORS_GENERATED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\d,]+ errors? generated\.").expect("errors generated regex is valid")
});

/// The clang-tidy hook
#[derive(Debug, Default, Clone, Copy)]
pub struct ClangTidy;

impl Hook for ClangTidy {
    fn name(&self) -> &'static str {
        "clang-tidy"
    }

    fn command_name(&self) -> &'static str {
        "clang-tidy-hook"
    }

    fn executables(&self) -> &'static [&'static str] {
        &["clang-tidy"]
    }

    fn look_behind(&self) -> &'static str {
        "LLVM version "
    }

    fn install_hint(&self) -> &'static str {
        hints::clang_tools()
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
        !output.success()
            || (!output.stdout.is_empty() && ERRORS_GENERATED.is_match(&output.stderr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = ClangTidy.default_args(Some(Path::new("/work/build")));
        assert_eq!(
            args,
            vec![format!(
                "-p={}",
                Path::new("/work/build").join("compile_commands.json").display()
            )]
        );
        assert!(ClangTidy.default_args(None).is_empty());
    }

    #[test]
    fn test_command_line() {
        let command = ClangTidy.command_line(
            &["-p=build".to_string(), "-fix".to_string()],
            &["main.cpp".to_string()],
            &["-std=c++17".to_string()],
        );
        assert_eq!(command, vec!["main.cpp", "-p=build", "-fix", "--", "-std=c++17"]);
    }

    #[test]
    fn test_parse_output() {
        let mut clean = ProcessOutput::new("", "", 0);
        assert!(!ClangTidy.parse_output(&mut clean));

        let mut warnings = ProcessOutput::new("main.cpp:1:1: warning: ...", "1 warning generated.", 0);
        assert!(!ClangTidy.parse_output(&mut warnings));

        let mut errors = ProcessOutput::new("main.cpp:1:1: error: ...", "2 errors generated.", 0);
        assert!(ClangTidy.parse_output(&mut errors));

        let mut crashed = ProcessOutput::new("", "", 1);
        assert!(ClangTidy.parse_output(&mut crashed));
    }
}
