//! cppcheck hook

use std::path::Path;

use super::Hook;
use crate::build::compile_db::compile_db_path;
use crate::error::hints;
use crate::exec::subprocess::ProcessOutput;

/// Noise emitted whenever system headers are not part of the analysis
const MISSING_INCLUDES: &str = "Cppcheck cannot find all the include files";

/// The cppcheck hook
#[derive(Debug, Default, Clone, Copy)]
pub struct Cppcheck;

impl Hook for Cppcheck {
    fn name(&self) -> &'static str {
        "cppcheck"
    }

    fn command_name(&self) -> &'static str {
        "cppcheck-hook"
    }

    fn executables(&self) -> &'static [&'static str] {
        &["cppcheck"]
    }

    fn look_behind(&self) -> &'static str {
        "Cppcheck "
    }

    fn install_hint(&self) -> &'static str {
        hints::cppcheck()
    }

    fn needs_compile_db(&self) -> bool {
        true
    }

    fn default_args(&self, build_dir: Option<&Path>) -> Vec<String> {
        let mut args = vec![
            "-q".to_string(),
            "--error-exitcode=1".to_string(),
            "--enable=all".to_string(),
        ];
        if let Some(dir) = build_dir {
            args.push(format!("--project={}", compile_db_path(dir).display()));
        }
        args
    }

    fn parse_output(&self, output: &mut ProcessOutput) -> bool {
        output.stderr = output
            .stderr
            .split_inclusive('\n')
            .filter(|line| !line.contains(MISSING_INCLUDES))
            .collect();
        !output.success()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::add_if_missing;

    #[test]
    fn test_default_args_respect_user_args() {
        let mut args = vec!["--enable=style".to_string()];
        for arg in Cppcheck.default_args(Some(Path::new("build"))) {
            add_if_missing(&mut args, arg);
        }
        assert_eq!(
            args,
            vec![
                "--enable=style".to_string(),
                "-q".to_string(),
                "--error-exitcode=1".to_string(),
                format!("--project={}", Path::new("build").join("compile_commands.json").display()),
            ]
        );
    }

    #[test]
    fn test_parse_output_strips_include_noise() {
        let mut output = ProcessOutput::new(
            "",
            "nofile:0:0: information: Cppcheck cannot find all the include files\n\
             main.cpp:3:5: style: Variable 'x' is not used\n",
            1,
        );
        assert!(Cppcheck.parse_output(&mut output));
        assert_eq!(output.stderr, "main.cpp:3:5: style: Variable 'x' is not used\n");

        let mut clean = ProcessOutput::new("", "", 0);
        assert!(!Cppcheck.parse_output(&mut clean));
    }
}
