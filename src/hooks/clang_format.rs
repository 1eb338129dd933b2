//! clang-format hook
//!
//! clang-format is a formatter: instead of looking at its exit code, the hook
//! compares each file with what clang-format would make of it.

use std::fs;

use anyhow::{Context, Result};
use similar::TextDiff;

use super::{Hook, HookRunner};
use crate::config::hook_toml::flag;
use crate::error::hints;

/// Flag asking clang-format to rewrite files in place
const IN_PLACE: &str = "-i";

/// The clang-format hook
#[derive(Debug, Default, Clone, Copy)]
pub struct ClangFormat;

impl Hook for ClangFormat {
    fn name(&self) -> &'static str {
        "clang-format"
    }

    fn command_name(&self) -> &'static str {
        "clang-format-hook"
    }

    fn executables(&self) -> &'static [&'static str] {
        &["clang-format"]
    }

    fn look_behind(&self) -> &'static str {
        "clang-format version "
    }

    fn install_hint(&self) -> &'static str {
        hints::clang_tools()
    }

    fn run(&self, runner: &mut HookRunner) -> Result<bool> {
        let edit_in_place = runner.tool_args().iter().any(|arg| arg == IN_PLACE);
        let show_diff = !flag(runner.config().no_diff);
        let format_args: Vec<String> = runner
            .tool_args()
            .iter()
            .filter(|arg| *arg != IN_PLACE)
            .cloned()
            .collect();

        let mut report = String::new();
        let mut failed = false;

        for file in runner.files().to_vec() {
            let original = fs::read(&file).with_context(|| format!("Failed to read {}", file))?;
            let original = String::from_utf8_lossy(&original).into_owned();

            let mut args = format_args.clone();
            args.push(file.clone());
            let output = runner.execute(&args)?;
            if !output.success() {
                output.echo();
                failed = true;
                continue;
            }
            if output.stdout == original {
                continue;
            }

            failed = true;
            if show_diff {
                report.push_str(&format_diff(&file, &original, &output.stdout));
            }
            if edit_in_place {
                rewrite_in_place(runner, &format_args, &file)?;
            }
        }

        if !report.is_empty() {
            print!("{}", report);
        }
        Ok(failed)
    }
}

/// Unified diff between a file and its formatted version, with a file header
pub fn format_diff(file: &str, original: &str, formatted: &str) -> String {
    let diff = TextDiff::from_lines(original, formatted)
        .unified_diff()
        .header("original", "formatted")
        .to_string();
    format!("{}\n{}\n{}\n", file, "=".repeat(20), diff)
}

fn rewrite_in_place(runner: &mut HookRunner, format_args: &[String], file: &str) -> Result<()> {
    let mut args = vec![IN_PLACE.to_string()];
    args.extend_from_slice(format_args);
    args.push(file.to_string());

    let output = runner.execute(&args)?;
    if !output.success() {
        output.echo();
    }
    tracing::debug!("reformatted {}", file);
    Ok(())
}
