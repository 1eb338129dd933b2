//! Hooks wrapping the individual C/C++ tools
//!
//! Every hook goes through the same sequence, driven by [`main_for`]:
//!
//! ```text
//! argv → Invocation::partition → HookConfig::load_layered → HookRunner::new
//!      → HookRunner::prepare (CMake configure) → Hook::run → exit code
//! ```
//!
//! The [`Hook`] trait describes what differs from one tool to the next:
//! executable names, default arguments, how the command line is laid out and
//! how the tool's output is interpreted.

pub mod clang_format;
pub mod clang_tidy;
pub mod cppcheck;
pub mod cpplint;
pub mod include_what_you_use;
pub mod lizard;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use regex::Regex;

use crate::build::compile_db::read_compile_commands;
use crate::build::CMakeCommand;
use crate::cli::{HookArgs, Invocation};
use crate::config::hook_toml::flag;
use crate::config::{validate_config, HookConfig};
use crate::error::HookError;
use crate::exec::subprocess::{run_command, ProcessOutput};
use crate::logging;
use crate::utils::terminal::{disable_colors, print_error};
use crate::utils::tools::{require_tool, tool_version};

/// Files handled by the C/C++ hooks
pub const C_CXX_FILES: &str = r"\.(?:c|cc|cxx|cpp|c\+\+|cu|h|hh|hpp|hxx|h\+\+|ipp|inl|tpp)$";

/// Behavior specific to one wrapped tool
pub trait Hook {
    /// Name of the wrapped tool, used in messages
    fn name(&self) -> &'static str;

    /// Name of the hook executable
    fn command_name(&self) -> &'static str;

    /// Executable names to look for on `PATH`, in order
    fn executables(&self) -> &'static [&'static str];

    /// Executables queried with `--version` (the tool itself by default)
    fn version_executables(&self) -> &'static [&'static str] {
        self.executables()
    }

    /// Text preceding the version number in the `--version` output
    fn look_behind(&self) -> &'static str;

    /// How to install the tool
    fn install_hint(&self) -> &'static str;

    /// Regex selecting the command-line files the hook processes
    fn file_regex(&self) -> &'static str {
        C_CXX_FILES
    }

    /// Whether the tool reads the compilation database
    fn needs_compile_db(&self) -> bool {
        false
    }

    /// Whether existing files after `--` are targets (the rest goes to the tool)
    fn splits_ddash_args(&self) -> bool {
        false
    }

    /// Arguments added unless the user already passed the same option
    fn default_args(&self, _build_dir: Option<&Path>) -> Vec<String> {
        Vec::new()
    }

    /// Arguments of one tool run
    fn command_line(&self, args: &[String], files: &[String], ddash: &[String]) -> Vec<String> {
        let mut command = args.to_vec();
        command.extend_from_slice(files);
        append_ddash(&mut command, ddash);
        command
    }

    /// Inspect the output of one run; returns true if the run failed
    fn parse_output(&self, output: &mut ProcessOutput) -> bool {
        !output.success()
    }

    /// Report the runs that failed
    fn report_failures(&self, failures: &[ProcessOutput]) {
        for failure in failures {
            failure.echo();
        }
    }

    /// Run the tool on every file; returns true if anything failed
    fn run(&self, runner: &mut HookRunner) -> Result<bool> {
        runner.run_tool(self)
    }
}

/// Append `-- <ddash...>` if there is anything to append
pub fn append_ddash(command: &mut Vec<String>, ddash: &[String]) {
    if !ddash.is_empty() {
        command.push("--".to_string());
        command.extend_from_slice(ddash);
    }
}

/// Add `arg` to `args` unless an argument with the same option name exists
///
/// The option name is everything before the first `=`, so `-p=a` and `-p=b`
/// are the same option.
pub fn add_if_missing(args: &mut Vec<String>, arg: String) {
    let key = option_name(&arg);
    if !args.iter().any(|existing| option_name(existing) == key) {
        args.push(arg);
    }
}

fn option_name(arg: &str) -> &str {
    arg.split_once('=').map_or(arg, |(name, _)| name)
}

/// State shared by every hook: the tool, its arguments, the target files and
/// the CMake setup
#[derive(Debug)]
pub struct HookRunner {
    tool: PathBuf,
    tool_args: Vec<String>,
    files: Vec<String>,
    ddash: Vec<String>,
    config: HookConfig,
    cmake: CMakeCommand,
    history: Vec<ProcessOutput>,
}

impl HookRunner {
    /// Locate the tool, check its version and resolve the CMake setup
    pub fn new<H: Hook + ?Sized>(hook: &H, invocation: Invocation, config: HookConfig) -> Result<Self> {
        let required_for = format!("the {} hook", hook.command_name());
        let tool = require_tool(hook.executables(), &required_for, hook.install_hint())?;
        tracing::debug!("using {} at {}", hook.name(), tool.display());

        if let Some(expected) = &config.version {
            check_version(hook, &tool, expected, &required_for)?;
        }

        validate_config(&config)?;
        let cmake = CMakeCommand::from_config(&config)?;

        let file_regex = Regex::new(hook.file_regex())
            .with_context(|| format!("Invalid file pattern for {}", hook.name()))?;
        let mut candidates = invocation.files;
        let mut ddash = Vec::new();
        if hook.splits_ddash_args() {
            let (files, rest): (Vec<String>, Vec<String>) = invocation
                .ddash
                .into_iter()
                .partition(|arg| Path::new(arg).is_file());
            candidates.extend(files);
            ddash = rest;
        } else {
            candidates.extend(invocation.ddash);
        }

        let mut files = Vec::new();
        for file in candidates {
            if !file_regex.is_match(&file) {
                tracing::debug!("skipping {} (not handled by {})", file, hook.name());
            } else if !files.contains(&file) {
                files.push(file);
            }
        }

        let mut tool_args = invocation.tool_args;
        for arg in hook.default_args(cmake.build_dir()) {
            add_if_missing(&mut tool_args, arg);
        }

        Ok(Self {
            tool,
            tool_args,
            files,
            ddash,
            config,
            cmake,
            history: Vec::new(),
        })
    }

    /// Run CMake configure if needed and collect the remaining target files
    pub fn prepare<H: Hook + ?Sized>(&mut self, hook: &H) -> Result<()> {
        let read_json_db = flag(self.config.read_json_db);
        let may_add_files = read_json_db || flag(self.config.detect_configured_files);
        if self.files.is_empty() && !may_add_files {
            tracing::debug!("no files to process");
            return Ok(());
        }

        if hook.needs_compile_db() || read_json_db {
            self.cmake.configure(hook.command_name())?;
        }

        if read_json_db {
            if let Some(compile_db) = self.cmake.compile_db() {
                for file in read_compile_commands(&compile_db)? {
                    self.add_file(file);
                }
            }
        }

        let configured: Vec<String> = self
            .cmake
            .configured_files()
            .iter()
            .map(|path| path.to_string_lossy().into_owned())
            .collect();
        for file in configured {
            self.add_file(file);
        }
        Ok(())
    }

    fn add_file(&mut self, file: String) {
        if !self.files.contains(&file) {
            self.files.push(file);
        }
    }

    /// Arguments passed to the tool (user-supplied plus defaults)
    pub fn tool_args(&self) -> &[String] {
        &self.tool_args
    }

    /// Target files
    pub fn files(&self) -> &[String] {
        &self.files
    }

    /// Arguments passed after `--`
    pub fn ddash(&self) -> &[String] {
        &self.ddash
    }

    /// Merged hook configuration
    pub fn config(&self) -> &HookConfig {
        &self.config
    }

    /// CMake setup of this run
    pub fn cmake(&self) -> &CMakeCommand {
        &self.cmake
    }

    /// Every tool run so far
    pub fn history(&self) -> &[ProcessOutput] {
        &self.history
    }

    /// Run the tool with `args` and record the result
    pub fn execute(&mut self, args: &[String]) -> Result<ProcessOutput> {
        let output = run_command(&self.tool, args, None)?;
        self.history.push(output.clone());
        Ok(output)
    }

    /// Run the tool on all files at once or once per file
    pub fn run_tool<H: Hook + ?Sized>(&mut self, hook: &H) -> Result<bool> {
        if self.files.is_empty() {
            return Ok(false);
        }

        let batches: Vec<Vec<String>> = if flag(self.config.all_at_once) {
            vec![self.files.clone()]
        } else {
            self.files.iter().map(|file| vec![file.clone()]).collect()
        };

        let mut failures = Vec::new();
        for batch in batches {
            let args = hook.command_line(&self.tool_args, &batch, &self.ddash);
            let mut output = self.execute(&args)?;
            if hook.parse_output(&mut output) {
                failures.push(output);
            }
        }

        hook.report_failures(&failures);
        Ok(!failures.is_empty())
    }
}

fn check_version<H: Hook + ?Sized>(
    hook: &H,
    tool: &Path,
    expected: &str,
    required_for: &str,
) -> Result<()> {
    let expected = expected.trim_matches(|c| c == '"' || c == '\'');
    let version_tool = if hook.version_executables() == hook.executables() {
        tool.to_path_buf()
    } else {
        require_tool(hook.version_executables(), required_for, hook.install_hint())?
    };

    let found = tool_version(&version_tool, hook.look_behind())?;
    if !found.starts_with(expected) {
        return Err(HookError::version_mismatch(hook.name(), expected, found).into());
    }
    tracing::debug!("{} version {} matches {}", hook.name(), found, expected);
    Ok(())
}

/// Entry point of a hook executable
pub fn main_for<H: Hook>(hook: H) -> ExitCode {
    let invocation = Invocation::partition(std::env::args().skip(1));

    let args = match HookArgs::try_parse_hook_args(hook.command_name(), &invocation.hook_args) {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return exit_code(e.exit_code());
        }
    };

    if args.no_color {
        disable_colors();
    }
    logging::init(args.hook_verbose);

    match run_hook(&hook, invocation, &args) {
        Ok(code) => code,
        Err(err) => match err.downcast_ref::<HookError>() {
            Some(hook_err) => {
                hook_err.display_with_hints();
                exit_code(hook_err.exit_code())
            }
            None => {
                print_error(&format!("{:#}", err));
                ExitCode::FAILURE
            }
        },
    }
}

fn run_hook<H: Hook + ?Sized>(hook: &H, invocation: Invocation, args: &HookArgs) -> Result<ExitCode> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let config = HookConfig::load_layered(&cwd, args.config.as_deref(), args.to_config_layer())?;

    if args.dump_toml {
        print!("{}", config.dump_toml()?);
        return Ok(ExitCode::SUCCESS);
    }

    let mut runner = HookRunner::new(hook, invocation, config)?;
    runner.prepare(hook)?;

    if hook.run(&mut runner)? {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn exit_code(code: i32) -> ExitCode {
    u8::try_from(code).map_or(ExitCode::FAILURE, ExitCode::from)
}
