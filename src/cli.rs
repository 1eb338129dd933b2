//! CLI argument parsing using clap derive macros
//!
//! A hook's command line mixes three kinds of tokens: options understood by
//! the hook itself (CMake-style flags, hook flags), options meant for the
//! wrapped tool, and file names. [`Invocation::partition`] sorts them using
//! the option table of [`HookArgs`], so that only the hook's own options are
//! handed to clap.

use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{ArgMatches, CommandFactory, Parser};

use crate::config::HookConfig;
use crate::utils::tools::executable_path;

/// Values accepted by `-W`; any other `-W...` token belongs to the tool
pub const CMAKE_WARNING_VALUES: [&str; 4] = ["dev", "no-dev", "error=dev", "no-error=dev"];

/// Options understood by every hook
#[derive(Parser, Debug, Default)]
#[command(about, long_about = None)]
#[command(disable_version_flag = true)]
pub struct HookArgs {
    /// Read hook settings from this TOML file
    #[arg(long, value_name = "FILE", help_heading = "Hook options")]
    pub config: Option<PathBuf>,

    /// Print the merged settings as TOML and exit
    #[arg(long, help_heading = "Hook options")]
    pub dump_toml: bool,

    /// Run the tool once with all files instead of once per file
    #[arg(long, help_heading = "Hook options")]
    pub all_at_once: bool,

    /// Also process the files listed in compile_commands.json
    #[arg(long, help_heading = "Hook options")]
    pub read_json_db: bool,

    /// Require this version of the wrapped tool
    #[arg(long, value_name = "VERSION", help_heading = "Hook options")]
    pub version: Option<String>,

    /// Formatters only: do not print a diff of the changes
    #[arg(long, help_heading = "Hook options")]
    pub no_diff: bool,

    /// Print debug information about what the hook does
    #[arg(
        long,
        env = "CMAKE_PC_HOOKS_VERBOSE",
        value_parser = BoolishValueParser::new(),
        help_heading = "Hook options"
    )]
    pub hook_verbose: bool,

    /// Disable colored output
    #[arg(long, help_heading = "Hook options")]
    pub no_color: bool,

    /// Path to the source directory
    #[arg(short = 'S', long, value_name = "DIR", help_heading = "CMake options")]
    pub source_dir: Option<PathBuf>,

    /// Candidate build directory (repeatable, first match wins)
    #[arg(short = 'B', long, value_name = "DIR", help_heading = "CMake options")]
    pub build_dir: Vec<PathBuf>,

    /// Create or update a CMake cache entry
    #[arg(short = 'D', value_name = "KEY[:TYPE]=VALUE", help_heading = "CMake options")]
    pub defines: Vec<String>,

    /// Remove matching entries from the CMake cache
    #[arg(short = 'U', value_name = "GLOBBING_EXPR", help_heading = "CMake options")]
    pub undefines: Vec<String>,

    /// Specify a build system generator
    #[arg(short = 'G', value_name = "GENERATOR", help_heading = "CMake options")]
    pub generator: Option<String>,

    /// Toolset specification for the generator, if supported
    #[arg(short = 'T', value_name = "TOOLSET", help_heading = "CMake options")]
    pub toolset: Option<String>,

    /// Platform name, if supported by the generator
    #[arg(short = 'A', value_name = "PLATFORM", help_heading = "CMake options")]
    pub platform: Option<String>,

    /// Name of a configure preset
    #[arg(long, value_name = "NAME", help_heading = "CMake options")]
    pub preset: Option<String>,

    /// CMake developer warnings (-Wdev, -Wno-dev, -Werror=dev, -Wno-error=dev)
    #[arg(
        short = 'W',
        value_name = "WARNING",
        value_parser = CMAKE_WARNING_VALUES,
        help_heading = "CMake options"
    )]
    pub warnings: Vec<String>,

    /// Remove the content of the build directory before configuring
    #[arg(long, help_heading = "CMake options")]
    pub clean: bool,

    /// Path to the CMake executable
    #[arg(long, value_name = "PATH", value_parser = executable_path, help_heading = "CMake options")]
    pub cmake: Option<PathBuf>,

    /// Detect files generated by configure_file() and process them too
    #[arg(long, help_heading = "CMake options")]
    pub detect_configured_files: bool,

    /// Do not look for existing build directories inside the source directory
    #[arg(long, help_heading = "CMake options")]
    pub no_automatic_discovery: bool,

    /// Never run the CMake configure step
    #[arg(long, help_heading = "CMake options")]
    pub no_cmake_configure: bool,

    /// CMake argument for Linux and macOS only
    #[arg(long, value_name = "ARG", allow_hyphen_values = true, help_heading = "Platform options")]
    pub unix: Vec<String>,

    /// CMake argument for Linux only
    #[arg(long, value_name = "ARG", allow_hyphen_values = true, help_heading = "Platform options")]
    pub linux: Vec<String>,

    /// CMake argument for macOS only
    #[arg(long, value_name = "ARG", allow_hyphen_values = true, help_heading = "Platform options")]
    pub mac: Vec<String>,

    /// CMake argument for Windows only
    #[arg(long, value_name = "ARG", allow_hyphen_values = true, help_heading = "Platform options")]
    pub win: Vec<String>,
}

impl HookArgs {
    /// Parse the hook's own options (as sorted out by [`Invocation::partition`])
    ///
    /// `--unix` values are folded into the Linux and macOS lists, keeping
    /// their command-line order relative to `--linux` and `--mac`.
    pub fn try_parse_hook_args(
        hook_name: &'static str,
        hook_args: &[String],
    ) -> Result<Self, clap::Error> {
        let command = Self::command()
            .name(hook_name)
            .about(format!("pre-commit hook wrapping {}", hook_name.trim_end_matches("-hook")))
            .after_help(
                "Options not listed here are passed on to the wrapped tool, as is \
                 everything after `--`.",
            );
        let matches = command.try_get_matches_from(
            std::iter::once(hook_name.to_string()).chain(hook_args.iter().cloned()),
        )?;
        let mut args = <Self as clap::FromArgMatches>::from_arg_matches(&matches)?;
        args.linux = platform_values(&matches, "linux");
        args.mac = platform_values(&matches, "mac");
        args.unix.clear();
        Ok(args)
    }

    /// Convert to the command-line layer of the hook configuration
    ///
    /// Options that were not given are left unset so that the TOML layers
    /// below keep their values.
    pub fn to_config_layer(&self) -> HookConfig {
        fn set(value: bool) -> Option<bool> {
            value.then_some(true)
        }
        fn non_empty<T: Clone>(values: &[T]) -> Option<Vec<T>> {
            (!values.is_empty()).then(|| values.to_vec())
        }
        let warning = |name: &str| set(self.warnings.iter().any(|w| w == name));

        HookConfig {
            source_dir: self.source_dir.clone(),
            build_dir: non_empty(&self.build_dir),
            defines: non_empty(&self.defines),
            undefines: non_empty(&self.undefines),
            generator: self.generator.clone(),
            toolset: self.toolset.clone(),
            platform: self.platform.clone(),
            preset: self.preset.clone(),
            dev_warnings: warning("dev"),
            no_dev_warnings: warning("no-dev"),
            dev_errors: warning("error=dev"),
            no_dev_errors: warning("no-error=dev"),
            unix: non_empty(&self.unix),
            linux: non_empty(&self.linux),
            mac: non_empty(&self.mac),
            win: non_empty(&self.win),
            clean: set(self.clean),
            cmake: self.cmake.clone(),
            detect_configured_files: set(self.detect_configured_files),
            automatic_discovery: self.no_automatic_discovery.then_some(false),
            no_cmake_configure: set(self.no_cmake_configure),
            all_at_once: set(self.all_at_once),
            read_json_db: set(self.read_json_db),
            version: self.version.clone(),
            no_diff: set(self.no_diff),
        }
    }
}

/// Values of `--unix` and `--<os>`, in command-line order
fn platform_values(matches: &ArgMatches, os: &str) -> Vec<String> {
    let mut indexed: Vec<(usize, String)> = Vec::new();
    for id in ["unix", os] {
        if let (Some(indices), Some(values)) =
            (matches.indices_of(id), matches.get_many::<String>(id))
        {
            indexed.extend(indices.zip(values.cloned()));
        }
    }
    indexed.sort_by_key(|(index, _)| *index);
    indexed.into_iter().map(|(_, value)| value).collect()
}

/// The command line of a hook, split by destination
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    /// Tokens understood by the hook (parsed by [`HookArgs`])
    pub hook_args: Vec<String>,
    /// Unknown options, forwarded to the tool in order
    pub tool_args: Vec<String>,
    /// Target files
    pub files: Vec<String>,
    /// Everything after a literal `--`
    pub ddash: Vec<String>,
}

/// One option of the [`HookArgs`] table
#[derive(Debug)]
struct KnownOption {
    short: Option<char>,
    long: Option<String>,
    takes_value: bool,
    possible_values: Vec<String>,
}

impl KnownOption {
    fn accepts(&self, value: &str) -> bool {
        self.possible_values.is_empty() || self.possible_values.iter().any(|v| v == value)
    }
}

fn known_options() -> Vec<KnownOption> {
    let mut command = HookArgs::command();
    command.build();
    command
        .get_arguments()
        .filter(|arg| !arg.is_positional())
        .map(|arg| KnownOption {
            short: arg.get_short(),
            long: arg.get_long().map(str::to_string),
            takes_value: arg.get_action().takes_values(),
            possible_values: arg
                .get_possible_values()
                .iter()
                .map(|v| v.get_name().to_string())
                .collect(),
        })
        .collect()
}

impl Invocation {
    /// Sort command-line tokens (without the program name) by destination
    pub fn partition<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let options = known_options();
        let mut invocation = Invocation::default();
        let mut tokens = args.into_iter().map(Into::into).peekable();

        while let Some(token) = tokens.next() {
            if token == "--" {
                invocation.ddash.extend(tokens.by_ref());
                break;
            }

            if let Some(body) = token.strip_prefix("--") {
                let (name, inline_value) = match body.split_once('=') {
                    Some((name, value)) => (name, Some(value)),
                    None => (body, None),
                };
                match options.iter().find(|o| o.long.as_deref() == Some(name)) {
                    Some(option) => {
                        let needs_next = option.takes_value && inline_value.is_none();
                        invocation.hook_args.push(token);
                        if needs_next {
                            invocation.hook_args.extend(tokens.next());
                        }
                    }
                    None => invocation.tool_args.push(token),
                }
                continue;
            }

            let short = token
                .strip_prefix('-')
                .and_then(|rest| rest.chars().next())
                .and_then(|c| options.iter().find(|o| o.short == Some(c)));

            match short {
                Some(option) if option.takes_value => {
                    let inline_value = &token[2..];
                    if inline_value.is_empty() {
                        match tokens.peek() {
                            Some(value) if option.accepts(value) => {
                                invocation.hook_args.push(token);
                                invocation.hook_args.extend(tokens.next());
                            }
                            _ => invocation.tool_args.push(token),
                        }
                    } else if option.accepts(inline_value) {
                        invocation.hook_args.push(token);
                    } else {
                        invocation.tool_args.push(token);
                    }
                }
                // Flags (such as `-h`) only match as a whole token
                Some(_) if token.len() == 2 => invocation.hook_args.push(token),
                Some(_) => invocation.tool_args.push(token),
                None if token.starts_with('-') && token.len() > 1 => {
                    invocation.tool_args.push(token)
                }
                None => invocation.files.push(token),
            }
        }

        invocation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_partition_tool_args_and_files() {
        let inv = Invocation::partition([
            "-Bbuild",
            "--fix",
            "-checks=-*,readability-*",
            "-DFOO=1",
            "main.cpp",
            "--all-at-once",
            "--style=file",
            "lib.hpp",
        ]);
        assert_eq!(inv.hook_args, strings(&["-Bbuild", "-DFOO=1", "--all-at-once"]));
        assert_eq!(
            inv.tool_args,
            strings(&["--fix", "-checks=-*,readability-*", "--style=file"])
        );
        assert_eq!(inv.files, strings(&["main.cpp", "lib.hpp"]));
        assert!(inv.ddash.is_empty());
    }

    #[test]
    fn test_partition_separate_values() {
        let inv = Invocation::partition(["-B", "build", "--source-dir", "src", "-G", "Ninja", "a.cpp"]);
        assert_eq!(
            inv.hook_args,
            strings(&["-B", "build", "--source-dir", "src", "-G", "Ninja"])
        );
        assert_eq!(inv.files, strings(&["a.cpp"]));
    }

    #[test]
    fn test_partition_cmake_warnings() {
        let inv = Invocation::partition(["-Wdev", "-Wno-error=dev", "-Wall", "-Werror", "x.c"]);
        assert_eq!(inv.hook_args, strings(&["-Wdev", "-Wno-error=dev"]));
        assert_eq!(inv.tool_args, strings(&["-Wall", "-Werror"]));
        assert_eq!(inv.files, strings(&["x.c"]));
    }

    #[test]
    fn test_partition_ddash() {
        let inv = Invocation::partition(["-i", "a.cpp", "--", "-std=c++17", "b.cpp", "--linux=X"]);
        assert_eq!(inv.tool_args, strings(&["-i"]));
        assert_eq!(inv.files, strings(&["a.cpp"]));
        assert_eq!(inv.ddash, strings(&["-std=c++17", "b.cpp", "--linux=X"]));
    }

    #[test]
    fn test_partition_help_short_needs_exact_token() {
        let inv = Invocation::partition(["-header-filter=.*", "-h", "null.cpp"]);
        assert_eq!(inv.tool_args, strings(&["-header-filter=.*"]));
        assert_eq!(inv.hook_args, strings(&["-h"]));
        assert_eq!(inv.files, strings(&["null.cpp"]));
    }

    #[test]
    fn test_partition_unknown_long_with_value() {
        let inv = Invocation::partition(["--verbose=3", "--linelength=120", "--version", "1.6"]);
        assert_eq!(inv.tool_args, strings(&["--verbose=3", "--linelength=120"]));
        assert_eq!(inv.hook_args, strings(&["--version", "1.6"]));
    }

    #[test]
    fn test_parse_hook_args() {
        let inv = Invocation::partition([
            "-S", ".", "-Bbuild", "-B", "other", "-DA=1", "-UB", "-GNinja", "-Tv143", "-Ax64",
            "--preset=default", "-Wno-dev", "--clean", "--linux=-DLNX", "--unix", "-DUNIX",
            "--no-automatic-discovery", "--version=18",
        ]);
        assert!(inv.tool_args.is_empty(), "{:?}", inv.tool_args);

        let args = HookArgs::try_parse_hook_args("clang-tidy-hook", &inv.hook_args).unwrap();
        assert_eq!(args.build_dir, vec![PathBuf::from("build"), PathBuf::from("other")]);
        assert_eq!(args.defines, strings(&["A=1"]));
        assert_eq!(args.undefines, strings(&["B"]));
        assert_eq!(args.generator.as_deref(), Some("Ninja"));
        assert_eq!(args.toolset.as_deref(), Some("v143"));
        assert_eq!(args.platform.as_deref(), Some("x64"));
        assert_eq!(args.warnings, strings(&["no-dev"]));
        assert_eq!(args.linux, strings(&["-DLNX", "-DUNIX"]));
        assert_eq!(args.mac, strings(&["-DUNIX"]));
        assert!(args.unix.is_empty());

        let layer = args.to_config_layer();
        assert_eq!(layer.preset.as_deref(), Some("default"));
        assert_eq!(layer.no_dev_warnings, Some(true));
        assert_eq!(layer.dev_warnings, None);
        assert_eq!(layer.clean, Some(true));
        assert_eq!(layer.automatic_discovery, Some(false));
        assert_eq!(layer.all_at_once, None);
        assert_eq!(layer.version.as_deref(), Some("18"));
        assert_eq!(layer.source_dir, Some(PathBuf::from(".")));
    }

    #[test]
    fn test_platform_args_keep_command_line_order() {
        let args = HookArgs::try_parse_hook_args(
            "cppcheck-hook",
            &strings(&["--linux=A", "--unix=B", "--mac", "C", "--linux", "D", "--win=E"]),
        )
        .unwrap();
        assert_eq!(args.linux, strings(&["A", "B", "D"]));
        assert_eq!(args.mac, strings(&["B", "C"]));
        assert_eq!(args.win, strings(&["E"]));

        let layer = args.to_config_layer();
        assert_eq!(layer.platform_args("linux"), strings(&["A", "B", "D"]));
        assert_eq!(layer.platform_args("macos"), strings(&["B", "C"]));
        assert!(layer.unix.is_none());
    }

    #[test]
    fn test_empty_layer_sets_nothing() {
        let args = HookArgs::try_parse_hook_args("lizard-hook", &[]).unwrap();
        assert_eq!(args.to_config_layer(), HookConfig::default());
    }

    #[test]
    fn test_invalid_cmake_path_is_rejected() {
        let result = HookArgs::try_parse_hook_args(
            "cppcheck-hook",
            &strings(&["--cmake", "/definitely/not/a/cmake"]),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_command_is_valid() {
        HookArgs::command().debug_assert();
    }
}
