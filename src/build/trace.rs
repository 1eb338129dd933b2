//! Detection of files generated by `configure_file()`
//!
//! CMake writes one JSON object per line when run with
//! `--trace-format=json-v1`. The `configure_file` calls issued from the
//! project's own CMake files (not from FetchContent dependencies) tell us
//! which files CMake generated.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

static CACHE_VARIABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\w+):(BOOL|FILEPATH|PATH|STRING|INTERNAL)=(.*)$")
        .expect("cache variable regex is valid")
});

/// One line of a JSON trace log; non-command lines deserialize to defaults
#[derive(Debug, Default, Deserialize)]
struct TraceEntry {
    #[serde(default)]
    cmd: String,
    #[serde(default)]
    file: String,
    #[serde(default)]
    args: Vec<String>,
}

/// Parse the output of `cmake -N -LA` into a name → value map
pub fn parse_cache_variables(output: &str) -> HashMap<String, String> {
    output
        .lines()
        .filter_map(|line| CACHE_VARIABLE.captures(line.trim_end()))
        .map(|caps| (caps[1].to_string(), caps[3].to_string()))
        .collect()
}

/// Extract the output paths of relevant `configure_file()` calls
///
/// A call is relevant when it originates from a CMake file inside
/// `source_dir` and outside `FETCHCONTENT_BASE_DIR` (if that variable is
/// defined). Relative outputs are resolved against `build_dir`.
pub fn configured_files(
    trace_log: &str,
    source_dir: &Path,
    build_dir: &Path,
    cache_variables: &HashMap<String, String>,
) -> Vec<PathBuf> {
    let source_dir = to_posix(source_dir);
    let fetchcontent_dir = cache_variables
        .get("FETCHCONTENT_BASE_DIR")
        .filter(|dir| !dir.is_empty());

    trace_log
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match serde_json::from_str::<TraceEntry>(line) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!("skipping unreadable trace line ({}): {}", e, line);
                None
            }
        })
        .filter(|entry| entry.cmd == "configure_file")
        .filter(|entry| entry.file.contains(&source_dir))
        .filter(|entry| fetchcontent_dir.is_none_or(|dir| !entry.file.contains(dir.as_str())))
        .filter_map(|entry| {
            let input = entry.args.first()?;
            let output = PathBuf::from(entry.args.get(1)?);
            let output = if output.is_absolute() {
                output
            } else {
                build_dir.join(output)
            };
            tracing::debug!(
                "detected call to configure_file({} {} [...])",
                input,
                output.display()
            );
            Some(output)
        })
        .collect()
}

fn to_posix(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
