//! Test environment with fake tools on `PATH` and a small CMake project

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

const FAKE_CMAKE: &str = r#"#!/bin/sh
if [ "$1" = "--version" ]; then echo "cmake version 3.28.1"; exit 0; fi
case "$*" in *"-N -LA"*) echo "CMAKE_BUILD_TYPE:STRING=Debug"; exit 0;; esac
if [ -n "$FAKE_CMAKE_FAIL" ]; then echo "CMake Error: boom" >&2; exit 3; fi
echo "$*" >> "$FAKE_CMAKE_LOG"
sleep "${FAKE_CMAKE_SLEEP:-0}"
src="$1"
trace=""
for arg; do case "$arg" in --trace-redirect=*) trace="${arg#--trace-redirect=}";; esac; done
if [ -n "$trace" ]; then
  printf '{"version":{"major":1,"minor":2}}\n' > "$trace"
  printf '{"args":["config.hpp.in","config.hpp"],"cmd":"configure_file","file":"%s/CMakeLists.txt","line":1}\n' "$src" >> "$trace"
fi
printf '[{"directory": "%s", "file": "%s/main.cpp", "command": "c++ -c main.cpp"}]\n' "$src" "$src" > compile_commands.json
touch CMakeCache.txt
"#;

const FAKE_CPPCHECK: &str = r#"#!/bin/sh
if [ "$1" = "--version" ]; then echo "Cppcheck 2.13.0"; exit 0; fi
echo "$*" >> "$FAKE_TOOL_LOG"
echo "nofile:0:0: information: Cppcheck cannot find all the include files" >&2
for arg; do case "$arg" in *bad.cpp) echo "$arg:1:1: error: Null pointer dereference" >&2; exit 1;; esac; done
exit 0
"#;

const FAKE_CLANG_FORMAT: &str = r#"#!/bin/sh
if [ "$1" = "--version" ]; then echo "Ubuntu clang-format version 18.1.3 (1ubuntu1)"; exit 0; fi
inplace=0
for arg; do [ "$arg" = "-i" ] && inplace=1; last="$arg"; done
if [ "$inplace" = 1 ]; then
  tr -s ' ' < "$last" > "$last.tmp" && mv "$last.tmp" "$last"
else
  tr -s ' ' < "$last"
fi
"#;

const FAKE_CLANG_TIDY: &str = r#"#!/bin/sh
if [ "$1" = "--version" ]; then printf 'LLVM (http://llvm.org/):\n  LLVM version 18.1.3\n'; exit 0; fi
echo "$*" >> "$FAKE_TOOL_LOG"
if grep -q NULL "$1"; then echo "$1:1:1: error: use nullptr"; echo "1 error generated." >&2; fi
exit 0
"#;

const FAKE_LIZARD: &str = r#"#!/bin/sh
if [ "$1" = "--version" ]; then echo "1.17.10"; exit 0; fi
echo "$*" >> "$FAKE_TOOL_LOG"
if grep -q complex "$1"; then echo "$1: warning: too complex"; exit 1; fi
exit 0
"#;

const FAKE_IWYU_TOOL: &str = r#"#!/bin/sh
echo "$*" >> "$FAKE_TOOL_LOG"
if grep -q vector "$1"; then
  printf '%s should add these lines:\n#include <vector>  // for vector\n\n%s should remove these lines:\n- #include <list>  // lines 1-1\n' "$1" "$1"
else
  printf '\n(%s has correct #includes/fwd-decls)\n' "$1"
fi
exit 2
"#;

const FAKE_IWYU: &str = r#"#!/bin/sh
echo "include-what-you-use 0.21 based on clang version 17.0.6"
"#;

pub struct TestEnv {
    _tmp: TempDir,
    pub bin: PathBuf,
    pub empty_bin: PathBuf,
    pub project: PathBuf,
    pub cmake_log: PathBuf,
    pub tool_log: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let root = fs::canonicalize(tmp.path()).expect("canonical temp dir");

        let bin = root.join("bin");
        let empty_bin = root.join("empty-bin");
        let project = root.join("project");
        for dir in [&bin, &empty_bin, &project] {
            fs::create_dir_all(dir).expect("create directory");
        }

        for (name, script) in [
            ("cmake", FAKE_CMAKE),
            ("cppcheck", FAKE_CPPCHECK),
            ("clang-format", FAKE_CLANG_FORMAT),
            ("clang-tidy", FAKE_CLANG_TIDY),
            ("lizard", FAKE_LIZARD),
            ("iwyu_tool.py", FAKE_IWYU_TOOL),
            ("include-what-you-use", FAKE_IWYU),
        ] {
            write_script(&bin.join(name), script);
        }

        fs::write(project.join("CMakeLists.txt"), "project(demo CXX)\n").expect("write CMakeLists.txt");
        fs::write(project.join("main.cpp"), "int main() { return 0; }\n").expect("write main.cpp");

        Self {
            cmake_log: root.join("cmake.log"),
            tool_log: root.join("tool.log"),
            _tmp: tmp,
            bin,
            empty_bin,
            project,
        }
    }

    /// Write a file inside the project
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.project.join(name);
        fs::write(&path, content).expect("write project file");
        path
    }

    /// Hook command running inside the project with the fake tools first on `PATH`
    pub fn cmd(&self, hook: &str) -> Command {
        let path = format!(
            "{}:{}",
            self.bin.display(),
            std::env::var("PATH").unwrap_or_default()
        );
        let mut cmd = Command::cargo_bin(hook).expect("hook binary");
        self.configure(&mut cmd, &path);
        cmd
    }

    /// Hook command with no tool available at all
    pub fn cmd_without_tools(&self, hook: &str) -> Command {
        let mut cmd = Command::cargo_bin(hook).expect("hook binary");
        let path = self.empty_bin.display().to_string();
        self.configure(&mut cmd, &path);
        cmd
    }

    fn configure(&self, cmd: &mut Command, path: &str) {
        cmd.current_dir(&self.project)
            .env("PATH", path)
            .env("FAKE_CMAKE_LOG", &self.cmake_log)
            .env("FAKE_TOOL_LOG", &self.tool_log)
            .env_remove("VIRTUAL_ENV")
            .env_remove("RUST_LOG")
            .env_remove("CMAKE_PC_HOOKS_VERBOSE");
    }

    pub fn cmake_runs(&self) -> usize {
        read_lines(&self.cmake_log).len()
    }

    pub fn tool_calls(&self) -> Vec<String> {
        read_lines(&self.tool_log)
    }

    pub fn build_dir(&self) -> PathBuf {
        self.project.join(".cmake_build")
    }
}

fn write_script(path: &Path, content: &str) {
    fs::write(path, content).expect("write fake tool");
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).expect("make fake tool executable");
}

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .map(|content| content.lines().map(str::to_string).collect())
        .unwrap_or_default()
}
