//! pre-commit hook running clang-format

use std::process::ExitCode;

use cmake_pc_hooks::hooks::clang_format::ClangFormat;
use cmake_pc_hooks::hooks::main_for;

fn main() -> ExitCode {
    main_for(ClangFormat)
}
