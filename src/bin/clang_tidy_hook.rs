//! pre-commit hook running clang-tidy

use std::process::ExitCode;

use cmake_pc_hooks::hooks::clang_tidy::ClangTidy;
use cmake_pc_hooks::hooks::main_for;

fn main() -> ExitCode {
    main_for(ClangTidy)
}
