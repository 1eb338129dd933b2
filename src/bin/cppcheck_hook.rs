//! pre-commit hook running cppcheck

use std::process::ExitCode;

use cmake_pc_hooks::hooks::cppcheck::Cppcheck;
use cmake_pc_hooks::hooks::main_for;

fn main() -> ExitCode {
    main_for(Cppcheck)
}
