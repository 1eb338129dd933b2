//! pre-commit hook running cpplint

use std::process::ExitCode;

use cmake_pc_hooks::hooks::cpplint::Cpplint;
use cmake_pc_hooks::hooks::main_for;

fn main() -> ExitCode {
    main_for(Cpplint)
}
