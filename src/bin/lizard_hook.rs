//! pre-commit hook running lizard

use std::process::ExitCode;

use cmake_pc_hooks::hooks::lizard::Lizard;
use cmake_pc_hooks::hooks::main_for;

fn main() -> ExitCode {
    main_for(Lizard)
}
