//! pre-commit hook running include-what-you-use

use std::process::ExitCode;

use cmake_pc_hooks::hooks::include_what_you_use::IncludeWhatYouUse;
use cmake_pc_hooks::hooks::main_for;

fn main() -> ExitCode {
    main_for(IncludeWhatYouUse)
}
