use std::process::ExitCode;

use folder_relocator::cli;
use folder_relocator::errors::RelocateError;
use folder_relocator::output as out;

mod app;
mod logging;

fn main() -> ExitCode {
    let args = cli::parse();
    match app::run(args) {
        Ok(code) => code,
        Err(e) => {
            out::print_error(&format!("{e:#}"));
            // Typed failures exit with their stable code
            match e.downcast_ref::<RelocateError>() {
                Some(re) => ExitCode::from(u8::try_from(re.code()).unwrap_or(1)),
                None => ExitCode::FAILURE,
            }
        }
    }
}
