use pos_desktop::{application, toolkit};
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = std::env::args().skip(1).collect();

    match toolkit::launch(application::create_default(), args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}
