use std::process::ExitCode;

fn main() -> ExitCode {
    match cctv_prep::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
