use std::process::ExitCode;

fn main() -> ExitCode {
    match zc_spectral::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}
