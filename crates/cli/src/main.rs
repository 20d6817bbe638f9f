use std::process::ExitCode;

fn main() -> ExitCode {
    lapak_cli::run()
}
