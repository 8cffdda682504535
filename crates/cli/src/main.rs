use std::process::ExitCode;

fn main() -> ExitCode {
    nac_tco_cli::run()
}
