use std::process::ExitCode;

use colored::Colorize;

fn main() -> ExitCode {
    match boleto_client::app::run_cli() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
