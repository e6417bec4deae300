use std::process::ExitCode;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    ambel_cli::run()
}
