use std::process::ExitCode;

use kaleido::config::LaunchOptions;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kaleido=info")))
        .init();

    let options = match LaunchOptions::from_args(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("kaleido: {}", e);
            eprintln!(
                "usage: kaleido [MODE] [--palette NAME|#HEX,..] [--shape NAME] [--scale X] [--light] [--attractor] [--seed N]"
            );
            return ExitCode::from(2);
        }
    };

    match kaleido::window::run(options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
