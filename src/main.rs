use clap::Parser;
use taskmaster::cli::commands::Cli;
use taskmaster::cli::handlers;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
