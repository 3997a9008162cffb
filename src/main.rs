use clap::Parser;
use dock::cli::commands::Cli;
use dock::cli::handlers;
use dock::logging;

fn main() {
    let cli = Cli::parse();
    let _logger = logging::init(cli.verbose);

    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
