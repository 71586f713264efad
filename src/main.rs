use clap::Parser;
use menu_pipeline::{cli, commands, logging};
use cli::Cli;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = commands::dispatch(cli) {
        eprintln!("❌ {}", e);
        std::process::exit(e.exit_code());
    }
}
