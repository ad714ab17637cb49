use clap::Parser;
use stock_screener::cli::{Cli, run};
use stock_screener::logging;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    logging::init(&cli.log_level);
    run(cli)
}
