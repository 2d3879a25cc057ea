use clap::Parser;
use sgrna_count::{cli, commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let args = cli::Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("sgrna_count=debug,info")
    } else if args.quiet {
        EnvFilter::new("warn")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = commands::count::run(args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
