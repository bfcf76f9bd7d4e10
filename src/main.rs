use clap::Parser;
use platzkarte::interfaces::cli::Cli;

#[tokio::main]
async fn main() {
    if let Err(e) = platzkarte::run(Cli::parse()).await {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
