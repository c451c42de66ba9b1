use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = splitproxy::cli::Cli::parse();
    if let Err(e) = splitproxy::cmd::dispatch(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
