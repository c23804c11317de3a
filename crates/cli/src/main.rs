#[tokio::main]
async fn main() {
    if let Err(e) = golens_cli::run().await {
        eprintln!("golens: {e}");
        std::process::exit(1);
    }
}
