#[tokio::main]
async fn main() {
    if let Err(e) = roster_backend::run().await {
        log::error!("roster-backend exited with error: {}", e);
        eprintln!("roster-backend: {}", e);
        std::process::exit(1);
    }
}
