//! Example to run the MERGE2048 server standalone
//!
//! Run with: cargo run -p merge2048-server --example run_server

use merge2048_server::{run_server, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let config = ServerConfig {
        port: 8048,
        static_dir: "web".to_string(),
        save_path: Some("merge2048-save.json".into()),
        ..Default::default()
    };

    println!("Starting MERGE2048 server on port {}", config.port);
    println!("Static files from: {}", config.static_dir);
    println!("Open http://localhost:{}/index.html", config.port);

    run_server(config).await
}
