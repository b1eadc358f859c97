// diabetes-portal/crates/diabetes-portal/src/main.rs

#[cfg(feature = "server")]
use diabetes_portal::{config::Config, run_server};
#[cfg(feature = "server")]
use dotenvy::dotenv;

#[cfg(feature = "server")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let cfg = Config::from_env()?;

    run_server(cfg).await
}

#[cfg(not(feature = "server"))]
fn main() {
    println!("Server feature not enabled. Enable with --features server");
}
