use tracing::{error, info};

use gazette::{Config, Server, api, store};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    if let Err(err) = run().await {
        error!("fatal: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), gazette::Error> {
    let config = Config::from_env()?;

    // The one fatal failure mode besides bad configuration: no store, no
    // service.
    let store = store::connect(&config.store)?;
    info!(backend = %config.store, "store connected");

    Server::bind(&config.addr).serve(api::routes(store)).await
}
