use clap::Parser;
use log::info;
use tokio::net::TcpListener;
use todo_server::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();
    todo_server::logging::init();

    let store = config.open_store();
    store.initialize()?;
    info!(
        "event=startup backend={:?} store={} static_dir={}",
        config.backend,
        config.store_path().display(),
        config.static_dir.display()
    );

    let addr = config.addr();
    let listener = TcpListener::bind(addr).await?;
    info!("event=listening addr={addr}");

    let router = todo_server::app_with_frontend(store.clone(), &config.static_dir);
    let served = todo_server::run(listener, router, todo_server::shutdown_signal()).await;

    store.close()?;
    info!("event=shutdown status=ok");
    Ok(served?)
}
