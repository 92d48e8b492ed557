#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use todo_tracker::{TrackerConfig, http_api};

    env_logger::init();

    let config = TrackerConfig::from_env()?;
    let store = config.open_store()?;
    let state = http_api::AppState::new(store);

    log::info!(
        "serving {} on http://{}",
        config.data_path.display(),
        config.http_addr
    );
    http_api::serve(config.http_addr, state.clone(), shutdown_signal()).await?;

    log::info!("server stopped; closing store");
    state.shutdown()?;
    Ok(())
}

#[cfg(feature = "http_api")]
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            log::error!("failed to listen for ctrl-c: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                log::error!("failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
