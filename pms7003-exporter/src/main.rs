//! Entry point for the `pms7003` exporter.

use std::future::IntoFuture;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use pms7003_exporter::{
    cli::Cli,
    logging, metrics,
    pipeline::{run_sensor, ExportSink},
    routes::create_router,
    state::{AppState, LatestReading},
};
use pms7003_sensor::port;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(&cli.logging_config());

    if cli.list {
        match port::available_ports() {
            Ok(ports) => ports.iter().for_each(|p| println!("{p}")),
            Err(e) => {
                error!(error = %e, "failed to list serial ports");
                std::process::exit(1);
            }
        }
        return;
    }

    let Some(sensor_config) = cli.sensor_config() else {
        error!("no serial port given; pass --port or set PMS7003_PORT");
        std::process::exit(2);
    };

    let handle = match metrics::install_recorder() {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "failed to install metrics recorder");
            std::process::exit(1);
        }
    };
    metrics::register_metrics();

    let latest = Arc::new(LatestReading::new());
    let shutdown = Arc::new(AtomicBool::new(false));

    let mut sink = ExportSink::new(cli.settle_time(), Arc::clone(&latest), cli.echo);
    let reader_shutdown = Arc::clone(&shutdown);
    let mut reader = tokio::task::spawn_blocking(move || {
        run_sensor(sensor_config, &mut sink, &reader_shutdown)
    });

    let app = create_router(AppState::new(latest).with_prometheus_handle(handle));
    let listener = match tokio::net::TcpListener::bind(cli.listen).await {
        Ok(l) => l,
        Err(e) => {
            error!(addr = %cli.listen, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };
    info!(addr = %cli.listen, "pms7003 exporter listening");

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(Arc::clone(&shutdown)))
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => {
            if let Err(e) = result {
                error!(error = %e, "server error");
                std::process::exit(1);
            }
            shutdown.store(true, Ordering::Relaxed);
            match reader.await {
                Ok(Ok(())) => info!("sensor reader stopped"),
                Ok(Err(e)) => error!(error = %e, "sensor reader failed during shutdown"),
                Err(e) => error!(error = %e, "sensor reader task panicked"),
            }
        }
        result = &mut reader => {
            match result {
                // Ctrl-C stopped the reader first; let the server drain.
                Ok(Ok(())) if shutdown.load(Ordering::Relaxed) => {
                    info!("sensor reader stopped");
                    if let Err(e) = server.await {
                        error!(error = %e, "server error");
                        std::process::exit(1);
                    }
                }
                Ok(Ok(())) => {
                    error!("sensor reader stopped unexpectedly");
                    std::process::exit(1);
                }
                Ok(Err(e)) => {
                    error!(error = %e, "sensor reader failed");
                    std::process::exit(1);
                }
                Err(e) => {
                    error!(error = %e, "sensor reader task panicked");
                    std::process::exit(1);
                }
            }
        }
    }
}

async fn shutdown_signal(shutdown: Arc<AtomicBool>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
    shutdown.store(true, Ordering::Relaxed);
}
