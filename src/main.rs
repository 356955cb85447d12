//! sendspin-mpris - Expose a remote sendspin session as an MPRIS player.
//!
//! Exits 0 after a requested shutdown (Ctrl-C, SIGTERM or MPRIS `Quit`) and
//! 1 when the bridge cannot start.

use std::{process::ExitCode, sync::Arc};

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info, info_span, warn};
use tracing_appender::non_blocking::WorkerGuard;

use sendspin_mpris::{
    Bridge, Result,
    cli::Args,
    config::{BridgeConfig, ConfigPaths},
    services::{
        mpris::{MprisServer, ZbusPropertySink},
        session::JsonLinesClient,
    },
    tracing_config,
};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if args.print_schema {
        return match BridgeConfig::json_schema() {
            Ok(schema) => {
                println!("{schema}");
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("sendspin-mpris: failed to render schema: {err}");
                ExitCode::FAILURE
            }
        };
    }

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("sendspin-mpris: {err}");
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = match init_logging(&args, &config) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("sendspin-mpris: failed to initialize logging: {err}");
            return ExitCode::FAILURE;
        }
    };

    match run(config).instrument(info_span!("sendspin_mpris")).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "bridge stopped with an error");
            ExitCode::FAILURE
        }
    }
}

fn load_config(args: &Args) -> Result<BridgeConfig> {
    let mut config = BridgeConfig::load(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;
    Ok(config)
}

fn init_logging(
    args: &Args,
    config: &BridgeConfig,
) -> std::result::Result<Option<WorkerGuard>, Box<dyn std::error::Error>> {
    let level = config.general.log_level;
    let format = config.general.log_format;

    if args.log_file {
        let log_dir = ConfigPaths::log_dir()?;
        tracing_config::init_with_file(level, format, &log_dir).map(Some)
    } else {
        tracing_config::init(level, format).map(|()| None)
    }
}

async fn run(config: BridgeConfig) -> Result<()> {
    info!(
        endpoint = %config.session.endpoint,
        bus_name = %config.mpris.bus_name(),
        "starting sendspin MPRIS bridge"
    );

    let connection = MprisServer::connect_session().await?;
    let client = Arc::new(JsonLinesClient::from_config(&config.session));
    let sink = Arc::new(ZbusPropertySink::new(connection.clone()));
    let bridge = Bridge::from_config(&config, client, sink);

    let server = bridge.export(connection, &config.mpris).await?;
    spawn_signal_handler(bridge.shutdown_token());

    let result = bridge.run().await;
    server.release().await;

    if result.is_ok() {
        info!("bridge stopped");
    }
    result
}

fn spawn_signal_handler(shutdown: CancellationToken) {
    tokio::spawn(async move {
        tokio::select! {
            () = shutdown.cancelled() => return,
            () = wait_for_signal() => {}
        }
        info!("shutdown signal received");
        shutdown.cancel();
    });
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(terminate) => terminate,
        Err(err) => {
            warn!(error = %err, "cannot listen for SIGTERM");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = terminate.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
