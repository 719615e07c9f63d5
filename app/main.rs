use clap::Parser;
use rtsp_client::{RtspClient, RtspClientConfig, RtspClientEvent};
use rtsp_server::{MediaSource, RtspServer, RtspServerConfig};
use sdp_formats::session::SessionDescription;
use tokio::signal;
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::{cli::AppCli, config::AppConfig, errors::AppResult, util::parse_log_level};

mod cli;
mod config;
mod errors;
mod util;

fn init_logging(level: &str) {
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_env_filter(
            EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .finish();
    tracing::dispatcher::set_global_default(tracing::Dispatch::new(subscriber)).unwrap();
}

async fn run_server(config: AppConfig) -> AppResult<()> {
    let description_text = std::fs::read_to_string(&config.source.description_path)?;
    let description: SessionDescription = description_text.parse()?;
    let source = MediaSource::new(description);

    let server = RtspServer::bind(
        RtspServerConfig {
            address: config.rtsp_server.address,
            port: config.rtsp_server.port,
            session_timeout_secs: config.rtsp_server.session_timeout_secs,
        },
        source,
    )
    .await?;

    tokio::spawn(async move {
        if let Err(err) = server.run().await {
            tracing::error!("rtsp server thread exit with err: {:?}", err);
        }
    });

    tracing::info!("rill is serving");
    let _ = signal::ctrl_c().await;
    tracing::info!("shutting down");
    Ok(())
}

async fn run_pull(url: Url) -> AppResult<()> {
    let mut client = RtspClient::new(url, RtspClientConfig::default());
    client.start_listening().await?;
    tracing::info!("pulling, session id: {:?}", client.session_id());

    let mut rtp_packets: u64 = 0;
    let mut rtp_bytes: u64 = 0;
    loop {
        tokio::select! {
            _ = signal::ctrl_c() => break,
            event = client.next_event() => match event? {
                RtspClientEvent::Rtp(payload) => {
                    rtp_packets += 1;
                    rtp_bytes += payload.len() as u64;
                    if rtp_packets % 500 == 0 {
                        tracing::info!("{} rtp packets, {} bytes", rtp_packets, rtp_bytes);
                    }
                }
                RtspClientEvent::Rtcp(_) => {}
                RtspClientEvent::Closed => {
                    tracing::info!("peer ended the session");
                    break;
                }
            },
        }
    }

    client.stop_listening().await?;
    tracing::info!("pulled {} rtp packets, {} bytes", rtp_packets, rtp_bytes);
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli_args = AppCli::parse();

    if let Some(url) = cli_args.pull.clone() {
        let level = cli_args.log_level.as_deref().unwrap_or("info");
        if let Err(err) = parse_log_level(level) {
            eprintln!("{}", err);
            std::process::exit(1);
        }
        init_logging(level);
        if let Err(err) = run_pull(url).await {
            tracing::error!("pull failed: {}", err);
            std::process::exit(1);
        }
        return;
    }

    let config_path = cli_args.config.as_ref().map(|path| path.display().to_string());
    let mut config = match AppConfig::new(config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    };
    config.apply(&cli_args);
    if let Err(err) = config.validate() {
        eprintln!("{}", err);
        std::process::exit(1);
    }
    init_logging(&config.logger.level);

    if let Err(err) = run_server(config).await {
        tracing::error!("rill exited with err: {:?}", err);
        std::process::exit(1);
    }
}
