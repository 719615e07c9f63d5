use std::{env, net::IpAddr, path::PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::{
    cli::AppCli,
    errors::{AppError, AppResult},
    util::parse_log_level,
};

#[derive(Debug, Deserialize)]
pub(crate) struct Logger {
    pub(crate) level: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RtspServer {
    pub(crate) address: IpAddr,
    pub(crate) port: u16,
    pub(crate) session_timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Source {
    /// Path to the upstream session description announced to peers.
    pub(crate) description_path: PathBuf,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AppConfig {
    pub(crate) logger: Logger,
    pub(crate) rtsp_server: RtspServer,
    pub(crate) source: Source,
}

impl AppConfig {
    pub(crate) fn new(config_path: Option<String>) -> AppResult<Self> {
        let config_path_composed = config_path.or_else(|| env::var("RILL_CONFIG").ok());
        if config_path_composed.is_none() {
            return Err(AppError::ConfigError(ConfigError::NotFound(
                "no config file is provided".to_owned(),
            )));
        }
        let result = Config::builder()
            .add_source(File::with_name(config_path_composed.unwrap().as_str()))
            .add_source(Environment::with_prefix("rill"))
            .build()?;
        let config = result.try_deserialize()?;
        Ok(config)
    }

    pub(crate) fn apply(&mut self, cli_args: &AppCli) {
        if let Some(log_level) = &cli_args.log_level {
            self.logger.level = log_level.clone();
        }
        if let Some(port) = cli_args.port {
            self.rtsp_server.port = port;
        }
    }

    pub(crate) fn validate(&self) -> AppResult<()> {
        let _ = parse_log_level(&self.logger.level)?;
        if self.source.description_path.as_os_str().is_empty() {
            return Err(AppError::ConfigError(ConfigError::Message(
                "the source description path is empty".to_owned(),
            )));
        }
        Ok(())
    }
}
