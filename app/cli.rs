use std::path::PathBuf;

use clap::Parser;
use url::Url;

#[derive(Parser)]
#[command(version, about)]
pub(crate) struct AppCli {
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub(crate) config: Option<PathBuf>,
    #[arg(long, value_name = "LOG_LEVEL")]
    pub(crate) log_level: Option<String>,
    #[arg(long, value_name = "RTSP_PORT")]
    pub(crate) port: Option<u16>,
    /// Pull a remote stream instead of serving; prints delivery counters.
    #[arg(long, value_name = "RTSP_URL")]
    pub(crate) pull: Option<Url>,
}
