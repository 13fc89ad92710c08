//! Runs the POWERLINK supervisor against the loopback stack and serves the
//! operator API.
//!
//! Configuration comes from the environment, e.g.:
//! `PLK_MONITOR_ADDR=0.0.0.0:8080 PLK_PROCESS_IMAGE=pi.json RUST_LOG=info plk-supervisor`

use log::error;
use plk_supervisor_monitor::config::MonitorConfig;
use plk_supervisor_monitor::start_supervisor;
use std::process;

#[tokio::main]
async fn main() {
    env_logger::try_init().ok();

    let config = match MonitorConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            process::exit(2);
        }
    };

    if let Err(e) = start_supervisor(config).await {
        error!("Supervisor failed: {}", e);
        process::exit(1);
    }
}
