// crates/plk-supervisor-monitor/src/lib.rs
//! Host application of the POWERLINK supervisor.
//!
//! The SDO transfer controller lives on its own thread (see [`supervisor`]),
//! stack completions are marshaled onto it (see [`completion`]), the DataSync
//! loop runs as a tokio task (see [`sync`]) and the operator talks to all of
//! it through a JSON/WebSocket API (see [`server`]).

pub mod completion;
pub mod config;
pub mod loopback;
pub mod model;
pub mod server;
pub mod supervisor;
pub mod sync;

use crate::completion::completion_channel;
use crate::config::MonitorConfig;
use crate::loopback::LoopbackStack;
use crate::model::ProcessImageDescription;
use crate::server::AppState;
use crate::sync::DataSync;
use log::info;
use plk_supervisor::{ProcessImage, SdoTransferController};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

/// Capacity of the event broadcast. Slow WebSocket clients skip events
/// instead of holding back the DataSync loop.
const EVENT_CAPACITY: usize = 64;

/// Loads the configured process image, or the demo image if none is set.
pub fn load_process_image(config: &MonitorConfig) -> Result<ProcessImage, model::DescriptionError> {
    let description = match &config.process_image {
        Some(path) => {
            info!("Loading process image description from {}", path.display());
            ProcessImageDescription::load(path)?
        }
        None => {
            info!("No process image configured, using the demo image.");
            ProcessImageDescription::demo()
        }
    };
    description.into_process_image()
}

/// Starts the supervisor against the loopback stack and serves the API
/// until the web server stops.
pub async fn start_supervisor(config: MonitorConfig) -> Result<(), Box<dyn std::error::Error>> {
    let image = Arc::new(Mutex::new(load_process_image(&config)?));
    let (events, _) = broadcast::channel(EVENT_CAPACITY);

    let (completion_tx, completion_rx) = completion_channel();
    let stack = LoopbackStack::start(
        config.local_node_id,
        &config.loopback_nodes,
        config.sync_period,
        completion_tx,
    );

    let mut controller = SdoTransferController::new(stack.clone());
    controller.on_transport_selected(config.sdo_transport);
    let (supervisor, _supervisor_thread) =
        supervisor::spawn_supervisor(controller, completion_rx, events.clone())?;

    let data_sync = DataSync::new(stack, Arc::clone(&image));
    tokio::spawn(data_sync.run(config.sync_period, events.clone()));

    let state = AppState {
        supervisor,
        image,
        events,
    };
    server::start_web_server(config.listen_addr, state).await?;
    Ok(())
}
