// crates/plk-supervisor-monitor/src/server.rs
//! HTTP and WebSocket API of the supervisor, built on axum.

use crate::model::{
    ChannelRequest, DataTypeRequest, ErrorBody, ModeRequest, MonitorEvent, ProcessImageSnapshot,
    SdoView, TransferAccepted, TransferRequest, TransportRequest, ValueRequest,
    WriteValueRequest,
};
use crate::supervisor::{SupervisorHandle, SupervisorStopped};
use axum::{
    Json, Router,
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use log::{debug, error, info, trace, warn};
use plk_supervisor::codec;
use plk_supervisor::{
    Direction, NodeId, ProcessImage, ProcessImageError, SdoStack, TransferError,
};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::broadcast;

/// Shared state of all handlers.
pub struct AppState<S: SdoStack> {
    pub supervisor: SupervisorHandle<S>,
    pub image: Arc<Mutex<ProcessImage>>,
    /// Events for WebSocket clients: DataSync snapshots and dialog updates.
    pub events: broadcast::Sender<MonitorEvent>,
}

impl<S: SdoStack> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            supervisor: self.supervisor.clone(),
            image: Arc::clone(&self.image),
            events: self.events.clone(),
        }
    }
}

/// An error answered as `{ "error": "..." }` with a matching status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl ToString) -> Self {
        Self {
            status,
            message: message.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<TransferError> for ApiError {
    fn from(err: TransferError) -> Self {
        let status = match &err {
            TransferError::Validation(_)
            | TransferError::UnknownDataType(_)
            | TransferError::InvalidNode(_) => StatusCode::BAD_REQUEST,
            TransferError::Busy(_) => StatusCode::CONFLICT,
            TransferError::Dispatch(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        ApiError::new(status, err)
    }
}

impl From<ProcessImageError> for ApiError {
    fn from(err: ProcessImageError) -> Self {
        let status = match &err {
            ProcessImageError::UnknownChannel(_) => StatusCode::NOT_FOUND,
            ProcessImageError::Codec(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError::new(status, err)
    }
}

impl From<SupervisorStopped> for ApiError {
    fn from(err: SupervisorStopped) -> Self {
        ApiError::new(StatusCode::SERVICE_UNAVAILABLE, err)
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

pub fn router<S: SdoStack + Send + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/api/process-image", get(get_process_image::<S>))
        .route("/api/process-image/{name}", put(put_channel_value::<S>))
        .route("/api/sdo", get(get_sdo::<S>))
        .route("/api/sdo/data-type", post(post_data_type::<S>))
        .route("/api/sdo/channel", post(post_channel::<S>))
        .route("/api/sdo/mode", post(post_mode::<S>))
        .route("/api/sdo/transport", post(post_transport::<S>))
        .route("/api/sdo/value", post(post_value::<S>))
        .route("/api/sdo/transfer", post(post_transfer::<S>))
        .route("/api/nodes", get(get_nodes::<S>))
        .route("/ws", get(websocket_handler::<S>))
        .with_state(state)
}

/// Binds to `addr` and serves the API until the server fails.
pub async fn start_web_server<S: SdoStack + Send + 'static>(
    addr: SocketAddr,
    state: AppState<S>,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        error!("Failed to bind web server to {}: {}", addr, e);
        e
    })?;
    info!("Supervisor listening on http://{}", addr);
    axum::serve(listener, router(state)).await
}

fn lock_image(image: &Mutex<ProcessImage>) -> std::sync::MutexGuard<'_, ProcessImage> {
    image.lock().unwrap_or_else(PoisonError::into_inner)
}

// --- Process image ---

async fn get_process_image<S: SdoStack + Send + 'static>(
    State(state): State<AppState<S>>,
) -> Json<ProcessImageSnapshot> {
    Json(ProcessImageSnapshot::capture(&lock_image(&state.image)))
}

/// Sets an output variable. Inputs belong to the network and are rejected.
async fn put_channel_value<S: SdoStack + Send + 'static>(
    State(state): State<AppState<S>>,
    Path(name): Path<String>,
    Json(request): Json<WriteValueRequest>,
) -> ApiResult<ProcessImageSnapshot> {
    let mut image = lock_image(&state.image);
    let channel = image
        .channel(&name)
        .cloned()
        .ok_or_else(|| ProcessImageError::UnknownChannel(name.clone()))?;
    if channel.direction() == Direction::Input {
        return Err(ApiError::new(
            StatusCode::CONFLICT,
            format!("Channel '{}' is an input and is written by the network", name),
        ));
    }
    let value =
        codec::parse_value_bits(&request.value, channel.data_type(), channel.bit_size())
            .map_err(ProcessImageError::from)?;
    image.write_value(&name, &value)?;
    Ok(Json(ProcessImageSnapshot::capture(&image)))
}

// --- SDO transfer dialog ---

async fn get_sdo<S: SdoStack + Send + 'static>(
    State(state): State<AppState<S>>,
) -> ApiResult<SdoView> {
    let view = state
        .supervisor
        .call(|ctl| SdoView::from_controller(ctl))
        .await?;
    Ok(Json(view))
}

async fn post_data_type<S: SdoStack + Send + 'static>(
    State(state): State<AppState<S>>,
    Json(request): Json<DataTypeRequest>,
) -> ApiResult<SdoView> {
    let view = state
        .supervisor
        .call(move |ctl| {
            ctl.on_data_type_key_selected(&request.key)
                .map(|()| SdoView::from_controller(ctl))
        })
        .await??;
    Ok(Json(view))
}

async fn post_channel<S: SdoStack + Send + 'static>(
    State(state): State<AppState<S>>,
    Json(request): Json<ChannelRequest>,
) -> ApiResult<SdoView> {
    let channel = lock_image(&state.image)
        .channel(&request.name)
        .cloned()
        .ok_or(ProcessImageError::UnknownChannel(request.name))?;
    let view = state
        .supervisor
        .call(move |ctl| {
            ctl.on_channel_selected(&channel);
            SdoView::from_controller(ctl)
        })
        .await?;
    Ok(Json(view))
}

async fn post_mode<S: SdoStack + Send + 'static>(
    State(state): State<AppState<S>>,
    Json(request): Json<ModeRequest>,
) -> ApiResult<SdoView> {
    let view = state
        .supervisor
        .call(move |ctl| {
            ctl.on_read_write_toggled(request.read);
            SdoView::from_controller(ctl)
        })
        .await?;
    Ok(Json(view))
}

async fn post_transport<S: SdoStack + Send + 'static>(
    State(state): State<AppState<S>>,
    Json(request): Json<TransportRequest>,
) -> ApiResult<SdoView> {
    let view = state
        .supervisor
        .call(move |ctl| {
            ctl.on_transport_selected(request.transport.into());
            SdoView::from_controller(ctl)
        })
        .await?;
    Ok(Json(view))
}

async fn post_value<S: SdoStack + Send + 'static>(
    State(state): State<AppState<S>>,
    Json(request): Json<ValueRequest>,
) -> ApiResult<SdoView> {
    let view = state
        .supervisor
        .call(move |ctl| {
            ctl.on_value_edited(&request.text);
            SdoView::from_controller(ctl)
        })
        .await?;
    Ok(Json(view))
}

/// Starts a transfer. Answers `202 Accepted` with the job id; the outcome
/// is published on `/ws` and visible through `GET /api/sdo`.
async fn post_transfer<S: SdoStack + Send + 'static>(
    State(state): State<AppState<S>>,
    Json(request): Json<TransferRequest>,
) -> Result<(StatusCode, Json<TransferAccepted>), ApiError> {
    debug!(
        "Transfer requested: node {} {:#06X}/{:#04X} {:?}",
        request.node_id, request.index, request.sub_index, request.direction
    );
    let job_id = state
        .supervisor
        .call(move |ctl| {
            let text = request
                .value
                .unwrap_or_else(|| ctl.value_text().to_string());
            ctl.execute_transfer(
                NodeId(request.node_id),
                request.index,
                request.sub_index,
                request.direction.into(),
                &text,
            )
        })
        .await?
        .map_err(|e| {
            warn!("Transfer refused: {}", e);
            ApiError::from(e)
        })?;
    Ok((
        StatusCode::ACCEPTED,
        Json(TransferAccepted { job_id: job_id.0 }),
    ))
}

async fn get_nodes<S: SdoStack + Send + 'static>(
    State(state): State<AppState<S>>,
) -> ApiResult<Vec<u8>> {
    let ids = state
        .supervisor
        .call(|ctl| ctl.refresh_node_ids().iter().map(|id| id.0).collect::<Vec<u8>>())
        .await?;
    Ok(Json(ids))
}

// --- WebSocket ---

async fn websocket_handler<S: SdoStack + Send + 'static>(
    ws: WebSocketUpgrade,
    State(state): State<AppState<S>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn send_event(socket: &mut WebSocket, event: &MonitorEvent) -> bool {
    match serde_json::to_string(event) {
        Ok(json_payload) => socket.send(Message::Text(json_payload.into())).await.is_ok(),
        Err(e) => {
            error!("Failed to serialize event to JSON: {}", e);
            true
        }
    }
}

/// Streams every event to one client until it disconnects. The current
/// dialog state is sent first.
async fn handle_socket<S: SdoStack + Send + 'static>(mut socket: WebSocket, state: AppState<S>) {
    info!("New WebSocket client connected.");
    let mut event_rx = state.events.subscribe();

    if let Ok(view) = state.supervisor.call(|ctl| SdoView::from_controller(ctl)).await {
        if !send_event(&mut socket, &MonitorEvent::Sdo(view)).await {
            info!("WebSocket client disconnected (send error).");
            return;
        }
    }

    loop {
        tokio::select! {
            Ok(event) = event_rx.recv() => {
                trace!("Forwarding event to WebSocket client.");
                if !send_event(&mut socket, &event).await {
                    info!("WebSocket client disconnected (send error).");
                    break;
                }
            }
            Some(Ok(msg)) = socket.recv() => {
                if let Message::Close(_) = msg {
                    info!("WebSocket client disconnected (received close message).");
                    break;
                }
            }
            else => {
                info!("WebSocket client disconnected (channel closed).");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::completion_channel;
    use crate::loopback::LoopbackStack;
    use crate::model::{ProcessImageDescription, StatusDto, TransferDirectionDto};
    use crate::supervisor::spawn_supervisor;
    use plk_supervisor::SdoTransferController;
    use std::time::Duration;

    fn state() -> AppState<LoopbackStack> {
        let (tx, rx) = completion_channel();
        let stack = LoopbackStack::start(NodeId::LOCAL, &[NodeId(1)], Duration::from_millis(1), tx);
        let (events, _) = broadcast::channel(64);
        let (supervisor, _join) =
            spawn_supervisor(SdoTransferController::new(stack), rx, events.clone()).unwrap();
        let image = ProcessImageDescription::demo().into_process_image().unwrap();
        AppState {
            supervisor,
            image: Arc::new(Mutex::new(image)),
            events,
        }
    }

    async fn wait_for_outcome(state: &AppState<LoopbackStack>) -> SdoView {
        for _ in 0..500 {
            let Json(view) = get_sdo(State(state.clone())).await.unwrap();
            if view.status != StatusDto::Pending {
                return view;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("transfer did not complete");
    }

    #[tokio::test]
    async fn test_write_output_channel() {
        let state = state();
        let Json(snapshot) = put_channel_value(
            State(state.clone()),
            Path("AnalogOut_00".to_string()),
            Json(WriteValueRequest {
                value: "-2".into(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(snapshot.output[2..4], [0xFE, 0xFF]);

        let err = put_channel_value(
            State(state.clone()),
            Path("DigitalIn_00".to_string()),
            Json(WriteValueRequest { value: "1".into() }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);

        let err = put_channel_value(
            State(state.clone()),
            Path("DigitalOut_00".to_string()),
            Json(WriteValueRequest { value: "2".into() }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err = put_channel_value(
            State(state),
            Path("Nope".to_string()),
            Json(WriteValueRequest { value: "1".into() }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_sdo_dialog_flow() {
        let state = state();
        let Json(view) = post_data_type(
            State(state.clone()),
            Json(DataTypeRequest {
                key: "UNSIGNED32".into(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(view.data_type, "UDINT");

        let (status, Json(accepted)) = post_transfer(
            State(state.clone()),
            Json(TransferRequest {
                node_id: 1,
                index: 0x1018,
                sub_index: 0x01,
                direction: TransferDirectionDto::Read,
                value: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::ACCEPTED);
        assert!(accepted.job_id > 0);

        let view = wait_for_outcome(&state).await;
        assert_eq!(view.status, StatusDto::Completed);
        assert_eq!(view.result_text, "4");

        // Write to a read-only object: the abort is rendered.
        post_transfer(
            State(state.clone()),
            Json(TransferRequest {
                node_id: 1,
                index: 0x1018,
                sub_index: 0x01,
                direction: TransferDirectionDto::Write,
                value: Some("7".into()),
            }),
        )
        .await
        .unwrap();
        let view = wait_for_outcome(&state).await;
        assert_eq!(view.status, StatusDto::Aborted);
        assert_eq!(view.abort_code, Some(0x0601_0002));
        assert_eq!(view.result_text, "Attempt to write a read-only object");
    }

    #[tokio::test]
    async fn test_transfer_errors_map_to_status_codes() {
        let state = state();
        let request = |node_id, value: &str| TransferRequest {
            node_id,
            index: 0x2000,
            sub_index: 0,
            direction: TransferDirectionDto::Write,
            value: Some(value.to_string()),
        };

        let err = post_transfer(State(state.clone()), Json(request(1, "-1")))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err = post_transfer(State(state.clone()), Json(request(0, "1")))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err = post_transfer(State(state.clone()), Json(request(77, "1")))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);

        let err = post_data_type(
            State(state),
            Json(DataTypeRequest {
                key: "STRING".into(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_channel_selection_and_nodes() {
        let state = state();
        let Json(view) = post_channel(
            State(state.clone()),
            Json(ChannelRequest {
                name: "AnalogOut_00".into(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(view.data_type, "INT");
        assert_eq!(view.channel.as_deref(), Some("AnalogOut_00"));

        let Json(view) = post_mode(State(state.clone()), Json(ModeRequest { read: false }))
            .await
            .unwrap();
        assert!(view.value_enabled);

        let Json(view) = post_value(
            State(state.clone()),
            Json(ValueRequest {
                text: "40000".into(),
            }),
        )
        .await
        .unwrap();
        assert!(!view.value_valid);

        let Json(nodes) = get_nodes(State(state)).await.unwrap();
        assert_eq!(nodes, [1, 240]);
    }
}
