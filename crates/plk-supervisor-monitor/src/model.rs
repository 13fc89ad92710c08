// crates/plk-supervisor-monitor/src/model.rs
//! Serializable data structures exchanged with the web frontend, and the
//! process image description the host loads at start.

use plk_supervisor::sdo::{SdoTransport, TransferDirection, TransferStatus};
use plk_supervisor::types::DataTypeKeyError;
use plk_supervisor::{
    Channel, Direction, IecDataType, ProcessImage, ProcessImageError, SdoStack,
    SdoTransferController,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

// --- Process image description ---

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DirectionDto {
    Input,
    Output,
}

impl From<DirectionDto> for Direction {
    fn from(dto: DirectionDto) -> Self {
        match dto {
            DirectionDto::Input => Direction::Input,
            DirectionDto::Output => Direction::Output,
        }
    }
}

impl From<Direction> for DirectionDto {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Input => DirectionDto::Input,
            Direction::Output => DirectionDto::Output,
        }
    }
}

/// One variable of the process image description.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChannelDescription {
    pub name: String,
    /// IEC or object dictionary key, e.g. `"BOOL"` or `"UNSIGNED16"`.
    pub data_type: String,
    pub byte_offset: usize,
    #[serde(default)]
    pub bit_offset: u8,
    /// Defaults to the full width of the data type.
    #[serde(default)]
    pub bit_size: Option<u8>,
    pub direction: DirectionDto,
}

/// The process image layout as produced by the configuration tool.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProcessImageDescription {
    pub input_size: usize,
    pub output_size: usize,
    pub channels: Vec<ChannelDescription>,
}

#[derive(Debug)]
pub enum DescriptionError {
    Io(std::io::Error),
    Json(serde_json::Error),
    UnknownDataType {
        channel: String,
        source: DataTypeKeyError,
    },
    ProcessImage(ProcessImageError),
}

impl fmt::Display for DescriptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "Cannot read process image description: {}", e),
            Self::Json(e) => write!(f, "Malformed process image description: {}", e),
            Self::UnknownDataType { channel, source } => {
                write!(f, "Channel '{}': {}", channel, source)
            }
            Self::ProcessImage(e) => write!(f, "Invalid process image: {}", e),
        }
    }
}

impl std::error::Error for DescriptionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::UnknownDataType { source, .. } => Some(source),
            Self::ProcessImage(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for DescriptionError {
    fn from(err: std::io::Error) -> Self {
        DescriptionError::Io(err)
    }
}

impl From<serde_json::Error> for DescriptionError {
    fn from(err: serde_json::Error) -> Self {
        DescriptionError::Json(err)
    }
}

impl From<ProcessImageError> for DescriptionError {
    fn from(err: ProcessImageError) -> Self {
        DescriptionError::ProcessImage(err)
    }
}

impl ProcessImageDescription {
    pub fn from_json(json: &str) -> Result<Self, DescriptionError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, DescriptionError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Validates every channel and builds the zeroed process image.
    pub fn into_process_image(self) -> Result<ProcessImage, DescriptionError> {
        let channels = self
            .channels
            .into_iter()
            .map(|desc| {
                let data_type = desc.data_type.parse::<IecDataType>().map_err(|source| {
                    DescriptionError::UnknownDataType {
                        channel: desc.name.clone(),
                        source,
                    }
                })?;
                let channel = Channel::new(
                    desc.name,
                    data_type,
                    desc.byte_offset,
                    desc.bit_offset,
                    desc.bit_size.unwrap_or(data_type.bit_size()),
                    desc.direction.into(),
                )
                .map_err(ProcessImageError::from)?;
                Ok(channel)
            })
            .collect::<Result<Vec<_>, DescriptionError>>()?;
        Ok(ProcessImage::new(self.input_size, self.output_size, channels)?)
    }

    /// Image used when no description is configured: eight digital and one
    /// analog channel per direction.
    pub fn demo() -> Self {
        let mut channels = Vec::new();
        for (prefix, direction) in [("In", DirectionDto::Input), ("Out", DirectionDto::Output)] {
            for bit in 0..8u8 {
                channels.push(ChannelDescription {
                    name: format!("Digital{}_{:02}", prefix, bit),
                    data_type: "BOOL".into(),
                    byte_offset: 0,
                    bit_offset: bit,
                    bit_size: Some(1),
                    direction,
                });
            }
            channels.push(ChannelDescription {
                name: format!("Analog{}_00", prefix),
                data_type: "INT".into(),
                byte_offset: 2,
                bit_offset: 0,
                bit_size: None,
                direction,
            });
        }
        Self {
            input_size: 4,
            output_size: 4,
            channels,
        }
    }
}

// --- Process image view ---

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSnapshot {
    pub name: String,
    pub data_type: String,
    pub direction: DirectionDto,
    pub byte_offset: usize,
    pub bit_offset: u8,
    pub bit_size: u8,
    /// Decoded value, rendered as the operator would enter it.
    pub value: String,
}

/// Variables and memory view of the process image at one point in time.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProcessImageSnapshot {
    pub input: Vec<u8>,
    pub output: Vec<u8>,
    pub channels: Vec<ChannelSnapshot>,
}

impl ProcessImageSnapshot {
    pub fn capture(image: &ProcessImage) -> Self {
        let channels = image
            .channels(Direction::Input)
            .chain(image.channels(Direction::Output))
            .map(|channel| ChannelSnapshot {
                name: channel.name().to_string(),
                data_type: channel.data_type().key().to_string(),
                direction: channel.direction().into(),
                byte_offset: channel.byte_offset(),
                bit_offset: channel.bit_offset(),
                bit_size: channel.bit_size(),
                value: image
                    .read_value(channel.name())
                    .map(|v| v.to_string())
                    .unwrap_or_else(|e| e.to_string()),
            })
            .collect();
        Self {
            input: image.buffer(Direction::Input).to_vec(),
            output: image.buffer(Direction::Output).to_vec(),
            channels,
        }
    }
}

// --- SDO transfer dialog ---

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransferDirectionDto {
    Read,
    Write,
}

impl From<TransferDirectionDto> for TransferDirection {
    fn from(dto: TransferDirectionDto) -> Self {
        match dto {
            TransferDirectionDto::Read => TransferDirection::Read,
            TransferDirectionDto::Write => TransferDirection::Write,
        }
    }
}

impl From<TransferDirection> for TransferDirectionDto {
    fn from(direction: TransferDirection) -> Self {
        match direction {
            TransferDirection::Read => TransferDirectionDto::Read,
            TransferDirection::Write => TransferDirectionDto::Write,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransportDto {
    Asnd,
    Udp,
}

impl From<TransportDto> for SdoTransport {
    fn from(dto: TransportDto) -> Self {
        match dto {
            TransportDto::Asnd => SdoTransport::ASnd,
            TransportDto::Udp => SdoTransport::Udp,
        }
    }
}

impl From<SdoTransport> for TransportDto {
    fn from(transport: SdoTransport) -> Self {
        match transport {
            SdoTransport::ASnd => TransportDto::Asnd,
            SdoTransport::Udp => TransportDto::Udp,
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StatusDto {
    Idle,
    Pending,
    Completed,
    Aborted,
    Failed,
}

/// Everything the SDO transfer dialog displays.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SdoView {
    pub data_type: String,
    pub channel: Option<String>,
    pub direction: TransferDirectionDto,
    pub transport: TransportDto,
    pub value_text: String,
    pub value_valid: bool,
    pub value_enabled: bool,
    pub can_execute: bool,
    pub status: StatusDto,
    pub pending_job: Option<u32>,
    pub abort_code: Option<u32>,
    pub result_text: String,
    pub node_ids: Vec<u8>,
}

impl SdoView {
    pub fn from_controller<S: SdoStack>(controller: &SdoTransferController<S>) -> Self {
        let (status, pending_job, abort_code) = match controller.status() {
            TransferStatus::Idle => (StatusDto::Idle, None, None),
            TransferStatus::Pending(id) => (StatusDto::Pending, Some(id.0), None),
            TransferStatus::Completed => (StatusDto::Completed, None, None),
            TransferStatus::Aborted(code) => (StatusDto::Aborted, None, Some(code)),
            TransferStatus::Failed => (StatusDto::Failed, None, None),
        };
        Self {
            data_type: controller.data_type().key().to_string(),
            channel: controller.selected_channel().map(|c| c.name().to_string()),
            direction: controller.direction().into(),
            transport: controller.transport().into(),
            value_text: controller.value_text().to_string(),
            value_valid: controller.is_value_valid(),
            value_enabled: controller.value_enabled(),
            can_execute: controller.can_execute(),
            status,
            pending_job,
            abort_code,
            result_text: controller.result_text().to_string(),
            node_ids: controller
                .configured_node_ids()
                .iter()
                .map(|id| id.0)
                .collect(),
        }
    }
}

// --- API requests and responses ---

#[derive(Deserialize, Debug, Clone)]
pub struct DataTypeRequest {
    pub key: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ChannelRequest {
    pub name: String,
}

#[derive(Deserialize, Debug, Clone, Copy)]
pub struct ModeRequest {
    pub read: bool,
}

#[derive(Deserialize, Debug, Clone, Copy)]
pub struct TransportRequest {
    pub transport: TransportDto,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ValueRequest {
    pub text: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub node_id: u8,
    pub index: u16,
    pub sub_index: u8,
    pub direction: TransferDirectionDto,
    /// Value text for writes. The dialog's current text is used if absent.
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransferAccepted {
    pub job_id: u32,
}

#[derive(Deserialize, Debug, Clone)]
pub struct WriteValueRequest {
    pub value: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

/// Messages pushed to WebSocket clients.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MonitorEvent {
    /// Sent after every DataSync cycle.
    ProcessImage {
        cycle: u64,
        image: ProcessImageSnapshot,
    },
    /// Sent whenever the SDO dialog state changes.
    Sdo(SdoView),
}
