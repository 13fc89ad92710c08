// crates/plk-supervisor/src/sdo/controller.rs
use super::abort::abort_code_description;
use super::job::{JobId, SdoTransferJob, SdoTransport, TransferDirection};
use super::result::{SdoTransferResult, TransferOutcome};
use crate::codec::{self, IecValue};
use crate::error::TransferError;
use crate::hal::{SdoStack, SdoTransferCompletion};
use crate::pi::Channel;
use crate::types::{IecDataType, NodeId};
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::convert::TryFrom;
use log::{debug, info, warn};

/// What the operator currently sees as the transfer outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferStatus {
    /// No transfer has been executed yet.
    #[default]
    Idle,
    /// A job was dispatched and its result has not arrived.
    Pending(JobId),
    /// The last transfer was confirmed by the target.
    Completed,
    /// The last transfer was aborted with this code.
    Aborted(u32),
    /// The last transfer was confirmed but its data could not be decoded.
    Failed,
}

/// Drives ad-hoc SDO transfers for the operator, one at a time.
///
/// Owns the display state (selected type, edited text, last outcome) and the
/// single outstanding job. All methods run on the thread that owns the
/// controller; stack completions are marshaled onto it and enter through
/// [`SdoTransferCompletion::transfer_finished`].
pub struct SdoTransferController<S: SdoStack> {
    stack: S,
    data_type: IecDataType,
    /// Process image variable the type was taken from, if any.
    channel: Option<Channel>,
    direction: TransferDirection,
    transport: SdoTransport,
    value_text: String,
    outstanding: Option<SdoTransferJob>,
    status: TransferStatus,
    result_text: String,
    next_job_id: u32,
    node_ids: Vec<NodeId>,
}

impl<S: SdoStack> SdoTransferController<S> {
    pub fn new(stack: S) -> Self {
        Self {
            stack,
            data_type: IecDataType::Udint,
            channel: None,
            direction: TransferDirection::Read,
            transport: SdoTransport::ASnd,
            value_text: String::new(),
            outstanding: None,
            status: TransferStatus::Idle,
            result_text: String::new(),
            next_job_id: 1,
            node_ids: Vec::new(),
        }
    }

    pub fn stack(&self) -> &S {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut S {
        &mut self.stack
    }

    pub fn data_type(&self) -> IecDataType {
        self.data_type
    }

    pub fn selected_channel(&self) -> Option<&Channel> {
        self.channel.as_ref()
    }

    pub fn direction(&self) -> TransferDirection {
        self.direction
    }

    pub fn transport(&self) -> SdoTransport {
        self.transport
    }

    pub fn value_text(&self) -> &str {
        &self.value_text
    }

    pub fn status(&self) -> TransferStatus {
        self.status
    }

    /// Decoded value, written value or abort description of the last transfer.
    pub fn result_text(&self) -> &str {
        &self.result_text
    }

    pub fn outstanding_job(&self) -> Option<JobId> {
        self.outstanding.as_ref().map(SdoTransferJob::id)
    }

    /// Width of the validation domain: the selected channel's bit size, or
    /// the full width of the selected type.
    fn bit_size(&self) -> u8 {
        self.channel
            .as_ref()
            .map_or(self.data_type.bit_size(), Channel::bit_size)
    }

    /// The value input is only editable for writes.
    pub fn value_enabled(&self) -> bool {
        self.direction == TransferDirection::Write
    }

    /// Validity of the current text for the selected type.
    pub fn is_value_valid(&self) -> bool {
        codec::parse_value_bits(&self.value_text, self.data_type, self.bit_size()).is_ok()
    }

    /// True if `execute_transfer` would get past the local checks.
    pub fn can_execute(&self) -> bool {
        self.outstanding.is_none()
            && (self.direction == TransferDirection::Read || self.is_value_valid())
    }

    /// Keeps the edited text if it is still valid under the new type,
    /// clears it otherwise.
    fn revalidate(&mut self) {
        if !self.value_text.is_empty() && !self.is_value_valid() {
            debug!(
                "Clearing value '{}': not valid for {} ({} bits)",
                self.value_text,
                self.data_type,
                self.bit_size()
            );
            self.value_text.clear();
        }
    }

    pub fn on_data_type_selected(&mut self, data_type: IecDataType) {
        self.data_type = data_type;
        self.channel = None;
        self.revalidate();
    }

    /// Selects the data type by its key (`"UNSIGNED32"`, `"udint"`, ...).
    pub fn on_data_type_key_selected(&mut self, key: &str) -> Result<(), TransferError> {
        let data_type = key.parse::<IecDataType>()?;
        self.on_data_type_selected(data_type);
        Ok(())
    }

    /// Takes the data type and bit size of a process image variable.
    pub fn on_channel_selected(&mut self, channel: &Channel) {
        self.data_type = channel.data_type();
        self.channel = Some(channel.clone());
        self.revalidate();
    }

    pub fn on_read_write_toggled(&mut self, is_read: bool) {
        self.direction = if is_read {
            TransferDirection::Read
        } else {
            TransferDirection::Write
        };
    }

    pub fn on_transport_selected(&mut self, transport: SdoTransport) {
        self.transport = transport;
    }

    /// Stores the edited text and returns whether it is valid.
    pub fn on_value_edited(&mut self, text: &str) -> bool {
        self.value_text = String::from(text);
        self.is_value_valid()
    }

    fn allocate_job_id(&mut self) -> JobId {
        let id = JobId(self.next_job_id);
        self.next_job_id = self.next_job_id.wrapping_add(1).max(1);
        id
    }

    /// Validates, builds and dispatches one transfer.
    ///
    /// Returns as soon as the stack accepted the request; the outcome
    /// arrives later through [`handle_transfer_finished`](Self::handle_transfer_finished).
    /// On error nothing is outstanding and the display state is unchanged.
    pub fn execute_transfer(
        &mut self,
        node: NodeId,
        index: u16,
        sub_index: u8,
        direction: TransferDirection,
        raw_text: &str,
    ) -> Result<JobId, TransferError> {
        if let Some(job) = &self.outstanding {
            warn!(
                "SDO transfer to node {} refused: job {} is still in progress.",
                node,
                job.id()
            );
            return Err(TransferError::Busy(job.id()));
        }
        let node = NodeId::try_from(node.0)?;

        let value = match direction {
            TransferDirection::Read => None,
            TransferDirection::Write => {
                let value = codec::parse_value_bits(raw_text, self.data_type, self.bit_size())
                    .map_err(|e| {
                        debug!("Write value '{}' rejected: {}", raw_text, e);
                        e
                    })?;
                Some(value)
            }
        };

        let id = self.allocate_job_id();
        let mut job = match &value {
            None => SdoTransferJob::read(
                id,
                node,
                index,
                sub_index,
                self.data_type,
                self.transport,
            ),
            Some(value) => {
                SdoTransferJob::write(id, node, index, sub_index, value, self.transport)?
            }
        };
        job.dispatch(&mut self.stack)?;

        self.direction = direction;
        if direction == TransferDirection::Write {
            self.value_text = String::from(raw_text);
        }
        self.result_text.clear();
        self.status = TransferStatus::Pending(id);
        self.outstanding = Some(job);
        Ok(id)
    }

    /// Completion entry point. Returns `false` if the result did not belong
    /// to the outstanding job and was ignored.
    pub fn handle_transfer_finished(&mut self, result: SdoTransferResult) -> bool {
        let Some(job) = self.outstanding.as_mut() else {
            warn!(
                "Ignoring stale SDO result for job {}: no transfer outstanding.",
                result.job_id()
            );
            return false;
        };
        if let Err(e) = job.complete(&result) {
            warn!("Ignoring stale SDO result: {}", e);
            return false;
        }
        let Some(job) = self.outstanding.take() else {
            return false;
        };

        match (job.direction(), result.outcome()) {
            (TransferDirection::Read, TransferOutcome::Read(data)) => self.render_read(&job, data),
            (TransferDirection::Write, TransferOutcome::Written) => {
                info!(
                    "SDO write job {} to node {} ({:#06X}/{:#04X}) confirmed.",
                    job.id(),
                    job.target(),
                    job.index(),
                    job.sub_index()
                );
                self.result_text = self.value_text.clone();
                self.status = TransferStatus::Completed;
            }
            (_, TransferOutcome::Aborted(code)) => {
                let description = abort_code_description(*code);
                warn!(
                    "SDO {} job {} to node {} ({:#06X}/{:#04X}) aborted with {:#010X}: {}",
                    job.direction(),
                    job.id(),
                    job.target(),
                    job.index(),
                    job.sub_index(),
                    code,
                    description
                );
                self.result_text = description;
                self.status = TransferStatus::Aborted(*code);
            }
            (direction, outcome) => {
                warn!(
                    "SDO {} job {} to node {} ({:#06X}/{:#04X}) answered with a {} confirmation.",
                    direction,
                    job.id(),
                    job.target(),
                    job.index(),
                    job.sub_index(),
                    outcome.kind()
                );
                self.result_text = format!(
                    "{} confirmation received for a {} transfer",
                    outcome.kind(),
                    direction
                );
                self.status = TransferStatus::Failed;
            }
        }
        true
    }

    fn render_read(&mut self, job: &SdoTransferJob, data: &[u8]) {
        match IecValue::from_le_bytes(job.data_type(), data) {
            Ok(value) => {
                info!(
                    "SDO read job {} from node {} ({:#06X}/{:#04X}) returned {}.",
                    job.id(),
                    job.target(),
                    job.index(),
                    job.sub_index(),
                    value
                );
                let text = value.to_string();
                self.value_text = text.clone();
                self.result_text = text;
                self.status = TransferStatus::Completed;
            }
            Err(e) => {
                warn!(
                    "SDO read job {} returned {} bytes that are not a valid {}: {}",
                    job.id(),
                    data.len(),
                    job.data_type(),
                    e
                );
                self.result_text = e.to_string();
                self.status = TransferStatus::Failed;
            }
        }
    }

    /// Queries the stack for the configured nodes, sorted and without
    /// duplicates, and keeps the list for display.
    pub fn refresh_node_ids(&mut self) -> &[NodeId] {
        let mut ids = self.stack.configured_node_ids();
        ids.sort_unstable();
        ids.dedup();
        debug!("Configured node ids: {:?}", ids);
        self.node_ids = ids;
        &self.node_ids
    }

    /// Node list from the last [`refresh_node_ids`](Self::refresh_node_ids).
    pub fn configured_node_ids(&self) -> &[NodeId] {
        &self.node_ids
    }
}

impl<S: SdoStack> SdoTransferCompletion for SdoTransferController<S> {
    fn transfer_finished(&mut self, result: SdoTransferResult) {
        self.handle_transfer_finished(result);
    }
}
