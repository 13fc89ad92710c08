// crates/plk-supervisor/src/sdo/job.rs
use super::SdoTransferResult;
use crate::codec::{self, IecValue};
use crate::error::{CodecError, DispatchError, JobStateError};
use crate::hal::{SdoRequest, SdoStack};
use crate::types::{IecDataType, NodeId};
use alloc::vec::Vec;
use core::fmt;
use log::{info, warn};

/// Correlates a dispatched request with the result the stack delivers for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobId(pub u32);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferDirection {
    #[default]
    Read,
    Write,
}

impl fmt::Display for TransferDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "Read"),
            Self::Write => write!(f, "Write"),
        }
    }
}

/// Transport layer that carries the SDO command layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SdoTransport {
    /// SDO embedded in ASnd frames (Layer 2).
    #[default]
    ASnd,
    /// SDO over UDP/IP.
    Udp,
}

impl fmt::Display for SdoTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ASnd => write!(f, "ASnd"),
            Self::Udp => write!(f, "UDP"),
        }
    }
}

/// Lifecycle of a single job. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Created,
    Dispatched,
    Completed,
}

/// One SDO request to a single object dictionary entry. Single use: once
/// completed, a job is dropped and never dispatched again.
#[derive(Debug, Clone, PartialEq)]
pub struct SdoTransferJob {
    id: JobId,
    target: NodeId,
    index: u16,
    sub_index: u8,
    direction: TransferDirection,
    transport: SdoTransport,
    /// Type used to encode the payload or decode the read response.
    data_type: IecDataType,
    payload: Option<Vec<u8>>,
    state: JobState,
}

impl SdoTransferJob {
    pub fn read(
        id: JobId,
        target: NodeId,
        index: u16,
        sub_index: u8,
        data_type: IecDataType,
        transport: SdoTransport,
    ) -> Self {
        Self {
            id,
            target,
            index,
            sub_index,
            direction: TransferDirection::Read,
            transport,
            data_type,
            payload: None,
            state: JobState::Created,
        }
    }

    /// Creates a write job carrying `value` encoded at its full width.
    pub fn write(
        id: JobId,
        target: NodeId,
        index: u16,
        sub_index: u8,
        value: &IecValue,
        transport: SdoTransport,
    ) -> Result<Self, CodecError> {
        let payload = codec::encode_payload(value)?;
        Ok(Self {
            id,
            target,
            index,
            sub_index,
            direction: TransferDirection::Write,
            transport,
            data_type: value.data_type(),
            payload: Some(payload),
            state: JobState::Created,
        })
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn index(&self) -> u16 {
        self.index
    }

    pub fn sub_index(&self) -> u8 {
        self.sub_index
    }

    pub fn direction(&self) -> TransferDirection {
        self.direction
    }

    pub fn transport(&self) -> SdoTransport {
        self.transport
    }

    pub fn data_type(&self) -> IecDataType {
        self.data_type
    }

    pub fn payload(&self) -> Option<&[u8]> {
        self.payload.as_deref()
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// Builds the request handed to the stack for this job.
    pub fn request(&self) -> SdoRequest<'_> {
        SdoRequest {
            job_id: self.id,
            target: self.target,
            index: self.index,
            sub_index: self.sub_index,
            direction: self.direction,
            transport: self.transport,
            payload: self.payload.as_deref(),
        }
    }

    /// Hands the job to the stack. Returns as soon as the stack has accepted
    /// or rejected the request; a rejected job stays `Created`.
    pub fn dispatch<S: SdoStack + ?Sized>(&mut self, stack: &mut S) -> Result<(), DispatchError> {
        if self.state != JobState::Created {
            return Err(DispatchError::AlreadyDispatched(self.id));
        }
        if let Err(e) = stack.dispatch(&self.request()) {
            warn!(
                "SDO {} job {} to node {} ({:#06X}/{:#04X}) rejected: {}",
                self.direction, self.id, self.target, self.index, self.sub_index, e
            );
            return Err(e);
        }
        info!(
            "SDO {} job {} dispatched to node {} ({:#06X}/{:#04X}) via {}.",
            self.direction, self.id, self.target, self.index, self.sub_index, self.transport
        );
        self.state = JobState::Dispatched;
        Ok(())
    }

    /// Marks the job completed by `result`. The result must carry this
    /// job's id and the job must be awaiting one.
    pub fn complete(&mut self, result: &SdoTransferResult) -> Result<(), JobStateError> {
        if result.job_id() != self.id {
            return Err(JobStateError::JobMismatch {
                expected: self.id,
                actual: result.job_id(),
            });
        }
        if self.state != JobState::Dispatched {
            return Err(JobStateError::NotDispatched(self.id));
        }
        self.state = JobState::Completed;
        Ok(())
    }
}
