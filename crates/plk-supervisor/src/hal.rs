// crates/plk-supervisor/src/hal.rs
use crate::error::DispatchError;
use crate::pi::ProcessImage;
use crate::sdo::{JobId, SdoTransferResult, SdoTransport, TransferDirection};
use crate::types::NodeId;
use alloc::vec::Vec;

/// A single SDO request as handed to the stack.
///
/// The stack must echo `job_id` in the [`SdoTransferResult`] it delivers for
/// this request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SdoRequest<'a> {
    pub job_id: JobId,
    pub target: NodeId,
    pub index: u16,
    pub sub_index: u8,
    pub direction: TransferDirection,
    pub transport: SdoTransport,
    /// Encoded value, only present for writes.
    pub payload: Option<&'a [u8]>,
}

/// Narrow abstraction of the POWERLINK stack as seen by the supervisor.
///
/// This keeps the transfer logic independent of how the stack moves frames,
/// so it can be driven by a real stack binding or by a simulated one.
pub trait SdoStack {
    /// Hands one SDO request to the stack.
    ///
    /// Returns immediately. `Ok` means the stack accepted the request and
    /// will deliver exactly one terminal result for it later, through
    /// whatever completion path the integration registered. `Err` means
    /// nothing was sent and no result will follow.
    fn dispatch(&mut self, request: &SdoRequest<'_>) -> Result<(), DispatchError>;

    /// Returns the node ids currently known to the network configuration,
    /// in no particular order.
    fn configured_node_ids(&self) -> Vec<NodeId>;
}

/// The completion capability registered with the stack. The stack (or the
/// layer marshaling its notifications) calls it once per dispatched job,
/// always on the thread that owns the implementor.
pub trait SdoTransferCompletion {
    fn transfer_finished(&mut self, result: SdoTransferResult);
}

/// Exchanges process image buffers with the stack once per DataSync cycle:
/// outputs are handed over, inputs are refreshed.
pub trait ProcessImageExchange {
    fn exchange(&mut self, image: &mut ProcessImage) -> Result<(), DispatchError>;
}
