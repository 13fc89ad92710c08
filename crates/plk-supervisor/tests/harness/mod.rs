// crates/plk-supervisor/tests/harness/mod.rs
//! A scripted POWERLINK network for driving the SDO controller end to end.
//!
//! Requests are queued by `SimulatedStack::dispatch` and only answered when
//! the test calls `SimulatedNetwork::process`, which makes the asynchronous
//! delivery explicit.
#![allow(dead_code)]

use plk_supervisor::{
    DispatchError, NodeId, SdoRequest, SdoStack, SdoTransferResult, TransferDirection,
};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::rc::Rc;

pub const ABORT_OBJECT_DOES_NOT_EXIST: u32 = 0x0602_0000;
pub const ABORT_SUB_INDEX_DOES_NOT_EXIST: u32 = 0x0609_0011;
pub const ABORT_READ_ONLY: u32 = 0x0601_0002;

/// One object dictionary entry of a simulated node.
#[derive(Debug, Clone)]
pub struct Entry {
    pub data: Vec<u8>,
    pub writable: bool,
}

/// A remote node with a minimal object dictionary.
#[derive(Debug, Default)]
pub struct SimulatedNode {
    pub od: BTreeMap<(u16, u8), Entry>,
}

impl SimulatedNode {
    pub fn with(mut self, index: u16, sub_index: u8, data: &[u8], writable: bool) -> Self {
        self.od.insert(
            (index, sub_index),
            Entry {
                data: data.to_vec(),
                writable,
            },
        );
        self
    }

    fn serve(&mut self, request: &QueuedRequest) -> SdoTransferResult {
        if !self.od.keys().any(|(idx, _)| *idx == request.index) {
            return SdoTransferResult::aborted(request.job_id, ABORT_OBJECT_DOES_NOT_EXIST);
        }
        let Some(entry) = self.od.get_mut(&(request.index, request.sub_index)) else {
            return SdoTransferResult::aborted(request.job_id, ABORT_SUB_INDEX_DOES_NOT_EXIST);
        };
        match (&request.direction, &request.payload) {
            (TransferDirection::Read, _) => {
                SdoTransferResult::read_ok(request.job_id, entry.data.clone())
            }
            (TransferDirection::Write, _) if !entry.writable => {
                SdoTransferResult::aborted(request.job_id, ABORT_READ_ONLY)
            }
            (TransferDirection::Write, payload) => {
                entry.data = payload.clone().unwrap_or_default();
                SdoTransferResult::write_ok(request.job_id)
            }
        }
    }
}

/// Owned copy of an `SdoRequest` waiting in the network.
#[derive(Debug, Clone)]
pub struct QueuedRequest {
    pub job_id: plk_supervisor::JobId,
    pub target: NodeId,
    pub index: u16,
    pub sub_index: u8,
    pub direction: TransferDirection,
    pub payload: Option<Vec<u8>>,
}

#[derive(Debug, Default)]
pub struct SimulatedNetwork {
    pub nodes: HashMap<u8, SimulatedNode>,
    pub pending: VecDeque<QueuedRequest>,
    /// Every request ever accepted, for assertions.
    pub history: Vec<QueuedRequest>,
    pub running: bool,
}

impl SimulatedNetwork {
    pub fn new() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self {
            running: true,
            ..Default::default()
        }))
    }

    pub fn add_node(&mut self, node_id: u8, node: SimulatedNode) {
        self.nodes.insert(node_id, node);
    }

    /// Answers every queued request, in dispatch order.
    pub fn process(&mut self) -> Vec<SdoTransferResult> {
        let mut results = Vec::new();
        while let Some(request) = self.pending.pop_front() {
            // dispatch only queues requests for known nodes
            if let Some(node) = self.nodes.get_mut(&request.target.0) {
                results.push(node.serve(&request));
            }
        }
        results
    }
}

/// The stack as seen by the controller: a handle on the shared network.
pub struct SimulatedStack {
    pub network: Rc<RefCell<SimulatedNetwork>>,
}

impl SdoStack for SimulatedStack {
    fn dispatch(&mut self, request: &SdoRequest<'_>) -> Result<(), DispatchError> {
        let mut network = self.network.borrow_mut();
        if !network.running {
            return Err(DispatchError::StackNotRunning);
        }
        if !network.nodes.contains_key(&request.target.0) {
            return Err(DispatchError::UnknownNode(request.target.0));
        }
        let queued = QueuedRequest {
            job_id: request.job_id,
            target: request.target,
            index: request.index,
            sub_index: request.sub_index,
            direction: request.direction,
            payload: request.payload.map(<[u8]>::to_vec),
        };
        network.history.push(queued.clone());
        network.pending.push_back(queued);
        Ok(())
    }

    fn configured_node_ids(&self) -> Vec<NodeId> {
        self.network.borrow().nodes.keys().map(|&id| NodeId(id)).collect()
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
