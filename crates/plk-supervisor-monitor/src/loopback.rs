// crates/plk-supervisor-monitor/src/loopback.rs
//! An in-process stand-in for the POWERLINK stack.
//!
//! SDO requests are served from small object dictionaries on a worker
//! thread and answered through a [`CompletionSender`], just as a real stack
//! answers from its own I/O thread. The process image exchange wires every
//! output byte back to the input byte at the same offset.

use crate::completion::CompletionSender;
use crossbeam_channel::Sender;
use log::{debug, error, info, warn};
use plk_supervisor::sdo::{JobId, SdoTransport, TransferDirection};
use plk_supervisor::{
    DispatchError, Direction, NodeId, ProcessImage, ProcessImageExchange, SdoRequest, SdoStack,
    SdoTransferResult,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

pub const ABORT_READ_ONLY: u32 = 0x0601_0002;
pub const ABORT_OBJECT_DOES_NOT_EXIST: u32 = 0x0602_0000;
pub const ABORT_LENGTH_MISMATCH: u32 = 0x0607_0010;
pub const ABORT_SUB_INDEX_DOES_NOT_EXIST: u32 = 0x0609_0011;

/// Vendor id reported in 0x1018/0x01 by every loopback node.
pub const LOOPBACK_VENDOR_ID: u32 = 0x0000_0004;

#[derive(Debug, Clone)]
struct ObjectEntry {
    data: Vec<u8>,
    writable: bool,
}

type ObjectDictionary = BTreeMap<(u16, u8), ObjectEntry>;

fn insert(od: &mut ObjectDictionary, index: u16, sub_index: u8, data: &[u8], writable: bool) {
    od.insert(
        (index, sub_index),
        ObjectEntry {
            data: data.to_vec(),
            writable,
        },
    );
}

/// Identity and communication objects every node carries.
fn base_od(node_id: NodeId, device_type: u32) -> ObjectDictionary {
    let mut od = ObjectDictionary::new();
    insert(&mut od, 0x1000, 0x00, &device_type.to_le_bytes(), false);
    insert(&mut od, 0x1018, 0x00, &[4], false);
    insert(&mut od, 0x1018, 0x01, &LOOPBACK_VENDOR_ID.to_le_bytes(), false);
    insert(&mut od, 0x1018, 0x02, &u32::from(node_id.0).to_le_bytes(), false);
    insert(&mut od, 0x1018, 0x03, &0x0001_0000u32.to_le_bytes(), false);
    insert(&mut od, 0x1018, 0x04, &0u32.to_le_bytes(), false);
    od
}

fn mn_od(node_id: NodeId, sync_period: Duration) -> ObjectDictionary {
    let mut od = base_od(node_id, 0x0000_0000);
    let cycle_us = u32::try_from(sync_period.as_micros()).unwrap_or(u32::MAX);
    // NMT_CycleLen_U32
    insert(&mut od, 0x1006, 0x00, &cycle_us.to_le_bytes(), true);
    od
}

fn cn_od(node_id: NodeId) -> ObjectDictionary {
    // Device profile 401, generic I/O module.
    let mut od = base_od(node_id, 0x000F_0191);
    insert(&mut od, 0x2000, 0x00, &0u32.to_le_bytes(), true);
    insert(&mut od, 0x6000, 0x00, &[1], false);
    insert(&mut od, 0x6000, 0x01, &[0], false);
    insert(&mut od, 0x6200, 0x00, &[1], false);
    insert(&mut od, 0x6200, 0x01, &[0], true);
    od
}

/// Owned copy of a request, handed to the worker thread.
#[derive(Debug)]
struct QueuedRequest {
    job_id: JobId,
    target: NodeId,
    index: u16,
    sub_index: u8,
    direction: TransferDirection,
    transport: SdoTransport,
    payload: Option<Vec<u8>>,
}

#[derive(Debug)]
struct LoopbackNetwork {
    running: bool,
    nodes: BTreeMap<u8, ObjectDictionary>,
}

impl LoopbackNetwork {
    fn serve(&mut self, request: &QueuedRequest) -> SdoTransferResult {
        let job_id = request.job_id;
        let Some(od) = self.nodes.get_mut(&request.target.0) else {
            // The node was checked on dispatch.
            return SdoTransferResult::aborted(job_id, ABORT_OBJECT_DOES_NOT_EXIST);
        };
        if !od.keys().any(|(index, _)| *index == request.index) {
            return SdoTransferResult::aborted(job_id, ABORT_OBJECT_DOES_NOT_EXIST);
        }
        let Some(entry) = od.get_mut(&(request.index, request.sub_index)) else {
            return SdoTransferResult::aborted(job_id, ABORT_SUB_INDEX_DOES_NOT_EXIST);
        };
        match request.direction {
            TransferDirection::Read => SdoTransferResult::read_ok(job_id, entry.data.clone()),
            TransferDirection::Write => {
                let payload = request.payload.as_deref().unwrap_or_default();
                if !entry.writable {
                    SdoTransferResult::aborted(job_id, ABORT_READ_ONLY)
                } else if payload.len() != entry.data.len() {
                    SdoTransferResult::aborted(job_id, ABORT_LENGTH_MISMATCH)
                } else {
                    entry.data.copy_from_slice(payload);
                    SdoTransferResult::write_ok(job_id)
                }
            }
        }
    }
}

/// Cloneable handle on the loopback network. One clone usually drives SDO
/// transfers, another the DataSync loop.
#[derive(Clone, Debug)]
pub struct LoopbackStack {
    network: Arc<Mutex<LoopbackNetwork>>,
    requests: Sender<QueuedRequest>,
}

impl LoopbackStack {
    /// Builds the network and starts the worker thread that answers SDO
    /// requests. The worker exits once every handle is dropped.
    pub fn start(
        local_node_id: NodeId,
        remote_nodes: &[NodeId],
        sync_period: Duration,
        completions: CompletionSender,
    ) -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(local_node_id.0, mn_od(local_node_id, sync_period));
        for node in remote_nodes {
            if *node == local_node_id {
                warn!("Node {} is the local node, not simulating it as a CN.", node);
                continue;
            }
            nodes.insert(node.0, cn_od(*node));
        }
        info!(
            "Loopback stack up: local node {}, remote nodes {:?}.",
            local_node_id,
            remote_nodes.iter().map(|n| n.0).collect::<Vec<_>>()
        );
        let network = Arc::new(Mutex::new(LoopbackNetwork {
            running: true,
            nodes,
        }));

        let (requests, inbox) = crossbeam_channel::unbounded::<QueuedRequest>();
        let worker_network = Arc::clone(&network);
        let spawned = thread::Builder::new()
            .name("plk-loopback-sdo".into())
            .spawn(move || {
                for request in inbox.iter() {
                    let result = worker_network
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .serve(&request);
                    debug!(
                        "Loopback answered job {} via {}: {:?}",
                        request.job_id,
                        request.transport,
                        result.outcome()
                    );
                    if !completions.send(result) {
                        break;
                    }
                }
            });
        if let Err(e) = spawned {
            error!("Failed to start the loopback SDO worker: {}", e);
            lock(&network).running = false;
        }

        Self { network, requests }
    }

    /// Simulates the stack being stopped or started.
    pub fn set_running(&self, running: bool) {
        lock(&self.network).running = running;
    }
}

fn lock(network: &Mutex<LoopbackNetwork>) -> MutexGuard<'_, LoopbackNetwork> {
    network.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SdoStack for LoopbackStack {
    fn dispatch(&mut self, request: &SdoRequest<'_>) -> Result<(), DispatchError> {
        {
            let network = lock(&self.network);
            if !network.running {
                return Err(DispatchError::StackNotRunning);
            }
            if !network.nodes.contains_key(&request.target.0) {
                return Err(DispatchError::UnknownNode(request.target.0));
            }
        }
        if request.direction == TransferDirection::Write && request.payload.is_none() {
            return Err(DispatchError::Rejected("write request without payload".into()));
        }
        let queued = QueuedRequest {
            job_id: request.job_id,
            target: request.target,
            index: request.index,
            sub_index: request.sub_index,
            direction: request.direction,
            transport: request.transport,
            payload: request.payload.map(<[u8]>::to_vec),
        };
        self.requests.send(queued).map_err(|_| {
            warn!("Loopback SDO worker is gone.");
            DispatchError::StackNotRunning
        })
    }

    fn configured_node_ids(&self) -> Vec<NodeId> {
        lock(&self.network).nodes.keys().map(|&id| NodeId(id)).collect()
    }
}

impl ProcessImageExchange for LoopbackStack {
    fn exchange(&mut self, image: &mut ProcessImage) -> Result<(), DispatchError> {
        if !lock(&self.network).running {
            return Err(DispatchError::StackNotRunning);
        }
        let output = image.buffer(Direction::Output).to_vec();
        let input = image.buffer_mut(Direction::Input);
        let len = input.len().min(output.len());
        input[..len].copy_from_slice(&output[..len]);
        Ok(())
    }
}
