#![cfg_attr(not(feature = "std"), no_std)]

// 'alloc' is used for channel names, SDO payloads and rendered values
extern crate alloc;

// --- Foundation Modules ---
pub mod error;
pub mod hal;
pub mod types;

// --- Process Image ---
pub mod codec;
pub mod pi;

// --- SDO Transfers ---
pub mod sdo;

// --- Top-level Exports ---
pub use codec::{IecValue, ValueRange};
pub use error::{
    ChannelError, CodecError, DispatchError, JobStateError, ProcessImageError, TransferError,
};
pub use hal::{ProcessImageExchange, SdoRequest, SdoStack, SdoTransferCompletion};
pub use pi::{Channel, ProcessImage};
pub use sdo::{
    JobId, SdoAbortCode, SdoTransferController, SdoTransferJob, SdoTransferResult, SdoTransport,
    TransferDirection, TransferStatus,
};
pub use types::{Direction, IecDataType, NodeId};
