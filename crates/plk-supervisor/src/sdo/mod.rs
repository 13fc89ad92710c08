// crates/plk-supervisor/src/sdo/mod.rs
//! Ad-hoc SDO transfers: the job handshake with the stack, the results it
//! delivers and the controller that drives them for the operator.

pub mod abort;
pub mod controller;
pub mod job;
pub mod result;

pub use abort::{SdoAbortCode, abort_code_description};
pub use controller::{SdoTransferController, TransferStatus};
pub use job::{JobId, JobState, SdoTransferJob, SdoTransport, TransferDirection};
pub use result::{SdoTransferResult, TransferOutcome};
