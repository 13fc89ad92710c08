// crates/plk-supervisor/src/sdo/result.rs
use super::JobId;
use alloc::vec::Vec;

/// Terminal outcome of a dispatched job, as reported by the stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    /// Read confirmed; carries the raw, little-endian object data.
    Read(Vec<u8>),
    /// Write confirmed.
    Written,
    /// The transfer was aborted with this SDO abort code.
    Aborted(u32),
}

impl TransferOutcome {
    /// Short name of the confirmation kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            TransferOutcome::Read(_) => "Read",
            TransferOutcome::Written => "Write",
            TransferOutcome::Aborted(_) => "Abort",
        }
    }
}

/// Immutable result of one SDO job. Built once by the stack side and
/// consumed once by the completion handler.
///
/// The raw data of a read is decoded with the data type of the job it
/// answers, which the receiver looks up through `job_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdoTransferResult {
    job_id: JobId,
    outcome: TransferOutcome,
}

impl SdoTransferResult {
    pub fn read_ok(job_id: JobId, data: Vec<u8>) -> Self {
        Self {
            job_id,
            outcome: TransferOutcome::Read(data),
        }
    }

    pub fn write_ok(job_id: JobId) -> Self {
        Self {
            job_id,
            outcome: TransferOutcome::Written,
        }
    }

    pub fn aborted(job_id: JobId, abort_code: u32) -> Self {
        Self {
            job_id,
            outcome: TransferOutcome::Aborted(abort_code),
        }
    }

    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    pub fn outcome(&self) -> &TransferOutcome {
        &self.outcome
    }

    pub fn success(&self) -> bool {
        !matches!(self.outcome, TransferOutcome::Aborted(_))
    }

    /// Raw data, present only for a successful read.
    pub fn value(&self) -> Option<&[u8]> {
        match &self.outcome {
            TransferOutcome::Read(data) => Some(data),
            _ => None,
        }
    }

    /// Abort code, present only if the transfer failed.
    pub fn abort_code(&self) -> Option<u32> {
        match self.outcome {
            TransferOutcome::Aborted(code) => Some(code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_accessors_follow_outcome() {
        let read = SdoTransferResult::read_ok(JobId(1), vec![4, 0, 0, 0]);
        assert!(read.success());
        assert_eq!(read.value(), Some(&[4, 0, 0, 0][..]));
        assert_eq!(read.abort_code(), None);

        let written = SdoTransferResult::write_ok(JobId(2));
        assert!(written.success());
        assert_eq!(written.value(), None);

        let aborted = SdoTransferResult::aborted(JobId(3), 0x0609_0030);
        assert!(!aborted.success());
        assert_eq!(aborted.value(), None);
        assert_eq!(aborted.abort_code(), Some(0x0609_0030));
        assert_eq!(aborted.job_id(), JobId(3));
        assert_eq!(aborted.outcome().kind(), "Abort");
        assert_eq!(written.outcome().kind(), "Write");
    }
}
