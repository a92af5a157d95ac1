//! Error and fault types for the MT6701 pipeline.

/// Status code reported by the bus transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum BusError {
    /// The transport rejected the request
    Rejected,
    /// The transfer started but did not complete successfully
    Failed,
    /// The transfer did not complete in time
    Timeout,
}

/// Construction-time fault. No driver instance exists if this is returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitError {
    /// The bus could not be configured to the required polarity/phase
    BusConfig(BusError),
}

/// Unrecoverable pipeline fault.
///
/// Either variant force-stops polling; the pipeline does not retry on its
/// own and must be restarted with an explicit [`Mt6701::start`] call.
///
/// [`Mt6701::start`]: crate::Mt6701::start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fault {
    /// The bus rejected a transfer request at issue time
    TransferStart(BusError),
    /// The bus reported a failed transfer at completion time
    TransferFailed(BusError),
}

/// Sink for unrecoverable faults.
///
/// `in_isr` flags whether the fault was raised from interrupt context so
/// the handler can pick an appropriate reaction (latch a flag, pend a
/// task) instead of doing anything blocking.
pub trait FaultHandler: Send + Sync {
    /// Report a fault. Must not block.
    fn fault(&self, fault: Fault, in_isr: bool);
}
