//! Interface seams for the hardware collaborators.
//!
//! The driver never talks to registers or pins directly: it issues
//! asynchronous exchanges through [`SpiBus`], toggles the select line
//! through [`ChipSelect`], and receives each result exactly once through
//! [`TransferComplete`]. Completion may be delivered from interrupt
//! context, which is why every method here takes `&self`.

use alloc::sync::Arc;

use embedded_hal::spi::Mode;

use crate::error::BusError;

/// Length in bytes of one SSI exchange (24-bit frame).
pub const FRAME_LEN: usize = 3;

/// Completion target for one asynchronous bus transfer.
///
/// The transport invokes [`TransferComplete::transfer_done`] exactly once
/// per accepted [`SpiBus::read_write`] call, either synchronously from
/// within that call or later from its own completion context. `in_isr`
/// tells the target whether it is running in interrupt context.
pub trait TransferComplete: Send + Sync {
    /// Deliver the outcome of a transfer: the received bytes, or the
    /// transport's failure status.
    fn transfer_done(&self, in_isr: bool, outcome: Result<[u8; FRAME_LEN], BusError>);
}

/// Asynchronous request/response serial bus.
///
/// Implementations own their receive buffer and hand the received bytes
/// back through the completion target, so no borrow has to survive the
/// issuing call.
pub trait SpiBus: Send + Sync {
    /// Configure clock polarity and phase.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus cannot be put into the requested mode.
    fn set_mode(&self, mode: Mode) -> Result<(), BusError>;

    /// Issue one full-duplex exchange of [`FRAME_LEN`] bytes.
    ///
    /// On `Ok(())` the transport has accepted the request and will invoke
    /// `done` exactly once. On `Err` the request was never started and
    /// `done` will not be invoked.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport rejects the request.
    fn read_write(
        &self,
        tx: [u8; FRAME_LEN],
        done: Arc<dyn TransferComplete>,
        in_isr: bool,
    ) -> Result<(), BusError>;
}

/// Chip-select line for the sensor.
pub trait ChipSelect: Send + Sync {
    /// Drive the select line: `true` selects the device, `false` releases it.
    fn set_active(&self, active: bool);
}
