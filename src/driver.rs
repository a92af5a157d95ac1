//! Self-retriggering polling driver for the MT6701 sensor.

use alloc::sync::{Arc, Weak};
use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::spi::MODE_2;

use crate::bus::{ChipSelect, FRAME_LEN, SpiBus, TransferComplete};
use crate::cache::{Sample, SampleCache};
use crate::crc6::Crc6;
use crate::diagnostics::Diagnostics;
use crate::error::{BusError, Fault, FaultHandler, InitError};
use crate::frame;

pub use crate::frame::ANGLE_RESOLUTION;

/// The protocol is read-only, the transmit side just clocks out zeros.
const TX_FRAME: [u8; FRAME_LEN] = [0; FRAME_LEN];

/// MT6701 driver instance.
///
/// Keeps exactly one SSI transfer in flight and re-arms the next one from
/// each transfer's completion handler, so the sensor is sampled back to
/// back without a timer. Readers on any thread get the latest validated
/// angle through the lock-free sample cache; nothing here ever blocks,
/// including on the completion path, which may run in interrupt context.
///
/// Construction configures the bus and starts polling immediately. A bus
/// fault at any later point stops the pipeline for good (see [`Fault`]);
/// sporadic CRC rejections do not, they just drop the affected frame.
pub struct Mt6701<S, G, C> {
    spi: S,
    cs: G,
    crc: C,
    faults: Arc<dyn FaultHandler>,
    cache: SampleCache,
    running: AtomicBool,
    transfer_pending: AtomicBool,
    /// Handed to the transport as the completion target of each transfer
    me: Weak<Self>,
}

impl<S, G, C> Mt6701<S, G, C>
where
    S: SpiBus + 'static,
    G: ChipSelect + 'static,
    C: Crc6 + 'static,
{
    /// Create a driver and begin polling.
    ///
    /// Deasserts the select line, puts the bus into mode 2 (clock idles
    /// high, capture on the first edge) and arms the first transfer. The
    /// caller resolves and supplies the hardware handles; the driver owns
    /// them for its lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`InitError::BusConfig`] if the bus rejects the required
    /// mode. No instance exists in that case.
    pub fn new(
        spi: S,
        cs: G,
        crc: C,
        faults: Arc<dyn FaultHandler>,
    ) -> Result<Arc<Self>, InitError> {
        cs.set_active(false);
        spi.set_mode(MODE_2).map_err(InitError::BusConfig)?;

        let driver = Arc::new_cyclic(|me| Self {
            spi,
            cs,
            crc,
            faults,
            cache: SampleCache::new(),
            running: AtomicBool::new(false),
            transfer_pending: AtomicBool::new(false),
            me: me.clone(),
        });
        driver.start();
        Ok(driver)
    }

    /// Start polling. A no-op if the pipeline is already running.
    pub fn start(&self) {
        let was_running = self.running.swap(true, Ordering::AcqRel);
        if !was_running {
            #[cfg(feature = "defmt")]
            defmt::debug!("mt6701: polling started");
            self.try_start_transfer(false);
        }
    }

    /// Stop polling cooperatively.
    ///
    /// An already-outstanding transfer still completes; its handler sees
    /// the cleared flag and does not re-arm. "Stopped" therefore means
    /// "will not start new transfers", not "already quiesced" — poll
    /// [`Self::is_transfer_pending`] if quiescence is needed.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
        #[cfg(feature = "defmt")]
        defmt::debug!("mt6701: polling stopped");
    }

    /// Whether the pipeline is meant to keep running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Whether a transfer is currently outstanding on the bus.
    #[must_use]
    pub fn is_transfer_pending(&self) -> bool {
        self.transfer_pending.load(Ordering::Acquire)
    }

    /// Latest validated sample, or `None` before the first one arrives.
    #[must_use]
    pub fn sample(&self) -> Option<Sample> {
        self.cache.read()
    }

    /// Latest angle in radians, `[0, 2π)`. Defaults to 0.0 before the
    /// first sample.
    #[must_use]
    pub fn angle_rad(&self) -> f32 {
        self.sample().unwrap_or_default().angle_rad
    }

    /// Latest diagnostic flags. All-clear before the first sample.
    #[must_use]
    pub fn diagnostics(&self) -> Diagnostics {
        self.sample().unwrap_or_default().diagnostics
    }

    /// Raw 4-bit diagnostic nibble of the latest sample.
    #[must_use]
    pub fn raw_diagnostics(&self) -> u8 {
        self.diagnostics().raw()
    }

    /// Whether the latest sample flagged overspeed.
    #[must_use]
    pub fn is_overspeed(&self) -> bool {
        self.diagnostics().overspeed()
    }

    /// Whether the latest sample flagged a push on the magnet.
    #[must_use]
    pub fn is_push_detected(&self) -> bool {
        self.diagnostics().push_detected()
    }

    /// Whether the latest sample reported a too-strong magnetic field.
    #[must_use]
    pub fn is_field_too_strong(&self) -> bool {
        self.diagnostics().field_too_strong()
    }

    /// Whether the latest sample reported a too-weak magnetic field.
    #[must_use]
    pub fn is_field_too_weak(&self) -> bool {
        self.diagnostics().field_too_weak()
    }

    /// 2-bit magnetic field strength code of the latest sample.
    #[must_use]
    pub fn magnet_strength(&self) -> u8 {
        self.diagnostics().field_strength()
    }

    /// Periodic health hook for a supervising loop.
    ///
    /// Intentionally empty: faults are reported eagerly through the
    /// [`FaultHandler`], there is nothing to poll for here.
    pub fn on_monitor(&self) {}

    /// Claim the transfer-pending slot and issue the next exchange.
    ///
    /// The compare-and-swap is what keeps at most one transfer on the bus:
    /// losing it means a transfer is already outstanding and its
    /// completion will re-arm, so the loser just returns.
    fn try_start_transfer(&self, in_isr: bool) {
        if !self.running.load(Ordering::Acquire) {
            return;
        }
        if self
            .transfer_pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        // Upgrade only fails mid-teardown, when no completion can be
        // delivered anyway.
        let Some(me) = self.me.upgrade() else {
            self.transfer_pending.store(false, Ordering::Release);
            return;
        };

        self.cs.set_active(true);
        if let Err(err) = self.spi.read_write(TX_FRAME, me, in_isr) {
            self.cs.set_active(false);
            self.transfer_pending.store(false, Ordering::Release);
            self.running.store(false, Ordering::Release);
            #[cfg(feature = "defmt")]
            defmt::error!("mt6701: transfer rejected, polling halted");
            self.faults.fault(Fault::TransferStart(err), in_isr);
        }
    }
}

impl<S, G, C> TransferComplete for Mt6701<S, G, C>
where
    S: SpiBus + 'static,
    G: ChipSelect + 'static,
    C: Crc6 + 'static,
{
    fn transfer_done(&self, in_isr: bool, outcome: Result<[u8; FRAME_LEN], BusError>) {
        // The select line is released on every completion path, success or
        // failure.
        self.cs.set_active(false);

        let bytes = match outcome {
            Ok(bytes) => bytes,
            Err(err) => {
                self.transfer_pending.store(false, Ordering::Release);
                self.running.store(false, Ordering::Release);
                #[cfg(feature = "defmt")]
                defmt::error!("mt6701: transfer failed, polling halted");
                self.faults.fault(Fault::TransferFailed(err), in_isr);
                return;
            }
        };

        if let Some(sample) = frame::decode(&self.crc, frame::frame_from_bytes(bytes)) {
            self.cache.publish(sample);
        } else {
            // Checksum mismatch: drop this frame, the previous cached
            // sample stays authoritative and polling continues.
            #[cfg(feature = "defmt")]
            defmt::trace!("mt6701: frame rejected by crc");
        }

        self.transfer_pending.store(false, Ordering::Release);

        if self.running.load(Ordering::Acquire) {
            self.try_start_transfer(in_isr);
        }
    }
}
