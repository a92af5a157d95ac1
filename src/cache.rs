//! Lock-free cache for the most recent decoded sample.
//!
//! Single writer (the transfer completion handler, possibly in interrupt
//! context), any number of readers. A seqlock stands in for a mutex: the
//! writer brackets its update with generation-counter increments and a
//! reader retries until it sees a stable even generation, so no side ever
//! blocks.

use core::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};

use crate::diagnostics::Diagnostics;

/// One validated angle reading.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sample {
    /// Shaft angle in radians, in `[0, 2π)`
    pub angle_rad: f32,
    /// Diagnostic flags reported with this reading
    pub diagnostics: Diagnostics,
}

/// Seqlock slot holding the latest [`Sample`].
///
/// The fields are individually atomic so the torn-window detection is the
/// generation protocol alone, with no undefined behavior to lean on.
pub(crate) struct SampleCache {
    /// Odd while a write is in progress
    generation: AtomicU32,
    /// Set on the first publish, never cleared
    valid: AtomicBool,
    angle_bits: AtomicU32,
    diag: AtomicU8,
}

impl SampleCache {
    pub(crate) const fn new() -> Self {
        Self {
            generation: AtomicU32::new(0),
            valid: AtomicBool::new(false),
            angle_bits: AtomicU32::new(0),
            diag: AtomicU8::new(0),
        }
    }

    /// Publish a new sample, superseding the previous one.
    ///
    /// Writer side of the seqlock: must never run concurrently with
    /// itself. The driver guarantees that by only calling this from the
    /// completion handler of the single in-flight transfer.
    pub(crate) fn publish(&self, sample: Sample) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        // release on the field stores: a reader whose acquire load sees a
        // new field value then also sees the odd generation above it, so
        // the trailing generation check forces a retry instead of mixing
        // fields from two publishes
        self.angle_bits
            .store(sample.angle_rad.to_bits(), Ordering::Release);
        self.diag
            .store(sample.diagnostics.raw(), Ordering::Release);
        self.generation.fetch_add(1, Ordering::Release);
        self.valid.store(true, Ordering::Release);
    }

    /// Read the latest sample, or `None` if nothing was ever published.
    ///
    /// Retries while a write is in flight; the writer's critical section
    /// is two field stores, so the loop is short in practice.
    pub(crate) fn read(&self) -> Option<Sample> {
        if !self.valid.load(Ordering::Acquire) {
            return None;
        }

        loop {
            let begin = self.generation.load(Ordering::Acquire);
            if begin & 1 != 0 {
                core::hint::spin_loop();
                continue;
            }
            // acquire loads keep the field reads from drifting past the
            // trailing generation check
            let angle_bits = self.angle_bits.load(Ordering::Acquire);
            let diag = self.diag.load(Ordering::Acquire);
            let end = self.generation.load(Ordering::Relaxed);
            if begin == end {
                return Some(Sample {
                    angle_rad: f32::from_bits(angle_bits),
                    diagnostics: Diagnostics::new(diag),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;
    use std::vec::Vec;

    use super::*;

    #[test]
    fn empty_until_first_publish() {
        let cache = SampleCache::new();
        assert_eq!(cache.read(), None);
    }

    #[test]
    fn read_returns_the_last_published_sample() {
        let cache = SampleCache::new();
        for raw in [0u16, 1, 8192, 16383] {
            let sample = Sample {
                angle_rad: f32::from(raw) * 0.001,
                diagnostics: Diagnostics::new((raw & 0x0F) as u8),
            };
            cache.publish(sample);
            assert_eq!(cache.read(), Some(sample));
        }
    }

    /// Angle and diagnostics are written as a correlated pair; a torn read
    /// would surface as a pair that no single publish ever produced.
    #[test]
    fn concurrent_readers_never_observe_a_torn_sample() {
        const WRITES: u32 = 50_000;
        const READERS: usize = 4;

        let cache = Arc::new(SampleCache::new());

        let readers: Vec<_> = (0..READERS)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    loop {
                        let Some(sample) = cache.read() else { continue };
                        // steps fit in f32's integer range, the cast is exact
                        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                        let step = sample.angle_rad as u32;
                        assert_eq!(
                            sample.diagnostics.raw(),
                            (step & 0x0F) as u8,
                            "torn sample: angle from step {step} paired with wrong diagnostics"
                        );
                        if step == WRITES {
                            break;
                        }
                    }
                })
            })
            .collect();

        for step in 1..=WRITES {
            #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
            cache.publish(Sample {
                angle_rad: step as f32,
                diagnostics: Diagnostics::new((step & 0x0F) as u8),
            });
        }

        for reader in readers {
            reader.join().unwrap();
        }
    }
}
