#![no_std]
#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]

extern crate alloc;

#[cfg(test)]
extern crate std;

mod bus;
mod cache;
mod crc6;
mod diagnostics;
mod driver;
mod error;
mod frame;

pub use bus::{ChipSelect, FRAME_LEN, SpiBus, TransferComplete};
pub use cache::Sample;
pub use crc6::{Crc6, Crc6Mt6701};
pub use diagnostics::Diagnostics;
pub use driver::{ANGLE_RESOLUTION, Mt6701};
pub use error::{BusError, Fault, FaultHandler, InitError};
