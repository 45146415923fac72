//! ### EVENT - Sensor events (`0x10`, 1 byte, Read-only)
//!
//! **Note:** The EVENT register has clear-on-read semantics.
//!
//! ### Examples
//! ```rust,no_run
//! # use bmp384_rs::{Bmp384, Bmp384Result};
//! # use bmp384_rs::bus::Bus;
//! # async fn demo<B: Bus>(mut device: Bmp384<B>)
//! #     -> Bmp384Result<(), B::Error> {
//! use bmp384_rs::register::event::Event;
//!
//! // Did the device go through a power-up or soft reset since the last check?
//! let event = device.read::<Event>().await?;
//! if event.por_detected {
//!     println!("device was reset");
//! }
//!
//! # Ok(()) }
//! ```
use crate::register::{InvalidRegisterField, Readable, Reg};

/// Marker type for the EVENT (0x10) register
///
/// - **Length:** 1 byte
/// - **Access:** Read-only
pub struct Event;
impl Reg for Event { const ADDR: u8 = 0x10; }

/// The payload for the EVENT (0x10) register.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EventFlags {
    /// Set after device power-up or after a soft reset.
    ///
    /// This value is cleared on **register** read.
    pub por_detected: bool,
}

impl Readable for Event {
    type Out = EventFlags;

    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(EventFlags {
            por_detected: (b[0] & 0b01) != 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_decode() {
        assert!(Event::decode(&[0b01]).unwrap().por_detected);
        assert!(!Event::decode(&[0b10]).unwrap().por_detected);
    }
}
