//! ### FIFO_WTM - FIFO watermark level (`0x15`, 2 byte, R/W)
//!
//! The number of bytes the FIFO must contain before the FIFO watermark interrupt
//! ([`Interrupts::fifo_watermark()`](crate::Interrupts::fifo_watermark())) is asserted.
//!
//! The level is a 9-bit value split over `FIFO_WTM_0` and `FIFO_WTM_1`. The marker [`FifoWtm`]
//! reads and writes both registers.
//!
//! ### Default values
//! 0x01
//!
//! ### Examples
//! ```rust,no_run
//! # use bmp384_rs::{Bmp384, Bmp384Result};
//! # use bmp384_rs::bus::Bus;
//! # async fn demo<B: Bus>(mut device: Bmp384<B>)
//! #     -> Bmp384Result<(), B::Error> {
//! use bmp384_rs::Interrupts;
//!
//! // Raise the watermark interrupt once 16 pressure+temperature frames are queued.
//! device.set_fifo_watermark(16 * 7).await?;
//! device.mask_interrupts(Interrupts::new().fifo_full().data_ready()).await?;
//!
//! # Ok(()) }
//! ```
use crate::register::{InvalidRegisterField, Readable, Reg, Writable};

/// Largest watermark the 9-bit field can hold.
pub const MAX_FIFO_WATERMARK: u16 = 0x1FF;

/// Marker type for FIFO_WTM_0 / FIFO_WTM_1 (0x15-0x16) registers
///
/// - **Length:** 2 bytes
/// - **Access:** Read/Write
pub struct FifoWtm;
impl Reg for FifoWtm { const ADDR: u8 = 0x15; }

impl Readable for FifoWtm {
    type Out = u16;

    const N: usize = 2;

    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(u16::from_le_bytes([b[0], b[1] & 0b0000_0001]))
    }
}

impl Writable for FifoWtm {
    type In = u16;
    const N: usize = 2;

    fn encode(v: &Self::In, out: &mut [u8]) {
        let [lsb, msb] = (v & MAX_FIFO_WATERMARK).to_le_bytes();
        out[0] = lsb;
        out[1] = msb;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_wtm_decode() {
        assert_eq!(511, FifoWtm::decode(&[0xFF, 0x01]).unwrap());
    }

    #[test]
    fn fifo_wtm_encode() {
        let mut buffer = [0u8; 2];
        FifoWtm::encode(&0x1F3, &mut buffer);
        assert_eq!([0xF3, 0x01], buffer);

        FifoWtm::encode(&0x0070, &mut buffer);
        assert_eq!([0x70, 0x00], buffer);
    }
}
