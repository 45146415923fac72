//! ### FIFO_LENGTH - FIFO fill level in bytes (`0x12`, 2 byte, Read-only)
//!
//! A 9-bit byte count split over `FIFO_LENGTH_0` and `FIFO_LENGTH_1`. The marker [`FifoLength`]
//! reads both registers in one burst.
//!
//! The count is in *bytes*, not frames. The FIFO holds 512 bytes.
//!
//! See also: [`Bmp384::fifo_length()`](crate::Bmp384::fifo_length())
use crate::register::{InvalidRegisterField, Readable, Reg};

/// Marker type for FIFO_LENGTH_0 / FIFO_LENGTH_1 (0x12-0x13) registers.
///
/// - **Length:** 2 byte
/// - **Access:** Read-only
pub struct FifoLength;
impl Reg for FifoLength { const ADDR: u8 = 0x12; }

impl Readable for FifoLength {
    type Out = u16;

    const N: usize = 2;

    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(u16::from_le_bytes([b[0], b[1] & 0b0000_0001]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_length_decode() {
        assert_eq!(511, FifoLength::decode(&[0xFF, 0x01]).unwrap());
        assert_eq!(0x1C, FifoLength::decode(&[0x1C, 0xFE]).unwrap());
    }
}
