//! ### INT_CTRL - Interrupt control (`0x19`, 1 byte, R/W)
//!
//! Configures the interrupt sources, the INT pin and the `INT_STATUS` register.
//!
//! ### Default values
//! 0x02 (INT pin push-pull, active high)
//!
//! ### Examples
//! ```rust,no_run
//! # use bmp384_rs::{Bmp384, Bmp384Result};
//! # use bmp384_rs::bus::Bus;
//! # async fn demo<B: Bus>(mut device: Bmp384<B>)
//! #     -> Bmp384Result<(), B::Error> {
//! use bmp384_rs::register::int_ctrl::{IntCtrl, IntCtrlCfg};
//!
//! device.write::<IntCtrl>(&IntCtrlCfg {
//!     int_od: false,
//!     int_level: true,
//!     int_latch: false,
//!     fwtm_en: false,
//!     ffull_en: false,
//!     drdy_en: true,
//! }).await?;
//!
//! # Ok(()) }
//! ```
use crate::register::{InvalidRegisterField, Readable, Reg, Writable};

/// Marker type for INT_CTRL (0x19) register
///
/// - **Length:** 1 byte
/// - **Access:** Read/Write
pub struct IntCtrl;
impl Reg for IntCtrl { const ADDR: u8 = 0x19; }

/// The payload for the INT_CTRL (0x19) register.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IntCtrlCfg {
    /// True if the INT pin is open-drain, false for push-pull.
    pub int_od: bool,
    /// True if the INT pin is active high, false for active low.
    pub int_level: bool,
    /// Latch the INT pin and INT_STATUS until INT_STATUS is read.
    pub int_latch: bool,
    /// FIFO watermark interrupt, see [`FifoWtm`](crate::register::fifo_wtm::FifoWtm).
    pub fwtm_en: bool,
    /// FIFO full interrupt.
    pub ffull_en: bool,
    /// Data ready interrupt, asserted after every completed conversion.
    pub drdy_en: bool,
}

impl Readable for IntCtrl {
    type Out = IntCtrlCfg;

    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(IntCtrlCfg {
            int_od:     (b[0] & 0b0000_0001) != 0,
            int_level:  (b[0] & 0b0000_0010) != 0,
            int_latch:  (b[0] & 0b0000_0100) != 0,
            fwtm_en:    (b[0] & 0b0000_1000) != 0,
            ffull_en:   (b[0] & 0b0001_0000) != 0,
            drdy_en:    (b[0] & 0b0100_0000) != 0,
        })
    }
}

impl Writable for IntCtrl {
    type In = IntCtrlCfg;

    fn encode(v: &Self::In, out: &mut [u8]) {
        out[0] = (v.int_od as u8)
            | (v.int_level as u8) << 1
            | (v.int_latch as u8) << 2
            | (v.fwtm_en as u8) << 3
            | (v.ffull_en as u8) << 4
            | (v.drdy_en as u8) << 6;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: IntCtrlCfg = IntCtrlCfg {
        int_od: false,
        int_level: false,
        int_latch: false,
        fwtm_en: false,
        ffull_en: false,
        drdy_en: false,
    };

    #[test]
    fn int_ctrl_decode() {
        assert_eq!(IntCtrlCfg { int_level: true, ..NONE }, IntCtrl::decode(&[0x02]).unwrap());
        assert_eq!(IntCtrlCfg { int_od: true, int_latch: true, ..NONE }, IntCtrl::decode(&[0b0000_0101]).unwrap());
        assert_eq!(IntCtrlCfg { fwtm_en: true, ffull_en: true, ..NONE }, IntCtrl::decode(&[0b0001_1000]).unwrap());
        assert_eq!(IntCtrlCfg { drdy_en: true, ..NONE }, IntCtrl::decode(&[0b0110_0000]).unwrap());
    }

    #[test]
    fn int_ctrl_encode() {
        let mut buffer = [0u8; 1];
        IntCtrl::encode(&IntCtrlCfg { int_level: true, drdy_en: true, ..NONE }, &mut buffer);
        assert_eq!([0b0100_0010], buffer);

        IntCtrl::encode(&IntCtrlCfg { int_od: true, fwtm_en: true, ffull_en: true, ..NONE }, &mut buffer);
        assert_eq!([0b0001_1001], buffer);
    }
}
