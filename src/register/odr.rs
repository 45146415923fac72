//! ### ODR - Output data rates (`0x1D`, 1 byte, R/W)
//!
//! Selects the output data rate in normal mode as a power-of-two subdivision of the 200 Hz
//! base rate.
//!
//! ### Default values
//! 0x00 (prescaler 1, 200 Hz)
//!
//! ### Examples
//! ```rust,no_run
//! # use bmp384_rs::{Bmp384, Bmp384Result};
//! # use bmp384_rs::bus::Bus;
//! # async fn demo<B: Bus>(mut device: Bmp384<B>)
//! #     -> Bmp384Result<(), B::Error> {
//! use bmp384_rs::register::odr::{Odr, OdrCfg, OutputDataRate};
//!
//! let rate = device.read::<Odr>().await?;
//! println!("{:?}", rate);
//!
//! device.write::<Odr>(&OdrCfg { odr_sel: OutputDataRate::R12p5Hz }).await?;
//!
//! # Ok(()) }
//! ```
use crate::register::{InvalidRegisterField, Readable, Reg, UnexpectedValue, Writable};

/// ODR (0x1D), 1 byte, read/write. Only used in normal mode.
pub struct Odr;
impl Reg for Odr { const ADDR: u8 = 0x1D; }

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OdrCfg {
    pub odr_sel: OutputDataRate,
}

impl Readable for Odr {
    type Out = OdrCfg;

    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(OdrCfg {
            odr_sel: OutputDataRate::try_from(b[0] & 0b0001_1111)
                .map_err(|e| InvalidRegisterField::new(Self::ADDR, e.0, 0))?,
        })
    }
}

impl Writable for Odr {
    type In = OdrCfg;

    fn encode(v: &Self::In, out: &mut [u8]) {
        let odr_sel: u8 = v.odr_sel.into();
        out[0] = odr_sel & 0b1_1111;
    }
}

/// `odr_sel` values of the ODR (0x1D) register, datasheet section 4.3.20.
///
/// Value `n` selects a sampling period of 5 ms * 2^n. Names round the resulting rate in Hz.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputDataRate {
    R200Hz      = 0x00,
    R100Hz      = 0x01,
    R50Hz       = 0x02,
    R25Hz       = 0x03,
    R12p5Hz     = 0x04,
    R6p25Hz     = 0x05,
    R3p1Hz      = 0x06,
    R1p5Hz      = 0x07,
    R0p78Hz     = 0x08,
    R0p39Hz     = 0x09,
    R0p2Hz      = 0x0A,
    R0p1Hz      = 0x0B,
    R0p05Hz     = 0x0C,
    R0p02Hz     = 0x0D,
    R0p01Hz     = 0x0E,
    R0p006Hz    = 0x0F,
    R0p003Hz    = 0x10,
    R0p0015Hz   = 0x11,
}

impl OutputDataRate {
    /// Sampling period in microseconds.
    pub fn period_us(self) -> u32 {
        5_000u32 << (self as u8)
    }
}

impl TryFrom<u8> for OutputDataRate {
    type Error = UnexpectedValue;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(OutputDataRate::R200Hz),
            0x01 => Ok(OutputDataRate::R100Hz),
            0x02 => Ok(OutputDataRate::R50Hz),
            0x03 => Ok(OutputDataRate::R25Hz),
            0x04 => Ok(OutputDataRate::R12p5Hz),
            0x05 => Ok(OutputDataRate::R6p25Hz),
            0x06 => Ok(OutputDataRate::R3p1Hz),
            0x07 => Ok(OutputDataRate::R1p5Hz),
            0x08 => Ok(OutputDataRate::R0p78Hz),
            0x09 => Ok(OutputDataRate::R0p39Hz),
            0x0A => Ok(OutputDataRate::R0p2Hz),
            0x0B => Ok(OutputDataRate::R0p1Hz),
            0x0C => Ok(OutputDataRate::R0p05Hz),
            0x0D => Ok(OutputDataRate::R0p02Hz),
            0x0E => Ok(OutputDataRate::R0p01Hz),
            0x0F => Ok(OutputDataRate::R0p006Hz),
            0x10 => Ok(OutputDataRate::R0p003Hz),
            0x11 => Ok(OutputDataRate::R0p0015Hz),
            _ => Err(UnexpectedValue(value)),
        }
    }
}

impl From<OutputDataRate> for u8 {
    fn from(rate: OutputDataRate) -> Self {
        rate as u8
    }
}
