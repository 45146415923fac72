//! ### FIFO_CONFIG_1/2 - FIFO configuration (`0x17/0x18`, 1 byte, R/W)
//!
//! ### Default values
//! FIFO_CONFIG_1: `0x02` (`fifo_stop_on_full = true`)
//!
//! FIFO_CONFIG_2: `0x02` (`fifo_subsampling = 2`)
//!
//! ### Examples
//! ```rust,no_run
//! # use bmp384_rs::{Bmp384, Bmp384Result};
//! # use bmp384_rs::bus::Bus;
//! # async fn demo<B: Bus>(mut device: Bmp384<B>)
//! #     -> Bmp384Result<(), B::Error> {
//! use bmp384_rs::register::fifo_config::{FifoConfig1, FifoConfig2};
//!
//! // Store pressure frames in the FIFO
//! let mut cfg = device.read::<FifoConfig1>().await?;
//! cfg.fifo_mode = true;
//! cfg.fifo_press_en = true;
//! device.write::<FifoConfig1>(&cfg).await?;
//!
//! // Keep only every 8th sample
//! let mut cfg = device.read::<FifoConfig2>().await?;
//! cfg.fifo_subsampling = 3;
//! device.write::<FifoConfig2>(&cfg).await?;
//!
//! # Ok(()) }
//! ```
//!
//! See also: [`crate::Bmp384::fifo_configuration()`] and [`crate::Bmp384::set_fifo_configuration()`]
use crate::register::{InvalidRegisterField, Readable, Reg, Writable};

/// Largest value of the 3-bit subsampling field.
pub const MAX_FIFO_SUBSAMPLING: u8 = 0b111;

/// Marker type for FIFO_CONFIG_1 (0x17) register
///
/// - **Length:** 1 byte
/// - **Access:** Read/Write
pub struct FifoConfig1;
impl Reg for FifoConfig1 { const ADDR: u8 = 0x17; }

/// The payload for the FIFO_CONFIG_1 (0x17) register.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FifoConfig1Fields {
    /// Enables storing measurements in the FIFO.
    ///
    /// Frames already queued can still be read while this is off.
    pub fifo_mode: bool,

    /// If true no frames are stored once the FIFO is full. Otherwise the oldest frame is overwritten.
    pub fifo_stop_on_full: bool,

    /// Appends a sensor time frame once the FIFO has been read empty.
    pub fifo_time_en: bool,

    /// Store pressure in the FIFO.
    pub fifo_press_en: bool,

    /// Store temperature in the FIFO.
    pub fifo_temp_en: bool,
}

impl Readable for FifoConfig1 {
    type Out = FifoConfig1Fields;

    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(FifoConfig1Fields {
            fifo_mode:          (b[0] & 0b00001) != 0,
            fifo_stop_on_full:  (b[0] & 0b00010) != 0,
            fifo_time_en:       (b[0] & 0b00100) != 0,
            fifo_press_en:      (b[0] & 0b01000) != 0,
            fifo_temp_en:       (b[0] & 0b10000) != 0,
        })
    }
}

impl Writable for FifoConfig1 {
    type In = FifoConfig1Fields;

    fn encode(v: &Self::In, out: &mut [u8]) {
        out[0] = (v.fifo_mode as u8)
            | (v.fifo_stop_on_full as u8) << 1
            | (v.fifo_time_en as u8) << 2
            | (v.fifo_press_en as u8) << 3
            | (v.fifo_temp_en as u8) << 4;
    }
}

/// Marker type for FIFO_CONFIG_2 (0x18) register
///
/// - **Length:** 1 byte
/// - **Access:** Read/Write
pub struct FifoConfig2;
impl Reg for FifoConfig2 { const ADDR: u8 = 0x18; }

/// The payload for the FIFO_CONFIG_2 (0x18) register.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FifoConfig2Fields {
    /// Downsampling factor 2^fifo_subsampling, 0..=7. Higher bits are dropped on write.
    pub fifo_subsampling: u8,

    /// Whether filtered or unfiltered data is stored.
    pub data_select: FifoDataSource,
}

/// The data source for pressure and temperature frames.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FifoDataSource {
    Unfiltered = 0,
    /// Data passed through the IIR filter.
    Filtered = 1,
    Reserved = 2,
}

impl From<u8> for FifoDataSource {
    fn from(field: u8) -> Self {
        match field {
            0b00 => FifoDataSource::Unfiltered,
            0b01 => FifoDataSource::Filtered,
            _ => FifoDataSource::Reserved,
        }
    }
}

impl Readable for FifoConfig2 {
    type Out = FifoConfig2Fields;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(FifoConfig2Fields {
            fifo_subsampling: b[0] & MAX_FIFO_SUBSAMPLING,
            data_select: FifoDataSource::from((b[0] >> 3) & 0b11),
        })
    }
}

impl Writable for FifoConfig2 {
    type In = FifoConfig2Fields;

    fn encode(v: &Self::In, out: &mut [u8]) {
        out[0] = (v.fifo_subsampling & MAX_FIFO_SUBSAMPLING) | (v.data_select as u8) << 3;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_config1_decode() {
        let reg = FifoConfig1::decode(&[0b00010]).unwrap();
        assert!(reg.fifo_stop_on_full);
        assert!(!reg.fifo_mode);

        let reg = FifoConfig1::decode(&[0b11101]).unwrap();
        assert_eq!(FifoConfig1Fields {
            fifo_mode: true,
            fifo_stop_on_full: false,
            fifo_time_en: true,
            fifo_press_en: true,
            fifo_temp_en: true,
        }, reg);
    }

    #[test]
    fn fifo_config1_encode() {
        let mut buffer = [0u8; 1];
        FifoConfig1::encode(&FifoConfig1Fields {
            fifo_mode: true,
            fifo_stop_on_full: false,
            fifo_time_en: true,
            fifo_press_en: false,
            fifo_temp_en: true,
        }, &mut buffer);
        assert_eq!([0b10101], buffer);
    }

    #[test]
    fn fifo_config2_decode() {
        let reg = FifoConfig2::decode(&[0b000_0010]).unwrap();
        assert_eq!(2, reg.fifo_subsampling);
        assert_eq!(FifoDataSource::Unfiltered, reg.data_select);

        let reg = FifoConfig2::decode(&[0b000_1111]).unwrap();
        assert_eq!(7, reg.fifo_subsampling);
        assert_eq!(FifoDataSource::Filtered, reg.data_select);

        let reg = FifoConfig2::decode(&[0b001_1000]).unwrap();
        assert_eq!(FifoDataSource::Reserved, reg.data_select);
    }

    #[test]
    fn fifo_config2_encode() {
        let mut buffer = [0u8; 1];
        FifoConfig2::encode(&FifoConfig2Fields {
            fifo_subsampling: 5,
            data_select: FifoDataSource::Filtered,
        }, &mut buffer);
        assert_eq!([0b0000_1101], buffer);

        FifoConfig2::encode(&FifoConfig2Fields {
            fifo_subsampling: 0x0F,
            data_select: FifoDataSource::Unfiltered,
        }, &mut buffer);
        assert_eq!([0b0000_0111], buffer);
    }
}
