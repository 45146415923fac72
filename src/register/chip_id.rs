//! ### CHIP_ID - Chip identification number (`0x00`, 1 byte, R)
//!
//! Contains the chip identification code, which is always [`BMP384_CHIP_ID`] for the BMP384.
//!
//! ### Examples
//! ```rust,no_run
//! # use bmp384_rs::{Bmp384, Bmp384Result};
//! # use bmp384_rs::bus::Bus;
//! # async fn demo<B: Bus>(mut device: Bmp384<B>)
//! #     -> Bmp384Result<(), B::Error> {
//! use bmp384_rs::register::chip_id::{ChipId, BMP384_CHIP_ID};
//!
//! let id = device.read::<ChipId>().await?;
//! assert_eq!(BMP384_CHIP_ID, id);
//!
//! # Ok(()) }
//! ```
#![doc(alias = "CHIP_ID")]
use crate::register::{InvalidRegisterField, Readable, Reg};

/// Identification code reported by every BMP384.
pub const BMP384_CHIP_ID: u8 = 0x50;

/// Marker struct for the CHIP_ID (0x00) register
///
/// - **Length:** 1 byte
/// - **Access:** Read-only
pub struct ChipId;
impl Reg for ChipId { const ADDR: u8 = 0x00; }

impl Readable for ChipId {
    type Out = u8;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(b[0])
    }
}
