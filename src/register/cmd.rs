//! ### CMD - Command register (`0x7E`, 1 byte, Write-only)
//!
//! ### Examples
//! ```rust,no_run
//! # use bmp384_rs::{Bmp384, Bmp384Result};
//! # use bmp384_rs::bus::Bus;
//! # async fn demo<B: Bus>(mut device: Bmp384<B>)
//! #     -> Bmp384Result<(), B::Error> {
//! use bmp384_rs::register::cmd::{Cmd, CmdData};
//!
//! device.write::<Cmd>(&CmdData::FifoFlush).await?;
//!
//! # Ok(()) }
//! ```
//!
//! See also: [`Bmp384::soft_reset()`](crate::Bmp384::soft_reset)
#![doc(alias = "CMD")]
use crate::register::{Reg, Writable};

/// Marker type for CMD (0x7E) register
pub struct Cmd;
impl Reg for Cmd { const ADDR: u8 = 0x7E; }

/// The payload for the CMD (0x7E) register.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CmdData {
    /// Enables the middle part of the extended mode.
    ExtmodeEnMiddle,

    /// Clears all data in the FIFO. The FIFO configuration is kept.
    FifoFlush,

    /// Restores all user configuration to its default state and flushes the FIFO.
    SoftReset,
}

impl From<CmdData> for u8 {
    fn from(cmd: CmdData) -> Self {
        match cmd {
            CmdData::ExtmodeEnMiddle => 0x34,
            CmdData::FifoFlush => 0xB0,
            CmdData::SoftReset => 0xB6,
        }
    }
}

impl Writable for Cmd {
    type In = CmdData;
    fn encode(v: &Self::In, out: &mut [u8]) {
        out[0] = (*v).into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cmd_encode() {
        let mut buffer = [0u8; 1];
        Cmd::encode(&CmdData::ExtmodeEnMiddle, &mut buffer);
        assert_eq!([0x34], buffer);

        Cmd::encode(&CmdData::FifoFlush, &mut buffer);
        assert_eq!([0xB0], buffer);

        Cmd::encode(&CmdData::SoftReset, &mut buffer);
        assert_eq!([0xB6], buffer);
    }
}
