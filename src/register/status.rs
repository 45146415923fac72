use crate::register::{InvalidRegisterField, Readable, Reg};

/// STATUS (0x03), 1 byte, read-only. See [`Bmp384::status`](crate::Bmp384::status).
pub struct Status;
impl Reg for Status { const ADDR: u8 = 0x03; }

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusFlags {
    cmd_rdy: bool,
    drdy_press: bool,
    drdy_temp: bool,
}

impl StatusFlags {
    pub fn new(cmd_rdy: bool, drdy_press: bool, drdy_temp: bool) -> Self {
        Self { cmd_rdy, drdy_press, drdy_temp }
    }

    /// `cmd_rdy`: CMD accepts a new command.
    pub fn command_decoder_ready(&self) -> bool { self.cmd_rdy }

    /// `drdy_press`: a pressure conversion finished. Cleared by reading DATA_0..DATA_2.
    pub fn pressure_data_ready(&self) -> bool { self.drdy_press }

    /// `drdy_temp`: a temperature conversion finished. Cleared by reading DATA_3..DATA_5.
    pub fn temperature_data_ready(&self) -> bool { self.drdy_temp }
}

impl Readable for Status {
    type Out = StatusFlags;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(StatusFlags {
            cmd_rdy:    (b[0] & 0b0001_0000) != 0,
            drdy_press: (b[0] & 0b0010_0000) != 0,
            drdy_temp:  (b[0] & 0b0100_0000) != 0,
        })
    }
}
