use crate::register::{InvalidRegisterField, Readable, Reg};

/// Marker struct for the ERR_REG (0x02) register
///
/// - **Length:** 1 byte
/// - **Access:** Read-only
///
/// Used with [`Bmp384::read::<ErrReg>()`](crate::Bmp384::read) or the convenience method
/// [`Bmp384::error_flags`](crate::Bmp384::error_flags).
pub struct ErrReg;
impl Reg for ErrReg { const ADDR: u8 = 0x02; }

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ErrorFlags {
    fatal_err: bool,
    cmd_err: bool,
    conf_err: bool,
}

impl ErrorFlags {
    pub fn new(fatal_err: bool, cmd_err: bool, conf_err: bool) -> Self {
        Self { fatal_err, cmd_err, conf_err }
    }

    /// A fatal error occurred.
    pub fn fatal_error(&self) -> bool { self.fatal_err }

    /// Command execution failed.
    ///
    /// This value is cleared on **register** read.
    pub fn command_error(&self) -> bool { self.cmd_err }

    /// Sensor configuration error detected.
    ///
    /// This can only happen in [`PowerMode::Normal`](crate::register::pwr_ctrl::PowerMode::Normal).
    /// This value is cleared on **register** read.
    pub fn configuration_error(&self) -> bool { self.conf_err }

    /// Returns true if none of the error flags are set.
    pub fn is_clear(&self) -> bool {
        !(self.fatal_err || self.cmd_err || self.conf_err)
    }
}

impl Readable for ErrReg {
    type Out = ErrorFlags;

    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(ErrorFlags {
            fatal_err: (b[0] & 0b001) != 0,
            cmd_err:   (b[0] & 0b010) != 0,
            conf_err:  (b[0] & 0b100) != 0,
        })
    }
}
