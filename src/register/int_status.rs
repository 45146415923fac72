use crate::register::{InvalidRegisterField, Readable, Reg};

/// Marker type for the INT_STATUS (0x11) register
///
/// - **Length:** 1 byte
/// - **Access:** Read-only, cleared on read
pub struct IntStatus;
impl Reg for IntStatus { const ADDR: u8 = 0x11; }

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IntStatusFlags {
    /// The FIFO watermark interrupt was asserted.
    pub fwm_int: bool,

    /// The FIFO full interrupt was asserted.
    pub ffull_int: bool,

    /// The data ready interrupt was asserted.
    pub drdy: bool,
}

impl IntStatusFlags {
    /// Returns true if any interrupt source is asserted.
    pub fn any(&self) -> bool {
        self.fwm_int || self.ffull_int || self.drdy
    }
}

impl Readable for IntStatus {
    type Out = IntStatusFlags;

    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(IntStatusFlags {
            fwm_int:    (b[0] & 0b0001) != 0,
            ffull_int:  (b[0] & 0b0010) != 0,
            drdy:       (b[0] & 0b1000) != 0,
        })
    }
}
