//! Typed access to the BMP384 register map.
//!
//! Every register (or block of registers that has to be burst read) is represented by a marker
//! type implementing [`Reg`], and [`Readable`] and/or [`Writable`] depending on its access rights.
//! The marker types are used with [`Bmp384::read`](crate::Bmp384::read) and
//! [`Bmp384::write`](crate::Bmp384::write), which take care of the bus transfer and of
//! decoding/encoding the payload.
pub mod chip_id;
pub mod err_reg;
pub mod status;
pub mod data;
pub mod sensor_time;
pub mod event;
pub mod int_status;
pub mod fifo_length;
pub mod fifo_data;
pub mod fifo_wtm;
pub mod fifo_config;
pub mod int_ctrl;
pub mod if_conf;
pub mod pwr_ctrl;
pub mod osr;
pub mod odr;
pub mod config;
pub mod calibration;
pub mod cmd;

/// A register held a bit pattern that is reserved according to the datasheet.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidRegisterField {
    /// Address of the register that was decoded.
    pub register: u8,
    /// The offending field value, shifted down to bit 0.
    pub value: u8,
    /// Position of the field's least significant bit within the register.
    pub bit_offset: u8,
}

impl InvalidRegisterField {
    pub fn new(register: u8, value: u8, bit_offset: u8) -> Self {
        Self { register, value, bit_offset }
    }
}

/// A field value that does not map onto any variant of the target enum.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct UnexpectedValue(pub u8);

pub trait Reg { const ADDR: u8; }

pub trait Readable: Reg {
    type Out;
    const N: usize = 1;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField>;
}

pub trait Writable: Reg {
    type In;
    const N: usize = 1;
    fn encode(v: &Self::In, out: &mut [u8]);
}
