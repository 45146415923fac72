//! ### CONFIG - IIR filter configuration (`0x1F`, 1 byte, R/W)
//!
//! ### Default values
//! 0x00 (bypass mode / no filter)
use crate::register::{InvalidRegisterField, Readable, Reg, Writable};

/// Marker type for CONFIG (0x1F) register
///
/// - **Length:** 1 byte
/// - **Access:** Read/Write
pub struct Config;
impl Reg for Config { const ADDR: u8 = 0x1F; }

/// The payload for the CONFIG (0x1F) register.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigFields {
    /// The IIR filter coefficient, see datasheet section 3.4.3.
    pub iir_filter: IIRFilterCoefficient,
}

impl Readable for Config {
    type Out = ConfigFields;

    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(ConfigFields {
            iir_filter: IIRFilterCoefficient::from((b[0] >> 1) & 0b111),
        })
    }
}

impl Writable for Config {
    type In = ConfigFields;

    fn encode(v: &Self::In, out: &mut [u8]) {
        out[0] = (v.iir_filter as u8 & 0b111) << 1;
    }
}

/// IIR filter coefficients.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IIRFilterCoefficient {
    /// Bypass mode
    Coef0   = 0b000,
    Coef1   = 0b001,
    Coef3   = 0b010,
    Coef7   = 0b011,
    Coef15  = 0b100,
    Coef31  = 0b101,
    Coef63  = 0b110,
    Coef127 = 0b111,
}

impl From<u8> for IIRFilterCoefficient {
    fn from(field: u8) -> Self {
        match field & 0b111 {
            0b000 => IIRFilterCoefficient::Coef0,
            0b001 => IIRFilterCoefficient::Coef1,
            0b010 => IIRFilterCoefficient::Coef3,
            0b011 => IIRFilterCoefficient::Coef7,
            0b100 => IIRFilterCoefficient::Coef15,
            0b101 => IIRFilterCoefficient::Coef31,
            0b110 => IIRFilterCoefficient::Coef63,
            _ => IIRFilterCoefficient::Coef127,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_decode() {
        assert_eq!(IIRFilterCoefficient::Coef0, Config::decode(&[0x00]).unwrap().iir_filter);
        assert_eq!(IIRFilterCoefficient::Coef15, Config::decode(&[0b0000_1000]).unwrap().iir_filter);
        assert_eq!(IIRFilterCoefficient::Coef127, Config::decode(&[0b0000_1111]).unwrap().iir_filter);
    }

    #[test]
    fn config_encode() {
        let mut buffer = [0u8; 1];
        Config::encode(&ConfigFields { iir_filter: IIRFilterCoefficient::Coef3 }, &mut buffer);
        assert_eq!([0b0000_0100], buffer);
    }
}
