//! ### OSR - Oversampling settings (`0x1C`, 1 byte, R/W)
//!
//! ### Default values
//! 0x02 (pressure x4, temperature x1)
use crate::register::{InvalidRegisterField, Readable, Reg, UnexpectedValue, Writable};

/// Marker type for the OSR (0x1C) register
///
/// - **Length:** 1 byte
/// - **Access:** Read/Write
pub struct Osr;
impl Reg for Osr { const ADDR: u8 = 0x1C; }

/// The payload for the OSR (0x1C) register.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OsrCfg {
    pub osr_p: Oversampling,
    pub osr_t: Oversampling,
}

impl Readable for Osr {
    type Out = OsrCfg;

    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(OsrCfg {
            osr_p: Oversampling::try_from(b[0] & 0b0000_0111)
                .map_err(|e| InvalidRegisterField::new(Self::ADDR, e.0, 0))?,
            osr_t: Oversampling::try_from((b[0] >> 3) & 0b0000_0111)
                .map_err(|e| InvalidRegisterField::new(Self::ADDR, e.0, 3))?,
        })
    }
}

impl Writable for Osr {
    type In = OsrCfg;
    fn encode(v: &Self::In, out: &mut [u8]) {
        let osr_p: u8 = v.osr_p.into();
        let osr_t: u8 = v.osr_t.into();
        out[0] = osr_p | (osr_t << 3);
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Oversampling {
    X1,
    X2,
    X4,
    X8,
    X16,
    X32,
}

impl Oversampling {
    /// Number of samples averaged per measurement.
    pub fn factor(self) -> u32 {
        1 << u8::from(self)
    }
}

impl TryFrom<u8> for Oversampling {
    type Error = UnexpectedValue;
    fn try_from(field: u8) -> Result<Self, Self::Error> {
        match field {
            0b000 => Ok(Oversampling::X1),
            0b001 => Ok(Oversampling::X2),
            0b010 => Ok(Oversampling::X4),
            0b011 => Ok(Oversampling::X8),
            0b100 => Ok(Oversampling::X16),
            0b101 => Ok(Oversampling::X32),
            other => Err(UnexpectedValue(other)),
        }
    }
}

impl From<Oversampling> for u8 {
    fn from(osr: Oversampling) -> Self {
        match osr {
            Oversampling::X1 => 0b000,
            Oversampling::X2 => 0b001,
            Oversampling::X4 => 0b010,
            Oversampling::X8 => 0b011,
            Oversampling::X16 => 0b100,
            Oversampling::X32 => 0b101,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn osr_decode() {
        let reg = Osr::decode(&[0x02]).unwrap();
        assert_eq!(Oversampling::X4, reg.osr_p);
        assert_eq!(Oversampling::X1, reg.osr_t);

        let reg = Osr::decode(&[0b0000_1101]).unwrap();
        assert_eq!(Oversampling::X32, reg.osr_p);
        assert_eq!(Oversampling::X2, reg.osr_t);
    }

    #[test]
    fn osr_decode_reserved() {
        let err = Osr::decode(&[0b0000_0110]).unwrap_err();
        assert_eq!(InvalidRegisterField::new(0x1C, 0b110, 0), err);

        let err = Osr::decode(&[0b0011_1000]).unwrap_err();
        assert_eq!(InvalidRegisterField::new(0x1C, 0b111, 3), err);
    }

    #[test]
    fn osr_encode() {
        let mut buffer = [0u8; 1];
        Osr::encode(&OsrCfg { osr_p: Oversampling::X8, osr_t: Oversampling::X1 }, &mut buffer);
        assert_eq!([0b0000_0011], buffer);

        Osr::encode(&OsrCfg { osr_p: Oversampling::X32, osr_t: Oversampling::X2 }, &mut buffer);
        assert_eq!([0b0000_1101], buffer);
    }

    #[test]
    fn oversampling_factor() {
        assert_eq!(1, Oversampling::X1.factor());
        assert_eq!(32, Oversampling::X32.factor());
    }
}
