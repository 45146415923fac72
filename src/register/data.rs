use crate::register::{InvalidRegisterField, Readable, Reg};

/// Marker struct for the DATA_0 - DATA_5 (0x04 - 0x09) registers.
///
/// The BMP384 auto-increments the address on multi-byte reads, so reading 6 bytes from 0x04
/// fetches pressure and temperature of the same conversion in one burst.
/// The payload is the raw, uncompensated measurement. [`Bmp384::read_sensor_data()`](crate::Bmp384::read_sensor_data)
/// compensates it with the device calibration.
///
/// - **Length:** 6 bytes
/// - **Access:** Read-only
pub struct Data;
impl Reg for Data { const ADDR: u8 = 0x04; }

/// Raw 24-bit pressure and temperature words.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DataSample {
    pressure: u32,
    temperature: u32,
}

impl DataSample {
    pub fn new(pressure: u32, temperature: u32) -> Self {
        Self { pressure, temperature }
    }

    /// Raw pressure from DATA_0..DATA_2.
    pub fn pressure(&self) -> u32 { self.pressure }

    /// Raw temperature from DATA_3..DATA_5.
    pub fn temperature(&self) -> u32 { self.temperature }
}

impl Readable for Data {
    type Out = DataSample;

    const N: usize = 6;

    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(DataSample {
            pressure: u32::from_le_bytes([b[0], b[1], b[2], 0]),
            temperature: u32::from_le_bytes([b[3], b[4], b[5], 0]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_decode() {
        let reg = Data::decode(&[0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]).unwrap();

        assert_eq!(0xCCBBAA, reg.pressure());
        assert_eq!(0xFFEEDD, reg.temperature());
    }
}
