//! ### SENSORTIME - Sensor time (`0x0C`, 3 byte, Read-only)
//!
//! A 24-bit counter spread over `SENSORTIME_0 (0x0C)`, `SENSORTIME_1 (0x0D)` and `SENSORTIME_2 (0x0E)`.
//! The three registers are exposed as the single marker [`SensorTime`] so they are always
//! burst read together.
//!
//! The tick period is not specified, so the value is only useful for relative ordering.
use crate::register::{InvalidRegisterField, Readable, Reg};

/// Marker type for the SENSORTIME (0x0C-0x0E) registers
///
/// - **Length:** 3 byte
/// - **Access:** Read-only
pub struct SensorTime;
impl Reg for SensorTime { const ADDR: u8 = 0x0C; }

impl Readable for SensorTime {
    type Out = u32;
    const N: usize = 3;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(u32::from_le_bytes([b[0], b[1], b[2], 0]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensor_time_decode() {
        assert_eq!(0x0312F0, SensorTime::decode(&[0xF0, 0x12, 0x03]).unwrap());
    }
}
