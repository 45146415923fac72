use crate::register::{InvalidRegisterField, Readable, Reg, Writable};

/// Marker type for the IF_CONF (0x1A) register
///
/// - **Length:** 1 byte
/// - **Access:** Read/Write
pub struct IfConf;
impl Reg for IfConf { const ADDR: u8 = 0x1A; }

/// The payload for the IF_CONF (0x1A) register.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IfConfFields {
    /// Use 3-wire SPI instead of 4-wire.
    pub spi3: bool,
    /// Enable the I2C watchdog timer.
    pub i2c_wdt_en: bool,
    /// Watchdog timeout period.
    pub i2c_wdt_sel: I2cWatchdogTimer,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cWatchdogTimer {
    /// 1.25 ms
    WdtShort = 0,
    /// 40 ms
    WdtLong = 1,
}

impl From<u8> for I2cWatchdogTimer {
    fn from(field: u8) -> Self {
        match field {
            0 => I2cWatchdogTimer::WdtShort,
            _ => I2cWatchdogTimer::WdtLong,
        }
    }
}

/// Number of wires used by the SPI interface.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpiWire {
    FourWire,
    ThreeWire,
}

impl Readable for IfConf {
    type Out = IfConfFields;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(IfConfFields {
            spi3:        (b[0] & 0b001) != 0,
            i2c_wdt_en:  (b[0] & 0b010) != 0,
            i2c_wdt_sel: I2cWatchdogTimer::from((b[0] >> 2) & 0b001),
        })
    }
}

impl Writable for IfConf {
    type In = IfConfFields;

    fn encode(v: &Self::In, out: &mut [u8]) {
        out[0] = (v.spi3 as u8) | (v.i2c_wdt_en as u8) << 1 | (v.i2c_wdt_sel as u8) << 2;
    }
}
