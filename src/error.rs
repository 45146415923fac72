//! Errors that can occur when using the BMP384 device.
//!
//! This module provides an error type that encapsulates all possible errors that can occur during communication with BMP384.
//! It is generic over the underlying bus (spi/i2c) error type.

use crate::register::InvalidRegisterField;

/// This represents all possible errors that can occur when using the BMP384 device.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bmp384Error<BusError> {
    /// An error has occurred in the SPI / I2C driver
    Bus(BusError),

    /// Unable to communicate with BMP384
    ///
    /// Could possibly indicate an error with pin configuration and/or wiring.
    NotConnected,

    /// Reading from a register returned unexpected data. This should not happen in normal circumstances.
    ///
    /// Could possibly indicate a bug in the driver, or less likely, a faulty chip or interference.
    UnexpectedRegisterData(InvalidRegisterField),

    /// Reading from FIFO returned unexpected data. This should not happen in normal circumstances.
    ///
    /// Could possibly indicate a bug in the driver, or less likely, a faulty chip or interference.
    UnexpectedFifoData,

    /// The device did not reach the expected state in time.
    ///
    /// Returned when the command decoder stays busy, or when a forced conversion never reports data ready.
    Timeout,

    /// ERR_REG reports a fatal error.
    FatalError,

    /// An argument was outside of the range the register field can hold.
    InvalidArgument,

    /// The oversampling settings need more time than the output data rate allows.
    ///
    /// The device would flag `conf_err` and stop measuring, so the configuration is rejected before it is written.
    InvalidConfiguration,

    /// The operation is not possible in the current power mode.
    InvalidMode,
}
