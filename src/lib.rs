//! Async `no_std` driver for the Bosch BMP384 barometric pressure and temperature sensor.
//!
//! The crate offers two layers:
//! - [`Bmp384`]: register level access, measurement, interrupt and FIFO helpers over I2C or SPI.
//! - [`typestate`]: a builder that picks the operating mode at compile time and hands out a
//!   [`ForcedDevice`](typestate::ForcedDevice), [`NormalDevice`](typestate::NormalDevice) or
//!   [`FifoDevice`](typestate::FifoDevice).
//!
//! Logging goes through `defmt` or `log`, selected with the feature of the same name.
//! The `uom` feature adds typed unit accessors to measurements.
#![no_std]

// This mod MUST go first, so that the others see its macros.
mod fmt;

pub mod bus;
pub mod calibration;
pub mod config;
pub mod error;
pub mod fifo;
pub mod register;
pub mod typestate;

mod bmp384;

#[cfg(test)]
mod testing;

pub use bmp384::{
    Bmp384, Bmp384I2c, Bmp384Result, Bmp384Spi, ChipInfo, InterruptActiveLevel, InterruptPinType,
    InterruptSource, Interrupts, Measurement, Reading, ResetPolicy, SdoPinState, CHIP_INFO,
};
pub use error::Bmp384Error;
