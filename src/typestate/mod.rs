//! Typestate API on top of [`Bmp384`].
//!
//! [`Bmp384Builder`] picks the bus, the measured quantities and an optional interrupt pin at
//! compile time and hands out a device for one way of operating the sensor:
//!
//! - [`ForcedDevice`]: one conversion per call, the device sleeps in between.
//! - [`NormalDevice`]: free running conversions at the configured output data rate.
//! - [`FifoDevice`]: free running conversions buffered in the FIFO.
//!
//! # Examples
//!
//! ```rust,no_run
//! # use embedded_hal_async::delay::DelayNs;
//! # use embedded_hal_async::i2c::I2c;
//! use bmp384_rs::SdoPinState;
//! use bmp384_rs::typestate::{Bmp384Builder, NoPinError, TypeStateError};
//!
//! # async fn demo<I: I2c, D: DelayNs>(i2c: I, delay: D) -> Result<(), TypeStateError<I::Error, NoPinError>> {
//! let mut device = Bmp384Builder::new()
//!     .use_i2c(i2c, SdoPinState::High)
//!     .enable_pressure()
//!     .enable_temperature()
//!     .into_forced(delay)
//!     .await?;
//!
//! let sample = device.read_sample().await?;
//! let pressure = sample.pressure_pascal();
//! # Ok(())
//! # }
//! ```
mod builder;
mod fifo;
mod forced;
mod normal;
mod sample;

pub use builder::Bmp384Builder;
pub use fifo::{FifoDevice, FifoOutput};
pub use forced::ForcedDevice;
pub use normal::NormalDevice;
pub use sample::Sample;

use crate::bus::Bus;
use crate::register::int_status::IntStatus;
use crate::{Bmp384, Bmp384Error};
use embedded_hal::digital::{Error, ErrorKind, ErrorType, InputPin};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::digital::Wait;

/// Marker for the "No bus chosen yet" state in Bmp384Builder
pub struct NoBus;

/// Marker for the "No interrupt pin configured yet" state in the Bmp384Builder
pub struct NoPin;

#[derive(Debug)]
pub struct NoPinError;

impl Error for NoPinError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

impl ErrorType for NoPin {
    type Error = NoPinError;
}

impl Wait for NoPin {
    async fn wait_for_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn wait_for_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn wait_for_rising_edge(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn wait_for_falling_edge(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn wait_for_any_edge(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl InputPin for NoPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(false)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(false)
    }
}

#[derive(Debug)]
pub enum TypeStateError<BusError, PinError> {
    Device(Bmp384Error<BusError>),
    Pin(PinError),
    /// The FIFO reported a configuration error frame.
    FifoConfigError,
}

impl<BusError, PinError> From<Bmp384Error<BusError>> for TypeStateError<BusError, PinError> {
    fn from(e: Bmp384Error<BusError>) -> Self {
        TypeStateError::Device(e)
    }
}

pub type TypeStateResult<T, BusError, PinError> = Result<T, TypeStateError<BusError, PinError>>;

/// Output marker: nothing enabled yet.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct NoOutput;
/// Output marker: pressure only.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Pressure;
/// Output marker: temperature only.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Temperature;
/// Output marker: pressure and temperature.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PressureAndTemperature;

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Pressure {}
    impl Sealed for super::Temperature {}
    impl Sealed for super::PressureAndTemperature {}
}

/// Output markers that enable at least one sensor.
pub trait OutputConfig: sealed::Sealed {
    const PRESSURE: bool;
    const TEMPERATURE: bool;

    /// Length of one FIFO sensor frame holding the enabled quantities.
    const FRAME_LEN: usize = if Self::PRESSURE && Self::TEMPERATURE { 7 } else { 4 };
}

impl OutputConfig for Pressure {
    const PRESSURE: bool = true;
    const TEMPERATURE: bool = false;
}

impl OutputConfig for Temperature {
    const PRESSURE: bool = false;
    const TEMPERATURE: bool = true;
}

impl OutputConfig for PressureAndTemperature {
    const PRESSURE: bool = true;
    const TEMPERATURE: bool = true;
}

/// Waits for data to be ready in the DATA registers and reads it.
///
/// Uses the data ready interrupt when a pin is configured, otherwise waits the maximum
/// measurement time.
async fn wait_for_data<Out, B: Bus, IntPin: Wait + InputPin, D: DelayNs>(
    device: &mut Bmp384<B>,
    int_pin: &mut Option<IntPin>,
    delay: &mut D,
) -> TypeStateResult<Sample<Out>, B::Error, IntPin::Error> {
    if let Some(int_pin) = int_pin {
        loop {
            while int_pin.is_high().map_err(TypeStateError::Pin)? {
                let int_status = device.read::<IntStatus>().await?;
                if int_status.drdy {
                    let data = device.read_sensor_data().await?;
                    return Ok(Sample::from(data));
                }
            }

            int_pin
                .wait_for_rising_edge()
                .await
                .map_err(TypeStateError::Pin)?;
        }
    } else {
        delay.delay_us(device.max_measurement_time_us()).await;

        let data = device.read_sensor_data().await?;
        Ok(Sample::from(data))
    }
}
