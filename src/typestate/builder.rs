use crate::bus::{Bus, I2c, Spi};
use crate::config::Configuration;
use crate::fifo::FifoConfiguration;
use crate::register::config::IIRFilterCoefficient;
use crate::register::odr::OutputDataRate;
use crate::register::osr::Oversampling;
use crate::register::pwr_ctrl::PowerMode;
use crate::typestate::fifo::FifoDevice;
use crate::typestate::forced::ForcedDevice;
use crate::typestate::normal::NormalDevice;
use crate::typestate::{NoBus, NoOutput, NoPin, OutputConfig, Pressure, PressureAndTemperature, Temperature};
use crate::{Bmp384, Bmp384Result, ResetPolicy, SdoPinState};
use core::marker::PhantomData;
use embedded_hal::digital::InputPin;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::digital::Wait;

/// The main entry-point into the typestate API. The [`Bmp384Builder`] lets you configure and build
/// a [`ForcedDevice`], [`NormalDevice`] or [`FifoDevice`].
pub struct Bmp384Builder<Out = NoOutput, B = NoBus, IntPin = NoPin> {
    bus: B,
    config: Configuration,
    reset: ResetPolicy,
    int_pin: Option<IntPin>,
    _out: PhantomData<Out>,
}

impl Default for Bmp384Builder {
    fn default() -> Self {
        Self::new()
    }
}

/// Methods available on Bmp384Builder when no bus or output has been configured yet.
impl Bmp384Builder<NoOutput, NoBus, NoPin> {
    pub fn new() -> Self {
        Self {
            bus: NoBus,
            config: Configuration::default()
                .enable_pressure_measurement(false)
                .enable_temperature_measurement(false),
            reset: ResetPolicy::Soft,
            int_pin: None,
            _out: PhantomData,
        }
    }
}

impl<Out, B, IntPin> Bmp384Builder<Out, B, IntPin> {
    pub fn oversampling(mut self, pressure: Oversampling, temperature: Oversampling) -> Self {
        self.config = self
            .config
            .pressure_oversampling(pressure)
            .temperature_oversampling(temperature);

        self
    }

    /// Only used by [`into_normal`](Self::into_normal) and [`into_fifo`](Self::into_fifo).
    pub fn output_data_rate(mut self, rate: OutputDataRate) -> Self {
        self.config = self.config.output_data_rate(rate);

        self
    }

    pub fn iir_filter_coefficient(mut self, coefficient: IIRFilterCoefficient) -> Self {
        self.config = self.config.iir_filter_coefficient(coefficient);

        self
    }

    /// Defaults to [`ResetPolicy::Soft`].
    pub fn reset_policy(mut self, reset: ResetPolicy) -> Self {
        self.reset = reset;

        self
    }
}

/// Methods available on Bmp384Builder when no bus (SPI/I2C) has been configured yet.
impl<Out, IntPin> Bmp384Builder<Out, NoBus, IntPin> {
    /// Configures the underlying [`Bmp384`] driver to use I2C
    ///
    /// Since the I2C address of the BMP384 is derived from the state of the SDO pin, you need to tell the driver
    /// if it is connected to GND or VDDIO using `sdo_pin_state`.
    pub fn use_i2c<I2cType>(self, i2c: I2cType, sdo_pin_state: SdoPinState) -> Bmp384Builder<Out, I2c<I2cType>, IntPin>
    where
        I2cType: embedded_hal_async::i2c::I2c,
    {
        Bmp384Builder {
            bus: I2c::new(i2c, sdo_pin_state.into()),
            config: self.config,
            reset: self.reset,
            int_pin: self.int_pin,
            _out: PhantomData,
        }
    }

    /// Configures the underlying [`Bmp384`] driver to use SPI
    pub fn use_spi<SpiType>(self, spi: SpiType) -> Bmp384Builder<Out, Spi<SpiType>, IntPin>
    where
        SpiType: embedded_hal_async::spi::SpiDevice,
    {
        Bmp384Builder {
            bus: Spi::new(spi),
            config: self.config,
            reset: self.reset,
            int_pin: self.int_pin,
            _out: PhantomData,
        }
    }

    #[cfg(test)]
    pub(crate) fn use_bus<TestBus: Bus>(self, bus: TestBus) -> Bmp384Builder<Out, TestBus, IntPin> {
        Bmp384Builder {
            bus,
            config: self.config,
            reset: self.reset,
            int_pin: self.int_pin,
            _out: PhantomData,
        }
    }
}

/// Methods available on Bmp384Builder when no interrupt pin has been configured yet.
impl<Out, B> Bmp384Builder<Out, B, NoPin> {
    /// Uses the given pin to wait for interrupts instead of waiting the maximum measurement time.
    ///
    /// The INT pin has to be configured as push-pull, active high (the reset default).
    pub fn use_irq<IntPin: Wait + InputPin>(self, pin: IntPin) -> Bmp384Builder<Out, B, IntPin> {
        Bmp384Builder {
            bus: self.bus,
            config: self.config,
            reset: self.reset,
            int_pin: Some(pin),
            _out: PhantomData,
        }
    }
}

impl<B, IntPin> Bmp384Builder<NoOutput, B, IntPin> {
    pub fn enable_pressure(self) -> Bmp384Builder<Pressure, B, IntPin> {
        let config = self.config.enable_pressure_measurement(true);
        Bmp384Builder { bus: self.bus, config, reset: self.reset, int_pin: self.int_pin, _out: PhantomData }
    }

    pub fn enable_temperature(self) -> Bmp384Builder<Temperature, B, IntPin> {
        let config = self.config.enable_temperature_measurement(true);
        Bmp384Builder { bus: self.bus, config, reset: self.reset, int_pin: self.int_pin, _out: PhantomData }
    }
}

impl<B, IntPin> Bmp384Builder<Pressure, B, IntPin> {
    pub fn enable_temperature(self) -> Bmp384Builder<PressureAndTemperature, B, IntPin> {
        let config = self.config.enable_temperature_measurement(true);
        Bmp384Builder { bus: self.bus, config, reset: self.reset, int_pin: self.int_pin, _out: PhantomData }
    }
}

impl<B, IntPin> Bmp384Builder<Temperature, B, IntPin> {
    pub fn enable_pressure(self) -> Bmp384Builder<PressureAndTemperature, B, IntPin> {
        let config = self.config.enable_pressure_measurement(true);
        Bmp384Builder { bus: self.bus, config, reset: self.reset, int_pin: self.int_pin, _out: PhantomData }
    }
}

/// Methods available once a bus and at least one output have been configured.
impl<Out: OutputConfig, B: Bus, IntPin: Wait + InputPin> Bmp384Builder<Out, B, IntPin> {
    async fn build<D: DelayNs>(self, mode: PowerMode, delay: &mut D) -> Bmp384Result<(Bmp384<B>, Option<IntPin>), B::Error> {
        let config = self.config.power_mode(mode);
        let device = Bmp384::new(self.bus, config, self.reset, delay).await?;

        Ok((device, self.int_pin))
    }

    /// Builds a [`ForcedDevice`]. The device sleeps between calls to [`ForcedDevice::read_sample`].
    pub async fn into_forced<D: DelayNs>(self, mut delay: D) -> Bmp384Result<ForcedDevice<Out, B, IntPin, D>, B::Error> {
        let (device, int_pin) = self.build(PowerMode::Sleep, &mut delay).await?;

        ForcedDevice::new(device, int_pin, delay).await
    }

    /// Builds a [`NormalDevice`] measuring at the configured output data rate.
    ///
    /// Returns [`Bmp384Error::InvalidConfiguration`](crate::Bmp384Error::InvalidConfiguration) if
    /// the oversampling does not fit in the output data rate period.
    pub async fn into_normal<D: DelayNs>(self, mut delay: D) -> Bmp384Result<NormalDevice<Out, B, IntPin, D>, B::Error> {
        let (device, int_pin) = self.build(PowerMode::Normal, &mut delay).await?;

        NormalDevice::new(device, int_pin, delay).await
    }

    /// Builds a [`FifoDevice`] that buffers measurements in the FIFO.
    ///
    /// The pressure and temperature settings of `fifo` are overridden by the enabled outputs.
    /// `watermark` is the number of bytes at which the FIFO watermark interrupt fires.
    pub async fn into_fifo<D: DelayNs>(
        self,
        mut delay: D,
        fifo: FifoConfiguration,
        watermark: u16,
    ) -> Bmp384Result<FifoDevice<Out, B, IntPin, D>, B::Error> {
        let (device, int_pin) = self.build(PowerMode::Normal, &mut delay).await?;

        FifoDevice::new(device, int_pin, delay, fifo, watermark).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeBus, FakeDelay, FakePin};

    #[tokio::test]
    async fn builder_applies_outputs_and_settings() {
        let device = Bmp384Builder::new()
            .use_bus(FakeBus::new())
            .enable_temperature()
            .oversampling(Oversampling::X2, Oversampling::X4)
            .output_data_rate(OutputDataRate::R25Hz)
            .iir_filter_coefficient(IIRFilterCoefficient::Coef7)
            .reset_policy(ResetPolicy::None)
            .into_normal(FakeDelay::default())
            .await
            .unwrap();

        let bus = device.release().await.unwrap();
        // temperature only, sleep after release
        assert_eq!(0b0000_0010, bus.regs[0x1B]);
        assert_eq!(0b0001_0001, bus.regs[0x1C]);
        assert_eq!(0x03, bus.regs[0x1D]);
        assert_eq!(0b0000_0110, bus.regs[0x1F]);
        assert_eq!(None, bus.written(0x7E));
    }

    #[tokio::test]
    async fn builder_soft_resets_by_default() {
        let device = Bmp384Builder::new()
            .use_bus(FakeBus::new())
            .enable_pressure()
            .use_irq(FakePin::new(false))
            .into_forced(FakeDelay::default())
            .await
            .unwrap();

        let bus = device.release().await.unwrap();
        assert_eq!(Some(0xB6), bus.written(0x7E));
    }

    #[tokio::test]
    async fn builder_rejects_invalid_normal_configuration() {
        let result = Bmp384Builder::new()
            .use_bus(FakeBus::new())
            .enable_pressure()
            .enable_temperature()
            .oversampling(Oversampling::X32, Oversampling::X32)
            .output_data_rate(OutputDataRate::R200Hz)
            .into_normal(FakeDelay::default())
            .await;

        assert!(matches!(result, Err(crate::Bmp384Error::InvalidConfiguration)));
    }
}
