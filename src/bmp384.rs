use crate::bus::{Bus, I2c, Interface, Spi};
use crate::calibration::CalibrationData;
use crate::config::{typical_measurement_time_us, Configuration};
use crate::error::Bmp384Error;
use crate::fifo::{FifoConfiguration, FifoFrame, FifoFrames, FifoFullBehavior, FifoHeader, RawFifoFrame};
use crate::register::calibration::Calibration;
use crate::register::chip_id::{ChipId, BMP384_CHIP_ID};
use crate::register::cmd::{Cmd, CmdData};
use crate::register::config::{Config, ConfigFields, IIRFilterCoefficient};
use crate::register::data::{Data, DataSample};
use crate::register::err_reg::{ErrReg, ErrorFlags};
use crate::register::event::{Event, EventFlags};
use crate::register::fifo_config::{
    FifoConfig1, FifoConfig1Fields, FifoConfig2, FifoConfig2Fields, FifoDataSource, MAX_FIFO_SUBSAMPLING,
};
use crate::register::fifo_data::FifoData;
use crate::register::fifo_length::FifoLength;
use crate::register::fifo_wtm::{FifoWtm, MAX_FIFO_WATERMARK};
use crate::register::if_conf::{I2cWatchdogTimer, IfConf, SpiWire};
use crate::register::int_ctrl::IntCtrl;
use crate::register::int_status::{IntStatus, IntStatusFlags};
use crate::register::odr::{Odr, OdrCfg, OutputDataRate};
use crate::register::osr::{Osr, OsrCfg, Oversampling};
use crate::register::pwr_ctrl::{PowerMode, PwrCtrl};
use crate::register::sensor_time::SensorTime;
use crate::register::status::{Status, StatusFlags};
use crate::register::{Readable, Reg, Writable};
use embedded_hal::i2c::SevenBitAddress;
use embedded_hal_async::delay::DelayNs;

/// Type alias for a Bmp384 chip communicating over I2C
pub type Bmp384I2c<T> = Bmp384<I2c<T>>;

/// Type alias for a Bmp384 chip communicating over SPI
pub type Bmp384Spi<T> = Bmp384<Spi<T>>;

/// Type alias used to simplify return types throughout the driver
pub type Bmp384Result<T, BusError> = Result<T, Bmp384Error<BusError>>;

/// Number of times CHIP_ID is read at start-up before giving up.
const PROBE_ATTEMPTS: u32 = 5;

/// Number of STATUS polls while waiting for the command decoder.
const COMMAND_READY_POLLS: u8 = 32;

/// Number of STATUS polls, 1 ms apart, after the typical conversion time of a forced measurement.
const DATA_READY_POLLS: u32 = 10;

/// Start-up time after a soft reset, datasheet section 1, table 2.
const SOFT_RESET_TIME_MS: u32 = 2;

/// Static information about the BMP384, see [`Bmp384::info`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChipInfo {
    pub chip_name: &'static str,
    pub manufacturer_name: &'static str,
    pub interface: &'static str,
    pub supply_voltage_min_v: f32,
    pub supply_voltage_max_v: f32,
    pub max_current_ma: f32,
    pub temperature_min_c: f32,
    pub temperature_max_c: f32,
    pub driver_version: &'static str,
}

pub const CHIP_INFO: ChipInfo = ChipInfo {
    chip_name: "BMP384",
    manufacturer_name: "Bosch",
    interface: "IIC SPI",
    supply_voltage_min_v: 1.65,
    supply_voltage_max_v: 3.6,
    max_current_ma: 0.73,
    temperature_min_c: -40.0,
    temperature_max_c: 85.0,
    driver_version: env!("CARGO_PKG_VERSION"),
};

/// Main Bmp384 driver struct
pub struct Bmp384<B> {
    bus: B,
    calibration_data: CalibrationData,
    max_measurement_time_us: u32,
}

impl<T> Bmp384I2c<T>
where
    T: embedded_hal_async::i2c::I2c,
    I2c<T>: Bus,
{
    /// Constructs a new Bmp384 driver instance with a given configuration that communicates over I2C
    ///
    /// This function will:
    /// - Probe for a connected BMP384 device.
    /// - Perform a soft reset if `reset` == [`ResetPolicy::Soft`]
    /// - Check ERR_REG for a fatal error
    /// - Load calibration coefficients from NVM
    /// - Apply the given configuration
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use embedded_hal_async::delay::DelayNs;
    /// # use embedded_hal_async::i2c::I2c;
    /// # use bmp384_rs::Bmp384Result;
    ///  use bmp384_rs::{Bmp384, SdoPinState, ResetPolicy};
    ///  use bmp384_rs::config::Configuration;
    /// # async fn demo<I: I2c, D: DelayNs>(i2c: I, mut delay: D) -> Bmp384Result<(), I::Error> {
    ///
    ///  let device = Bmp384::new_i2c(
    ///     i2c,
    ///     SdoPinState::High,
    ///     Configuration::default(),
    ///     ResetPolicy::Soft,
    ///     &mut delay
    ///  ).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new_i2c<D: DelayNs>(
        i2c: T,
        sdo_pin_state: SdoPinState,
        config: Configuration,
        reset: ResetPolicy,
        delay: &mut D,
    ) -> Bmp384Result<Self, <I2c<T> as Bus>::Error> {
        Self::new(I2c::new(i2c, sdo_pin_state.into()), config, reset, delay).await
    }

    /// The state of the SDO pin the device was addressed with.
    pub fn sdo_pin_state(&self) -> SdoPinState {
        SdoPinState::from_address(self.bus.address())
    }
}

impl<T> Bmp384Spi<T>
where
    T: embedded_hal_async::spi::SpiDevice,
    Spi<T>: Bus,
{
    /// Constructs a new Bmp384 driver instance with a given configuration that communicates over SPI
    ///
    /// Same start-up sequence as [`Bmp384::new_i2c`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use embedded_hal_async::delay::DelayNs;
    /// # use embedded_hal_async::spi::SpiDevice;
    /// # use bmp384_rs::Bmp384Result;
    ///  use bmp384_rs::{Bmp384, ResetPolicy};
    ///  use bmp384_rs::config::Configuration;
    /// # async fn demo<S: SpiDevice, D: DelayNs>(spi: S, mut delay: D) -> Bmp384Result<(), S::Error> {
    ///
    ///  let device = Bmp384::new_spi(
    ///     spi,
    ///     Configuration::default(),
    ///     ResetPolicy::Soft,
    ///     &mut delay
    ///  ).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new_spi<D: DelayNs>(
        spi: T,
        config: Configuration,
        reset: ResetPolicy,
        delay: &mut D,
    ) -> Bmp384Result<Self, <Spi<T> as Bus>::Error> {
        Self::new(Spi::new(spi), config, reset, delay).await
    }
}

impl<B> Bmp384<B>
where
    B: Bus,
{
    /// Probes if the device is ready by attempting to read ChipId `attempts` times with a 1 ms delay.
    ///
    /// Returns [`Bmp384Error::NotConnected`] if no response is received.
    async fn probe_ready<D: DelayNs>(
        bus: &mut B,
        delay: &mut D,
        attempts: u32,
    ) -> Bmp384Result<(), B::Error> {
        for attempt in 0..attempts {
            match bus.read::<ChipId>().await {
                Ok(BMP384_CHIP_ID) => return Ok(()),
                Ok(id) => debug!("unexpected chip id {:#x} on attempt {}", id, attempt),
                Err(_) => debug!("no response to chip id read on attempt {}", attempt),
            }

            delay.delay_ms(1).await;
        }

        error!("BMP384 not found after {} attempts", attempts);
        Err(Bmp384Error::NotConnected)
    }

    /// Creates a new instance of the Bmp384 driver struct with the given configuration.
    pub(crate) async fn new<D: DelayNs>(
        mut bus: B,
        config: Configuration,
        reset: ResetPolicy,
        delay: &mut D,
    ) -> Bmp384Result<Self, B::Error> {
        // The datasheet (section 1, table 2) specifies 2 ms start-up time after VDD/VDDIO > 1.8V
        Self::probe_ready(&mut bus, delay, PROBE_ATTEMPTS).await?;

        let nvm = bus.read::<Calibration>().await?;

        let mut device = Bmp384 {
            bus,
            calibration_data: CalibrationData::from_nvm(nvm),
            max_measurement_time_us: config.max_measurement_time_us(),
        };

        if reset == ResetPolicy::Soft {
            device.soft_reset(delay).await?;
        }

        if device.error_flags().await?.fatal_error() {
            error!("ERR_REG reports a fatal error");
            return Err(Bmp384Error::FatalError);
        }

        device.apply_configuration(&config).await?;
        info!("BMP384 initialized over {:?}", device.bus.interface());

        Ok(device)
    }

    /// Puts the device to sleep and hands back the bus.
    pub async fn release(mut self) -> Bmp384Result<B, B::Error> {
        self.set_mode(PowerMode::Sleep).await?;

        Ok(self.bus)
    }

    #[cfg(test)]
    pub(crate) fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Static chip information.
    pub fn info(&self) -> ChipInfo {
        CHIP_INFO
    }

    /// The serial interface the device is connected through.
    pub fn interface(&self) -> Interface {
        self.bus.interface()
    }

    /// Applies the given configuration by writing to PWR_CTRL, OSR, ODR and CONFIG.
    ///
    /// Returns [`Bmp384Error::InvalidConfiguration`] without writing anything if the oversampling
    /// settings do not fit in the output data rate period, see [`Configuration::is_valid`].
    pub async fn apply_configuration(&mut self, config: &Configuration) -> Bmp384Result<(), B::Error> {
        if !config.is_valid() {
            warn!(
                "conversion time {} us exceeds the output data rate period {} us",
                config.typical_measurement_time_us(),
                config.output_data_rate.period_us()
            );
            return Err(Bmp384Error::InvalidConfiguration);
        }

        // Oversampling, rate and filter are written while asleep, the mode goes last.
        self.modify::<PwrCtrl>(|pwr_ctrl| pwr_ctrl.mode = PowerMode::Sleep).await?;

        self.bus.write::<Osr>(&OsrCfg {
            osr_p: config.pressure_oversampling,
            osr_t: config.temperature_oversampling,
        })
            .await?;

        self.bus.write::<Odr>(&OdrCfg {
            odr_sel: config.output_data_rate,
        })
            .await?;

        self.bus.write::<Config>(&ConfigFields {
            iir_filter: config.iir_filter_coefficient,
        })
            .await?;

        self.modify::<PwrCtrl>(|pwr_ctrl| {
            pwr_ctrl.press_en = config.enable_pressure;
            pwr_ctrl.temp_en = config.enable_temperature;
            pwr_ctrl.mode = config.mode;
        })
            .await?;

        self.max_measurement_time_us = config.max_measurement_time_us();

        Ok(())
    }

    /// Read a register (or fixed-size register block) using a **typed marker**.
    ///
    /// You pass a marker type from [`crate::register`] (e.g. `register::pwr_ctrl::PwrCtrl`) and
    /// get back its decoded value (`R::Out`). Decoding fails with
    /// [`Bmp384Error::UnexpectedRegisterData`] if a reserved bit pattern is read.
    ///
    /// Some registers are cleared on read (e.g. `INT_STATUS`, `EVENT`). Consult the register docs.
    ///
    /// # Examples
    /// ```rust,no_run
    /// # use bmp384_rs::{register, Bmp384, Bmp384Result};
    /// # use bmp384_rs::bus::Bus;
    /// # async fn demo<B: Bus>(mut device: Bmp384<B>) -> Bmp384Result<(), B::Error> {
    /// use bmp384_rs::register::pwr_ctrl::{PwrCtrl, PwrCtrlCfg};
    /// let id: u8 = device.read::<register::chip_id::ChipId>().await?;
    /// assert_eq!(id, 0x50);
    /// let cfg: PwrCtrlCfg = device.read::<PwrCtrl>().await?;
    /// # Ok(()) }
    /// ```
    pub async fn read<R: Readable>(&mut self) -> Bmp384Result<R::Out, B::Error> {
        self.bus.read::<R>().await
    }

    /// Write a register (or fixed-size register block) using a **typed marker**.
    ///
    /// This performs a direct write of the provided fields. Use the convenience setters for a
    /// read-modify-write that keeps the other fields of the register.
    ///
    /// # Examples
    /// ```rust,no_run
    /// # use bmp384_rs::{Bmp384, Bmp384Result};
    /// # use bmp384_rs::bus::Bus;
    /// # async fn demo<B: Bus>(mut device: Bmp384<B>) -> Bmp384Result<(), B::Error> {
    /// use bmp384_rs::register::pwr_ctrl::{PwrCtrlCfg, PwrCtrl, PowerMode};
    /// let cfg = PwrCtrlCfg { press_en: true, temp_en: true, mode: PowerMode::Sleep };
    /// device.write::<PwrCtrl>(&cfg).await?;
    /// # Ok(()) }
    /// ```
    pub async fn write<W: Writable>(&mut self, v: &W::In) -> Bmp384Result<(), B::Error> {
        self.bus.write::<W>(v).await
    }

    /// Reads a single register by address.
    pub async fn read_register(&mut self, addr: u8) -> Bmp384Result<u8, B::Error> {
        let mut value = [0u8; 1];
        self.bus.read_raw(addr, &mut value).await.map_err(Bmp384Error::Bus)?;

        Ok(value[0])
    }

    /// Writes a single register by address.
    pub async fn write_register(&mut self, addr: u8, value: u8) -> Bmp384Result<(), B::Error> {
        self.bus.write_raw(addr, &[value]).await.map_err(Bmp384Error::Bus)
    }

    async fn modify<R>(&mut self, f: impl FnOnce(&mut R::Out)) -> Bmp384Result<(), B::Error>
    where
        R: Readable + Writable<In = <R as Readable>::Out>,
    {
        let mut value = self.bus.read::<R>().await?;
        f(&mut value);
        self.bus.write::<R>(&value).await
    }

    /// Determines if the BMP384 device is connected by attempting to read the CHIP_ID (0x00) register.
    pub async fn is_connected(&mut self) -> Bmp384Result<bool, B::Error> {
        let id = self.bus.read::<ChipId>().await?;

        Ok(id == BMP384_CHIP_ID)
    }

    /// Returns true if the command decoder is ready to accept a new command.
    pub async fn command_ready(&mut self) -> Bmp384Result<bool, B::Error> {
        Ok(self.status().await?.command_decoder_ready())
    }

    async fn wait_command_ready(&mut self, max_polls: u8) -> Bmp384Result<(), B::Error> {
        for _ in 0..max_polls {
            if self.command_ready().await? { return Ok(()) }
        }

        warn!("command decoder busy after {} polls", max_polls);
        Err(Bmp384Error::Timeout)
    }

    async fn command(&mut self, cmd: CmdData) -> Bmp384Result<(), B::Error> {
        self.wait_command_ready(COMMAND_READY_POLLS).await?;
        self.write::<Cmd>(&cmd).await?;
        self.wait_command_ready(COMMAND_READY_POLLS).await
    }

    /// Triggers a soft reset
    ///
    /// All user settings are reset to their default state and the FIFO is flushed. The command
    /// decoder has to be ready before and after the reset, otherwise [`Bmp384Error::Timeout`] is
    /// returned.
    ///
    /// **Note:** This resets the chip to factory defaults, not to the configuration that was provided when constructing the driver.
    pub async fn soft_reset<D: DelayNs>(&mut self, delay: &mut D) -> Bmp384Result<(), B::Error> {
        debug!("soft reset");
        self.wait_command_ready(COMMAND_READY_POLLS).await?;
        self.write::<Cmd>(&CmdData::SoftReset).await?;

        // The device does not answer reliably until the reset has completed.
        delay.delay_ms(SOFT_RESET_TIME_MS).await;

        self.wait_command_ready(COMMAND_READY_POLLS).await
    }

    /// Clears all frames from the FIFO. The FIFO configuration is kept.
    pub async fn flush_fifo(&mut self) -> Bmp384Result<(), B::Error> {
        self.command(CmdData::FifoFlush).await
    }

    /// Issues the `extmode_en_middle` command.
    pub async fn extmode_en_middle(&mut self) -> Bmp384Result<(), B::Error> {
        self.command(CmdData::ExtmodeEnMiddle).await
    }

    /// Returns the error flags from the ERR_REG (0x02) register.
    ///
    /// **Note:** `cmd_err` and `conf_err` are cleared upon read.
    pub async fn error_flags(&mut self) -> Bmp384Result<ErrorFlags, B::Error> {
        self.bus.read::<ErrReg>().await
    }

    /// Returns the status from the STATUS (0x03) register.
    pub async fn status(&mut self) -> Bmp384Result<StatusFlags, B::Error> {
        self.bus.read::<Status>().await
    }

    /// Returns the EVENT (0x10) register. Cleared upon read.
    pub async fn event(&mut self) -> Bmp384Result<EventFlags, B::Error> {
        self.bus.read::<Event>().await
    }

    /// Returns the 24-bit sensor time.
    pub async fn sensor_time(&mut self) -> Bmp384Result<u32, B::Error> {
        self.bus.read::<SensorTime>().await
    }

    /// Sets the power mode of the device by writing to the PWR_CTRL (0x1B) register
    ///
    /// As described in section 3.3.4 of the datasheet, these are the valid state transitions:
    ///
    /// Sleep => Normal
    ///
    /// Normal => Sleep
    ///
    /// Sleep => Forced => Sleep (Forced is a transient state and the device will return to Sleep when the measurement is finished)
    ///
    /// The device ignores any attempt to perform an invalid state transition.
    pub async fn set_mode(&mut self, mode: PowerMode) -> Bmp384Result<(), B::Error> {
        self.modify::<PwrCtrl>(|pwr_ctrl| pwr_ctrl.mode = mode).await
    }

    /// Reads the current power mode from the PWR_CTRL (0x1B) register
    pub async fn mode(&mut self) -> Bmp384Result<PowerMode, B::Error> {
        Ok(self.bus.read::<PwrCtrl>().await?.mode)
    }

    pub async fn set_pressure_enabled(&mut self, enabled: bool) -> Bmp384Result<(), B::Error> {
        self.modify::<PwrCtrl>(|pwr_ctrl| pwr_ctrl.press_en = enabled).await
    }

    pub async fn pressure_enabled(&mut self) -> Bmp384Result<bool, B::Error> {
        Ok(self.bus.read::<PwrCtrl>().await?.press_en)
    }

    pub async fn set_temperature_enabled(&mut self, enabled: bool) -> Bmp384Result<(), B::Error> {
        self.modify::<PwrCtrl>(|pwr_ctrl| pwr_ctrl.temp_en = enabled).await
    }

    pub async fn temperature_enabled(&mut self) -> Bmp384Result<bool, B::Error> {
        Ok(self.bus.read::<PwrCtrl>().await?.temp_en)
    }

    /// Returns the oversampling configuration from the OSR (0x1C) register.
    pub async fn oversampling_config(&mut self) -> Bmp384Result<OsrCfg, B::Error> {
        self.bus.read::<Osr>().await
    }

    /// Writes oversampling configuration to the OSR (0x1C) register.
    pub async fn set_oversampling_config(&mut self, oversampling: &OsrCfg) -> Bmp384Result<(), B::Error> {
        self.bus.write::<Osr>(oversampling).await
    }

    pub async fn set_pressure_oversampling(&mut self, oversampling: Oversampling) -> Bmp384Result<(), B::Error> {
        self.modify::<Osr>(|osr| osr.osr_p = oversampling).await
    }

    pub async fn pressure_oversampling(&mut self) -> Bmp384Result<Oversampling, B::Error> {
        Ok(self.oversampling_config().await?.osr_p)
    }

    pub async fn set_temperature_oversampling(&mut self, oversampling: Oversampling) -> Bmp384Result<(), B::Error> {
        self.modify::<Osr>(|osr| osr.osr_t = oversampling).await
    }

    pub async fn temperature_oversampling(&mut self) -> Bmp384Result<Oversampling, B::Error> {
        Ok(self.oversampling_config().await?.osr_t)
    }

    pub async fn set_output_data_rate(&mut self, rate: OutputDataRate) -> Bmp384Result<(), B::Error> {
        self.bus.write::<Odr>(&OdrCfg { odr_sel: rate }).await
    }

    pub async fn output_data_rate(&mut self) -> Bmp384Result<OutputDataRate, B::Error> {
        Ok(self.bus.read::<Odr>().await?.odr_sel)
    }

    pub async fn set_filter_coefficient(&mut self, coefficient: IIRFilterCoefficient) -> Bmp384Result<(), B::Error> {
        self.modify::<Config>(|config| config.iir_filter = coefficient).await
    }

    pub async fn filter_coefficient(&mut self) -> Bmp384Result<IIRFilterCoefficient, B::Error> {
        Ok(self.bus.read::<Config>().await?.iir_filter)
    }

    /// Selects 3-wire or 4-wire SPI.
    pub async fn set_spi_wire(&mut self, wire: SpiWire) -> Bmp384Result<(), B::Error> {
        self.modify::<IfConf>(|if_conf| if_conf.spi3 = wire == SpiWire::ThreeWire).await
    }

    pub async fn spi_wire(&mut self) -> Bmp384Result<SpiWire, B::Error> {
        Ok(if self.bus.read::<IfConf>().await?.spi3 {
            SpiWire::ThreeWire
        } else {
            SpiWire::FourWire
        })
    }

    pub async fn set_i2c_watchdog_enabled(&mut self, enabled: bool) -> Bmp384Result<(), B::Error> {
        self.modify::<IfConf>(|if_conf| if_conf.i2c_wdt_en = enabled).await
    }

    pub async fn i2c_watchdog_enabled(&mut self) -> Bmp384Result<bool, B::Error> {
        Ok(self.bus.read::<IfConf>().await?.i2c_wdt_en)
    }

    pub async fn set_i2c_watchdog_period(&mut self, period: I2cWatchdogTimer) -> Bmp384Result<(), B::Error> {
        self.modify::<IfConf>(|if_conf| if_conf.i2c_wdt_sel = period).await
    }

    pub async fn i2c_watchdog_period(&mut self) -> Bmp384Result<I2cWatchdogTimer, B::Error> {
        Ok(self.bus.read::<IfConf>().await?.i2c_wdt_sel)
    }

    /// Reads the latest **calibrated** pressure and temperature measurement stored in the DATA (0x04 - 0x09) registers.
    ///
    /// Ideally, you will want to call this method only when *new* measurements have been stored, otherwise you will be wasting time reading the same data multiple times.
    /// This can be achieved by using the interrupt pin on the BMP384 device and enabling the [`Interrupts::data_ready()`] interrupt using [`Bmp384::mask_interrupts()`].
    /// If for some reason you are unable to use interrupts, an option is to poll this method at a rate of [`Bmp384::max_measurement_time_us()`] microseconds.
    ///
    /// # Examples
    ///
    /// ```rust, no_run
    /// # use bmp384_rs::{Bmp384, Bmp384Result};
    /// # use bmp384_rs::bus::Bus;
    /// # async fn demo<B: Bus>(mut device: Bmp384<B>) -> Bmp384Result<(), B::Error> {
    /// let data = device.read_sensor_data().await?;
    /// println!("The current pressure and temperature is {} and {}", data.pressure, data.temperature);
    /// # Ok(()) }
    /// ```
    pub async fn read_sensor_data(&mut self) -> Bmp384Result<Measurement, B::Error> {
        let sample = self.bus.read::<Data>().await?;

        Ok(self.compensate(sample))
    }

    /// Reads the uncompensated 24-bit pressure and temperature words.
    pub async fn read_raw_data(&mut self) -> Bmp384Result<DataSample, B::Error> {
        self.bus.read::<Data>().await
    }

    /// Reads the temperature in degrees Celsius.
    pub async fn read_temperature(&mut self) -> Bmp384Result<Reading, B::Error> {
        let raw = self.bus.read::<Data>().await?.temperature();

        Ok(Reading {
            raw,
            value: self.calibration_data.compensate_temperature(raw),
        })
    }

    /// Reads the pressure in Pascal.
    ///
    /// The temperature from the same read is compensated first, since pressure compensation depends on it.
    pub async fn read_pressure(&mut self) -> Bmp384Result<Reading, B::Error> {
        let sample = self.bus.read::<Data>().await?;
        self.calibration_data.compensate_temperature(sample.temperature());

        Ok(Reading {
            raw: sample.pressure(),
            value: self.calibration_data.compensate_pressure(sample.pressure()),
        })
    }

    fn compensate(&mut self, sample: DataSample) -> Measurement {
        let temperature = self.calibration_data.compensate_temperature(sample.temperature());
        let pressure = self.calibration_data.compensate_pressure(sample.pressure());

        Measurement { pressure, temperature }
    }

    /// Performs a single forced mode conversion and returns the compensated result.
    ///
    /// The device has to be in [`PowerMode::Sleep`], otherwise [`Bmp384Error::InvalidMode`] is
    /// returned. After the typical conversion time STATUS is polled until data is ready for every
    /// enabled sensor, or [`Bmp384Error::Timeout`] is returned.
    pub async fn measure<D: DelayNs>(&mut self, delay: &mut D) -> Bmp384Result<Measurement, B::Error> {
        let mut pwr_ctrl = self.bus.read::<PwrCtrl>().await?;
        if pwr_ctrl.mode != PowerMode::Sleep {
            return Err(Bmp384Error::InvalidMode);
        }
        if !pwr_ctrl.press_en && !pwr_ctrl.temp_en {
            return Err(Bmp384Error::InvalidConfiguration);
        }

        let osr = self.bus.read::<Osr>().await?;
        let conversion_time_us =
            typical_measurement_time_us(pwr_ctrl.press_en, pwr_ctrl.temp_en, osr.osr_p, osr.osr_t);

        pwr_ctrl.mode = PowerMode::Forced;
        self.bus.write::<PwrCtrl>(&pwr_ctrl).await?;
        delay.delay_us(conversion_time_us).await;

        for _ in 0..DATA_READY_POLLS {
            let status = self.status().await?;
            let pressure_ready = !pwr_ctrl.press_en || status.pressure_data_ready();
            let temperature_ready = !pwr_ctrl.temp_en || status.temperature_data_ready();
            if pressure_ready && temperature_ready {
                return self.read_sensor_data().await;
            }

            delay.delay_ms(1).await;
        }

        warn!("forced conversion did not complete");
        Err(Bmp384Error::Timeout)
    }

    /// Returns the interrupt status from the INT_STATUS (0x11) register.
    ///
    /// Use this to determine what caused an interrupt to be generated.
    ///
    /// **Note:** The INT_STATUS register is cleared upon read.
    pub async fn interrupt_status(&mut self) -> Bmp384Result<IntStatusFlags, B::Error> {
        self.bus.read::<IntStatus>().await
    }

    /// Reads INT_STATUS and calls `handler` once for every asserted source, in the order
    /// FIFO watermark, FIFO full, data ready. Returns the flags that were read.
    ///
    /// Meant to be called when the INT pin fires.
    pub async fn handle_interrupt<F>(&mut self, mut handler: F) -> Bmp384Result<IntStatusFlags, B::Error>
    where
        F: FnMut(InterruptSource),
    {
        let flags = self.interrupt_status().await?;

        if flags.fwm_int {
            handler(InterruptSource::FifoWatermark);
        }
        if flags.ffull_int {
            handler(InterruptSource::FifoFull);
        }
        if flags.drdy {
            handler(InterruptSource::DataReady);
        }

        Ok(flags)
    }

    pub async fn set_interrupt_pin_type(&mut self, pin_type: InterruptPinType) -> Bmp384Result<(), B::Error> {
        self.modify::<IntCtrl>(|int_ctrl| int_ctrl.int_od = pin_type == InterruptPinType::OpenDrain).await
    }

    pub async fn interrupt_pin_type(&mut self) -> Bmp384Result<InterruptPinType, B::Error> {
        Ok(if self.bus.read::<IntCtrl>().await?.int_od {
            InterruptPinType::OpenDrain
        } else {
            InterruptPinType::PushPull
        })
    }

    pub async fn set_interrupt_active_level(&mut self, level: InterruptActiveLevel) -> Bmp384Result<(), B::Error> {
        self.modify::<IntCtrl>(|int_ctrl| int_ctrl.int_level = level == InterruptActiveLevel::High).await
    }

    pub async fn interrupt_active_level(&mut self) -> Bmp384Result<InterruptActiveLevel, B::Error> {
        Ok(if self.bus.read::<IntCtrl>().await?.int_level {
            InterruptActiveLevel::High
        } else {
            InterruptActiveLevel::Low
        })
    }

    /// Latches the INT pin and INT_STATUS until INT_STATUS is read.
    pub async fn set_interrupt_latch(&mut self, latch: bool) -> Bmp384Result<(), B::Error> {
        self.modify::<IntCtrl>(|int_ctrl| int_ctrl.int_latch = latch).await
    }

    pub async fn interrupt_latch(&mut self) -> Bmp384Result<bool, B::Error> {
        Ok(self.bus.read::<IntCtrl>().await?.int_latch)
    }

    pub async fn set_fifo_watermark_interrupt(&mut self, enabled: bool) -> Bmp384Result<(), B::Error> {
        self.modify::<IntCtrl>(|int_ctrl| int_ctrl.fwtm_en = enabled).await
    }

    pub async fn fifo_watermark_interrupt(&mut self) -> Bmp384Result<bool, B::Error> {
        Ok(self.bus.read::<IntCtrl>().await?.fwtm_en)
    }

    pub async fn set_fifo_full_interrupt(&mut self, enabled: bool) -> Bmp384Result<(), B::Error> {
        self.modify::<IntCtrl>(|int_ctrl| int_ctrl.ffull_en = enabled).await
    }

    pub async fn fifo_full_interrupt(&mut self) -> Bmp384Result<bool, B::Error> {
        Ok(self.bus.read::<IntCtrl>().await?.ffull_en)
    }

    pub async fn set_data_ready_interrupt(&mut self, enabled: bool) -> Bmp384Result<(), B::Error> {
        self.modify::<IntCtrl>(|int_ctrl| int_ctrl.drdy_en = enabled).await
    }

    pub async fn data_ready_interrupt(&mut self) -> Bmp384Result<bool, B::Error> {
        Ok(self.bus.read::<IntCtrl>().await?.drdy_en)
    }

    /// Masks the given interrupts so they are not reflected on the INT pin
    ///
    /// The BMP384 exposes 3 interrupts:
    /// - Data ready (DRDY)
    /// - FIFO Full
    /// - FIFO Watermark
    ///
    /// Every interrupt not in `ints` is enabled.
    ///
    /// # Examples
    /// ```rust, no_run
    /// # use bmp384_rs::{Bmp384, Bmp384Result};
    /// # use bmp384_rs::bus::Bus;
    /// # async fn demo<B: Bus>(mut device: Bmp384<B>) -> Bmp384Result<(), B::Error> {
    /// use bmp384_rs::Interrupts;
    /// // Allow all interrupts
    /// device.mask_interrupts(Interrupts::new()).await?;
    ///
    /// // Mask FIFO full and FIFO watermark, leaving only Data ready.
    /// let interrupts = Interrupts::new().fifo_full().fifo_watermark();
    /// device.mask_interrupts(interrupts).await?;
    /// # Ok(()) }
    /// ```
    pub async fn mask_interrupts(&mut self, ints: Interrupts) -> Bmp384Result<(), B::Error> {
        self.modify::<IntCtrl>(|int_ctrl| {
            int_ctrl.drdy_en = !ints.is_data_ready_set();
            int_ctrl.ffull_en = !ints.is_fifo_full_set();
            int_ctrl.fwtm_en = !ints.is_fifo_watermark_set();
        })
            .await
    }

    /// Returns the number of bytes in the FIFO buffer.
    ///
    /// The number of frames depends on the size of each frame, which varies with the FIFO configuration.
    pub async fn fifo_length(&mut self) -> Bmp384Result<u16, B::Error> {
        self.bus.read::<FifoLength>().await
    }

    /// Burst reads `buf.len()` bytes from FIFO_DATA.
    pub async fn fifo_data(&mut self, buf: &mut [u8]) -> Bmp384Result<(), B::Error> {
        self.bus
            .read_raw(<FifoData<1> as Reg>::ADDR, buf)
            .await
            .map_err(Bmp384Error::Bus)
    }

    /// Sets the FIFO watermark in bytes. Values above 511 return [`Bmp384Error::InvalidArgument`].
    pub async fn set_fifo_watermark(&mut self, watermark: u16) -> Bmp384Result<(), B::Error> {
        if watermark > MAX_FIFO_WATERMARK {
            return Err(Bmp384Error::InvalidArgument);
        }

        self.bus.write::<FifoWtm>(&watermark).await
    }

    pub async fn fifo_watermark(&mut self) -> Bmp384Result<u16, B::Error> {
        self.bus.read::<FifoWtm>().await
    }

    pub async fn set_fifo_enabled(&mut self, enabled: bool) -> Bmp384Result<(), B::Error> {
        self.modify::<FifoConfig1>(|cfg| cfg.fifo_mode = enabled).await
    }

    pub async fn fifo_enabled(&mut self) -> Bmp384Result<bool, B::Error> {
        Ok(self.bus.read::<FifoConfig1>().await?.fifo_mode)
    }

    pub async fn set_fifo_stop_on_full(&mut self, stop: bool) -> Bmp384Result<(), B::Error> {
        self.modify::<FifoConfig1>(|cfg| cfg.fifo_stop_on_full = stop).await
    }

    pub async fn fifo_stop_on_full(&mut self) -> Bmp384Result<bool, B::Error> {
        Ok(self.bus.read::<FifoConfig1>().await?.fifo_stop_on_full)
    }

    pub async fn set_fifo_sensor_time(&mut self, enabled: bool) -> Bmp384Result<(), B::Error> {
        self.modify::<FifoConfig1>(|cfg| cfg.fifo_time_en = enabled).await
    }

    pub async fn fifo_sensor_time(&mut self) -> Bmp384Result<bool, B::Error> {
        Ok(self.bus.read::<FifoConfig1>().await?.fifo_time_en)
    }

    pub async fn set_fifo_pressure(&mut self, enabled: bool) -> Bmp384Result<(), B::Error> {
        self.modify::<FifoConfig1>(|cfg| cfg.fifo_press_en = enabled).await
    }

    pub async fn fifo_pressure(&mut self) -> Bmp384Result<bool, B::Error> {
        Ok(self.bus.read::<FifoConfig1>().await?.fifo_press_en)
    }

    pub async fn set_fifo_temperature(&mut self, enabled: bool) -> Bmp384Result<(), B::Error> {
        self.modify::<FifoConfig1>(|cfg| cfg.fifo_temp_en = enabled).await
    }

    pub async fn fifo_temperature(&mut self) -> Bmp384Result<bool, B::Error> {
        Ok(self.bus.read::<FifoConfig1>().await?.fifo_temp_en)
    }

    /// Stores only every 2^`subsampling`-th sample. Values above 7 return [`Bmp384Error::InvalidArgument`].
    pub async fn set_fifo_subsampling(&mut self, subsampling: u8) -> Bmp384Result<(), B::Error> {
        if subsampling > MAX_FIFO_SUBSAMPLING {
            return Err(Bmp384Error::InvalidArgument);
        }

        self.modify::<FifoConfig2>(|cfg| cfg.fifo_subsampling = subsampling).await
    }

    pub async fn fifo_subsampling(&mut self) -> Bmp384Result<u8, B::Error> {
        Ok(self.bus.read::<FifoConfig2>().await?.fifo_subsampling)
    }

    /// Selects filtered or unfiltered FIFO data. [`FifoDataSource::Reserved`] returns [`Bmp384Error::InvalidArgument`].
    pub async fn set_fifo_data_source(&mut self, source: FifoDataSource) -> Bmp384Result<(), B::Error> {
        if source == FifoDataSource::Reserved {
            return Err(Bmp384Error::InvalidArgument);
        }

        self.modify::<FifoConfig2>(|cfg| cfg.data_select = source).await
    }

    pub async fn fifo_data_source(&mut self) -> Bmp384Result<FifoDataSource, B::Error> {
        Ok(self.bus.read::<FifoConfig2>().await?.data_select)
    }

    /// Returns the current FIFO configuration, combined from FIFO_CONFIG_1 (0x17) and FIFO_CONFIG_2 (0x18).
    pub async fn fifo_configuration(&mut self) -> Bmp384Result<FifoConfiguration, B::Error> {
        let config1 = self.read::<FifoConfig1>().await?;
        let config2 = self.read::<FifoConfig2>().await?;

        Ok(FifoConfiguration::new(
            config1.fifo_mode,
            config1.fifo_press_en,
            config1.fifo_temp_en,
            config1.fifo_time_en,
            if config1.fifo_stop_on_full {
                FifoFullBehavior::Stop
            } else {
                FifoFullBehavior::OverwriteOldest
            },
            config2.fifo_subsampling,
            config2.data_select == FifoDataSource::Filtered,
        ))
    }

    /// Writes a new FIFO configuration to FIFO_CONFIG_1 (0x17) and FIFO_CONFIG_2 (0x18).
    ///
    /// A subsampling above 7 returns [`Bmp384Error::InvalidArgument`] before anything is written.
    pub async fn set_fifo_configuration(&mut self, cfg: FifoConfiguration) -> Bmp384Result<(), B::Error> {
        if cfg.subsampling() > MAX_FIFO_SUBSAMPLING {
            return Err(Bmp384Error::InvalidArgument);
        }

        self.bus
            .write::<FifoConfig1>(&FifoConfig1Fields {
                fifo_mode: cfg.fifo_enabled(),
                fifo_stop_on_full: cfg.fifo_full_behavior() == FifoFullBehavior::Stop,
                fifo_time_en: cfg.time_enabled(),
                fifo_press_en: cfg.pressure_enabled(),
                fifo_temp_en: cfg.temperature_enabled(),
            })
            .await?;

        self.bus
            .write::<FifoConfig2>(&FifoConfig2Fields {
                fifo_subsampling: cfg.subsampling(),
                data_select: if cfg.apply_iir_filter() {
                    FifoDataSource::Filtered
                } else {
                    FifoDataSource::Unfiltered
                },
            })
            .await
    }

    /// Reads the FIFO contents into `buf` and returns the number of bytes read.
    ///
    /// Reads FIFO_LENGTH bytes, plus room for the trailing sensor time frame when it is enabled,
    /// capped at `buf.len()`. Frames cut off at the end of `buf` stay in the FIFO and are
    /// delivered again by the next read. Use [`Bmp384::parse_fifo`] to decode the result.
    ///
    /// # Examples
    /// ```rust, no_run
    /// # use bmp384_rs::{Bmp384, Bmp384Result};
    /// # use bmp384_rs::bus::Bus;
    /// # async fn demo<B: Bus>(mut device: Bmp384<B>) -> Bmp384Result<(), B::Error> {
    /// let mut buf = [0u8; 128];
    /// let n = device.read_fifo(&mut buf).await?;
    /// for frame in device.parse_fifo(&buf[..n]) {
    ///     println!("{:?}", frame?);
    /// }
    /// # Ok(()) }
    /// ```
    pub async fn read_fifo(&mut self, buf: &mut [u8]) -> Bmp384Result<usize, B::Error> {
        let length = self.fifo_length().await? as usize;
        let extra = if self.fifo_sensor_time().await? {
            crate::fifo::SENSOR_TIME_FRAME_LEN
        } else {
            0
        };

        let n = (length + extra).min(buf.len());
        if n == 0 {
            return Ok(0);
        }

        trace!("reading {} of {} FIFO bytes", n, length);
        self.fifo_data(&mut buf[..n]).await?;

        Ok(n)
    }

    /// Walks the frames in a buffer filled by [`Bmp384::read_fifo`] and compensates them with the
    /// device calibration.
    pub fn parse_fifo<'a>(&'a mut self, data: &'a [u8]) -> FifoFrames<'a, B::Error> {
        FifoFrames::new(data, &mut self.calibration_data)
    }

    /// Returns a frame from the FIFO
    ///
    /// Note that the FIFO needs to be enabled in order for frames to be written to it, but it is still possible to read out frames even when the FIFO is disabled.
    /// If there are no frames ([`Bmp384::fifo_length`] == 0) one of two things will happen:
    /// - If sensor timestamps are enabled ([`FifoConfiguration::set_time_enabled`]) then a [`FifoFrame::SensorFrame`] with a value of [`SensorFrameType::SensorTime`](crate::fifo::SensorFrameType::SensorTime) is returned.
    /// - If sensor timestamps are disabled, a [`FifoFrame::SensorFrame`] with a value of [`SensorFrameType::Empty`](crate::fifo::SensorFrameType::Empty) is returned.
    ///
    /// Timestamps are not stored in the FIFO, they are only appended after the *last* frame.
    pub async fn read_fifo_frame(&mut self) -> Bmp384Result<FifoFrame, B::Error> {
        let raw_header = self.bus.read::<FifoData<1>>().await?[0];
        let header = FifoHeader::from(raw_header);

        // The header cannot be read on its own and continued in the same burst, so the whole
        // frame is read again. A partially read frame stays in the FIFO.
        let raw = match header.frame_len() {
            Some(2) => RawFifoFrame::decode(header, &self.bus.read::<FifoData<2>>().await?),
            Some(4) => RawFifoFrame::decode(header, &self.bus.read::<FifoData<4>>().await?),
            Some(7) => RawFifoFrame::decode(header, &self.bus.read::<FifoData<7>>().await?),
            _ => None,
        };

        match raw {
            Some(raw) => Ok(raw.compensate(&mut self.calibration_data)),
            None => {
                warn!("unknown FIFO frame header {:#x}", raw_header);
                Err(Bmp384Error::UnexpectedFifoData)
            }
        }
    }

    /// Returns the estimated maximum measurement time in microseconds for the applied configuration.
    ///
    /// Section 3.9.2 of the datasheet holds the equation for the *typical* measurement time. The
    /// value returned from this method is that value multiplied by 1.2.
    pub fn max_measurement_time_us(&self) -> u32 {
        self.max_measurement_time_us
    }
}

/// This enum should reflect the physical state of the SDO pin. This is used to determine the I2C address
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SdoPinState {
    /// SDO is pulled high by connection to VDDIO
    High,
    /// SDO is pulled low by connection to GND
    Low,
}

impl SdoPinState {
    fn from_address(address: SevenBitAddress) -> Self {
        if address == 0x76 {
            SdoPinState::Low
        } else {
            SdoPinState::High
        }
    }
}

impl From<SdoPinState> for SevenBitAddress {
    fn from(state: SdoPinState) -> Self {
        match state {
            SdoPinState::High => 0x77,
            SdoPinState::Low => 0x76,
        }
    }
}

/// A set of BMP384 interrupts, passed to [`Bmp384::mask_interrupts`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Interrupts(u8);

impl Interrupts {
    const FIFO_FULL: u8 = 1 << 0;
    const FIFO_WATERMARK: u8 = 1 << 1;
    const DATA_READY: u8 = 1 << 2;

    /// Creates a new instance with no interrupts chosen.
    pub fn new() -> Self {
        Self(0)
    }

    /// Add the FIFO full interrupt to this set.
    ///
    /// See datasheet section 3.7.5.2 for more information.
    pub fn fifo_full(mut self) -> Self {
        self.0 |= Self::FIFO_FULL;

        self
    }

    /// Add the FIFO watermark interrupt to this set.
    ///
    /// The FIFO watermark interrupt is used to signal that the number of unread bytes in the FIFO has reached
    /// a pre-set limit. This limit is set by using [`Bmp384::set_fifo_watermark`].
    pub fn fifo_watermark(mut self) -> Self {
        self.0 |= Self::FIFO_WATERMARK;

        self
    }

    /// Add the data ready (DRDY) interrupt to this set.
    pub fn data_ready(mut self) -> Self {
        self.0 |= Self::DATA_READY;

        self
    }

    /// Remove all interrupts from the set.
    pub fn none(mut self) -> Self {
        self.0 = 0;

        self
    }

    pub(crate) fn is_data_ready_set(&self) -> bool {
        self.0 & Self::DATA_READY != 0
    }

    pub(crate) fn is_fifo_watermark_set(&self) -> bool {
        self.0 & Self::FIFO_WATERMARK != 0
    }

    pub(crate) fn is_fifo_full_set(&self) -> bool {
        self.0 & Self::FIFO_FULL != 0
    }
}

/// An interrupt source reported by [`Bmp384::handle_interrupt`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterruptSource {
    FifoWatermark,
    FifoFull,
    DataReady,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterruptPinType {
    PushPull,
    OpenDrain,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterruptActiveLevel {
    Low,
    High,
}

/// Holds calibrated pressure (Pa) and temperature (°C) samples.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurement {
    pub pressure: f32,
    pub temperature: f32,
}

#[cfg(feature = "uom")]
impl Measurement {
    pub fn pressure_uom(&self) -> uom::si::f32::Pressure {
        uom::si::f32::Pressure::new::<uom::si::pressure::pascal>(self.pressure)
    }

    pub fn temperature_uom(&self) -> uom::si::f32::ThermodynamicTemperature {
        uom::si::f32::ThermodynamicTemperature::new::<uom::si::thermodynamic_temperature::degree_celsius>(self.temperature)
    }
}

/// A single compensated value together with the raw 24-bit word it was computed from.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    pub raw: u32,
    pub value: f32,
}

/// What to do at startup before applying [`Configuration`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResetPolicy {
    /// Issue CMD=0xB6 and wait for `STATUS.cmd_rdy` (recommended default).
    Soft,
    /// Don’t reset; leave the chip as-is (faster resume, preserves FIFO/IIR history).
    None,
}
