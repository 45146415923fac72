//! Runtime configuration applied to the device by [`Bmp384::apply_configuration`](crate::Bmp384::apply_configuration).
use crate::register::config::IIRFilterCoefficient;
use crate::register::odr::OutputDataRate;
use crate::register::osr::Oversampling;
use crate::register::pwr_ctrl::PowerMode;

/// Measurement settings written to PWR_CTRL, OSR, ODR and CONFIG.
///
/// The default enables both sensors in [`PowerMode::Normal`] at 50 Hz with x8 pressure and x1
/// temperature oversampling and an IIR filter coefficient of 15.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Configuration {
    pub(crate) enable_pressure: bool,
    pub(crate) enable_temperature: bool,
    pub(crate) mode: PowerMode,
    pub(crate) output_data_rate: OutputDataRate,
    pub(crate) pressure_oversampling: Oversampling,
    pub(crate) temperature_oversampling: Oversampling,
    pub(crate) iir_filter_coefficient: IIRFilterCoefficient,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            enable_pressure: true,
            enable_temperature: true,
            mode: PowerMode::Normal,
            output_data_rate: OutputDataRate::R50Hz,
            iir_filter_coefficient: IIRFilterCoefficient::Coef15,
            pressure_oversampling: Oversampling::X8,
            temperature_oversampling: Oversampling::X1,
        }
    }
}

impl Configuration {
    pub fn enable_pressure_measurement(mut self, enable: bool) -> Self {
        self.enable_pressure = enable;

        self
    }

    /// Enables or disables temperature measurements.
    ///
    /// Pressure compensation depends on the temperature of the same conversion, so disabling it
    /// leaves pressure compensated against the last temperature read.
    pub fn enable_temperature_measurement(mut self, enable: bool) -> Self {
        self.enable_temperature = enable;

        self
    }

    pub fn power_mode(mut self, power_mode: PowerMode) -> Self {
        self.mode = power_mode;

        self
    }

    pub fn output_data_rate(mut self, output_data_rate: OutputDataRate) -> Self {
        self.output_data_rate = output_data_rate;

        self
    }

    pub fn iir_filter_coefficient(mut self, filter_coefficient: IIRFilterCoefficient) -> Self {
        self.iir_filter_coefficient = filter_coefficient;

        self
    }

    pub fn pressure_oversampling(mut self, pressure_oversampling: Oversampling) -> Self {
        self.pressure_oversampling = pressure_oversampling;

        self
    }

    pub fn temperature_oversampling(mut self, temperature_oversampling: Oversampling) -> Self {
        self.temperature_oversampling = temperature_oversampling;

        self
    }

    pub fn pressure_enabled(&self) -> bool { self.enable_pressure }
    pub fn temperature_enabled(&self) -> bool { self.enable_temperature }
    pub fn mode(&self) -> PowerMode { self.mode }

    /// Typical conversion time for these settings, see [`typical_measurement_time_us`].
    pub fn typical_measurement_time_us(&self) -> u32 {
        typical_measurement_time_us(
            self.enable_pressure,
            self.enable_temperature,
            self.pressure_oversampling,
            self.temperature_oversampling,
        )
    }

    /// Estimated worst case conversion time for these settings, see [`max_measurement_time_us`].
    pub fn max_measurement_time_us(&self) -> u32 {
        max_measurement_time_us(
            self.enable_pressure,
            self.enable_temperature,
            self.pressure_oversampling,
            self.temperature_oversampling,
        )
    }

    /// Returns true if the device can run these settings without flagging a configuration error.
    ///
    /// In [`PowerMode::Normal`] a conversion has to finish within one output data rate period.
    /// Sleep and forced mode are always valid.
    pub fn is_valid(&self) -> bool {
        self.mode != PowerMode::Normal
            || self.typical_measurement_time_us() <= self.output_data_rate.period_us()
    }

    pub fn from_preset(p: Preset) -> Self {
        match p {
            Preset::HandheldLowPower => Configuration::default()
                .iir_filter_coefficient(IIRFilterCoefficient::Coef3)
                .output_data_rate(OutputDataRate::R12p5Hz),
            Preset::HandheldDynamic => Configuration::default()
                .pressure_oversampling(Oversampling::X4),
            Preset::WeatherMonitoring => Configuration::default()
                .power_mode(PowerMode::Forced)
                .pressure_oversampling(Oversampling::X1)
                .iir_filter_coefficient(IIRFilterCoefficient::Coef0)
                .output_data_rate(OutputDataRate::R0p01Hz),
            Preset::DropDetection => Configuration::default()
                .pressure_oversampling(Oversampling::X2)
                .iir_filter_coefficient(IIRFilterCoefficient::Coef0)
                .output_data_rate(OutputDataRate::R100Hz),
            Preset::IndoorNavigation => Configuration::default()
                .pressure_oversampling(Oversampling::X16)
                .temperature_oversampling(Oversampling::X2)
                .iir_filter_coefficient(IIRFilterCoefficient::Coef15)
                .output_data_rate(OutputDataRate::R25Hz),
            Preset::Drone => Configuration::default()
                .iir_filter_coefficient(IIRFilterCoefficient::Coef3),
            Preset::IndoorLocalization => Configuration::default()
                .pressure_oversampling(Oversampling::X1)
                .output_data_rate(OutputDataRate::R0p78Hz),
            Preset::Interrupt => Configuration::default()
                .pressure_oversampling(Oversampling::X32)
                .temperature_oversampling(Oversampling::X2)
                .iir_filter_coefficient(IIRFilterCoefficient::Coef15)
                .output_data_rate(OutputDataRate::R12p5Hz),
        }
    }
}

/// Recommended settings for common use cases, see table 10 in the datasheet.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Preset {
    HandheldLowPower,
    HandheldDynamic,
    WeatherMonitoring,
    DropDetection,
    IndoorNavigation,
    Drone,
    IndoorLocalization,
    /// Highest pressure resolution at 12.5 Hz, meant to be read on the data ready interrupt.
    Interrupt,
}

/// Typical conversion time in microseconds, from section 3.9.2 of the datasheet.
pub fn typical_measurement_time_us(
    pressure_enabled: bool,
    temperature_enabled: bool,
    pressure_oversampling: Oversampling,
    temperature_oversampling: Oversampling,
) -> u32 {
    234u32
        + pressure_enabled as u32 * (392 + pressure_oversampling.factor() * 2020)
        + temperature_enabled as u32 * (163 + temperature_oversampling.factor() * 2020)
}

/// Estimated maximum conversion time in microseconds.
///
/// The datasheet only gives an equation for the typical time. Scaling it by 1.2 stays above the
/// maximum times listed in table 23.
pub fn max_measurement_time_us(
    pressure_enabled: bool,
    temperature_enabled: bool,
    pressure_oversampling: Oversampling,
    temperature_oversampling: Oversampling,
) -> u32 {
    let typical = typical_measurement_time_us(
        pressure_enabled,
        temperature_enabled,
        pressure_oversampling,
        temperature_oversampling,
    );

    typical + typical / 5
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRESETS: [Preset; 8] = [
        Preset::HandheldLowPower,
        Preset::HandheldDynamic,
        Preset::WeatherMonitoring,
        Preset::DropDetection,
        Preset::IndoorNavigation,
        Preset::Drone,
        Preset::IndoorLocalization,
        Preset::Interrupt,
    ];

    #[test]
    fn default_configuration() {
        let config = Configuration::default();
        assert!(config.pressure_enabled());
        assert!(config.temperature_enabled());
        assert_eq!(PowerMode::Normal, config.mode());
        assert!(config.is_valid());
    }

    #[test]
    fn presets_are_valid() {
        for preset in PRESETS {
            assert!(Configuration::from_preset(preset).is_valid(), "{:?}", preset);
        }
    }

    #[test]
    fn oversampling_too_slow_for_rate_is_invalid() {
        let config = Configuration::default()
            .pressure_oversampling(Oversampling::X32)
            .output_data_rate(OutputDataRate::R200Hz);
        assert!(!config.is_valid());

        // The same settings are fine when the device is not free running.
        assert!(config.power_mode(PowerMode::Forced).is_valid());
        assert!(config.power_mode(PowerMode::Sleep).is_valid());
    }

    #[test]
    fn typical_measurement_time() {
        assert_eq!(234, typical_measurement_time_us(false, false, Oversampling::X1, Oversampling::X1));
        assert_eq!(234 + 392 + 2020 + 163 + 2020, typical_measurement_time_us(true, true, Oversampling::X1, Oversampling::X1));
        assert_eq!(
            234 + 392 + 32 * 2020 + 163 + 2 * 2020,
            Configuration::from_preset(Preset::Interrupt).typical_measurement_time_us()
        );
    }

    #[test]
    fn maximum_measurement_time() {
        // Lower bounds are the maximum times in datasheet table 23.
        let cases = [
            (Oversampling::X1, Oversampling::X1, 5700),
            (Oversampling::X2, Oversampling::X1, 7960),
            (Oversampling::X4, Oversampling::X1, 12480),
            (Oversampling::X8, Oversampling::X1, 21530),
            (Oversampling::X16, Oversampling::X2, 41890),
            (Oversampling::X32, Oversampling::X2, 78090),
        ];

        for (osr_p, osr_t, bound) in cases {
            assert!(max_measurement_time_us(true, true, osr_p, osr_t) > bound);
        }
    }
}
