use crate::typestate::{OutputConfig, Pressure, PressureAndTemperature, Temperature};
use crate::Measurement;
use core::fmt::{Debug, Formatter};
use core::marker::PhantomData;

/// A compensated sample that only exposes the quantities enabled by `Out`.
#[derive(Copy, Clone, PartialEq)]
pub struct Sample<Out> {
    temperature_c: f32,
    pressure_pa: f32,
    _phantom: PhantomData<Out>,
}

impl<Out> Sample<Out> {
    pub fn new(temperature_c: f32, pressure_pa: f32) -> Self {
        Self { temperature_c, pressure_pa, _phantom: PhantomData }
    }
}

impl<Out> From<Measurement> for Sample<Out> {
    fn from(m: Measurement) -> Self {
        Self::new(m.temperature, m.pressure)
    }
}

impl<Out: OutputConfig> Debug for Sample<Out> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        let mut s = f.debug_struct("Sample");
        if Out::PRESSURE {
            s.field("pressure_pa", &self.pressure_pa);
        }
        if Out::TEMPERATURE {
            s.field("temperature_c", &self.temperature_c);
        }
        s.finish()
    }
}

impl Sample<Pressure> {
    pub fn pressure_pascal(&self) -> f32 {
        self.pressure_pa
    }
}

impl Sample<Temperature> {
    pub fn temperature_celsius(&self) -> f32 {
        self.temperature_c
    }
}

impl Sample<PressureAndTemperature> {
    pub fn pressure_pascal(&self) -> f32 {
        self.pressure_pa
    }

    pub fn temperature_celsius(&self) -> f32 {
        self.temperature_c
    }
}

#[cfg(feature = "uom")]
mod uom_ext {
    use super::*;
    use uom::si::f32::{Pressure as UomPressure, ThermodynamicTemperature};
    use uom::si::pressure::pascal;
    use uom::si::thermodynamic_temperature::degree_celsius;

    impl Sample<Pressure> {
        pub fn pressure_uom(&self) -> UomPressure {
            UomPressure::new::<pascal>(self.pressure_pa)
        }
    }

    impl Sample<Temperature> {
        pub fn temperature_uom(&self) -> ThermodynamicTemperature {
            ThermodynamicTemperature::new::<degree_celsius>(self.temperature_c)
        }
    }

    impl Sample<PressureAndTemperature> {
        pub fn pressure_uom(&self) -> UomPressure {
            UomPressure::new::<pascal>(self.pressure_pa)
        }

        pub fn temperature_uom(&self) -> ThermodynamicTemperature {
            ThermodynamicTemperature::new::<degree_celsius>(self.temperature_c)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_exposes_enabled_quantities() {
        let m = Measurement { pressure: 101325.0, temperature: 21.5 };

        let both: Sample<PressureAndTemperature> = Sample::from(m);
        assert_eq!(101325.0, both.pressure_pascal());
        assert_eq!(21.5, both.temperature_celsius());

        let pressure: Sample<Pressure> = Sample::from(m);
        assert_eq!(101325.0, pressure.pressure_pascal());

        let temperature: Sample<Temperature> = Sample::from(m);
        assert_eq!(21.5, temperature.temperature_celsius());
    }
}
