//! Compensation of raw measurements using the trimming coefficients stored in the device NVM.
//!
//! The formulas are the floating point variants from the BMP384 datasheet, section 8.
use crate::register::calibration::CalibrationNvm;

/// Calibration coefficients converted to floating point, plus the linearised temperature of the
/// last compensated temperature sample.
///
/// Pressure compensation depends on the current temperature, so
/// [`compensate_temperature`](CalibrationData::compensate_temperature) should be called with the
/// temperature of the same conversion before [`compensate_pressure`](CalibrationData::compensate_pressure).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CalibrationData {
    par_t1: f32,
    par_t2: f32,
    par_t3: f32,
    par_p1: f32,
    par_p2: f32,
    par_p3: f32,
    par_p4: f32,
    par_p5: f32,
    par_p6: f32,
    par_p7: f32,
    par_p8: f32,
    par_p9: f32,
    par_p10: f32,
    par_p11: f32,
    t_lin: f32,
}

impl CalibrationData {
    pub fn from_nvm(nvm: CalibrationNvm) -> Self {
        Self {
            par_t1: (nvm.nvm_par_t1 as f32) / 0.00390625,
            par_t2: (nvm.nvm_par_t2 as f32) / 1073741824.0,
            par_t3: (nvm.nvm_par_t3 as f32) / 281474976710656.0,
            par_p1: (nvm.nvm_par_p1 as f32 - 16384.0) / 1048576.0,
            par_p2: (nvm.nvm_par_p2 as f32 - 16384.0) / 536870912.0,
            par_p3: (nvm.nvm_par_p3 as f32) / 4294967296.0,
            par_p4: (nvm.nvm_par_p4 as f32) / 137438953472.0,
            par_p5: (nvm.nvm_par_p5 as f32) / 0.125,
            par_p6: (nvm.nvm_par_p6 as f32) / 64.0,
            par_p7: (nvm.nvm_par_p7 as f32) / 256.0,
            par_p8: (nvm.nvm_par_p8 as f32) / 32768.0,
            par_p9: (nvm.nvm_par_p9 as f32) / 281474976710656.0,
            par_p10: (nvm.nvm_par_p10 as f32) / 281474976710656.0,
            par_p11: (nvm.nvm_par_p11 as f32) / 36893488147419103232.0,
            t_lin: 0.0,
        }
    }

    /// Compensates a raw 24-bit temperature sample. Returns degrees Celsius.
    pub fn compensate_temperature(&mut self, temp: u32) -> f32 {
        let partial_data1 = temp as f32 - self.par_t1;
        let partial_data2 = partial_data1 * self.par_t2;

        self.t_lin = partial_data2 + (partial_data1 * partial_data1) * self.par_t3;

        self.t_lin
    }

    /// Compensates a raw 24-bit pressure sample against the last compensated temperature. Returns Pascal.
    pub fn compensate_pressure(&self, pressure: u32) -> f32 {
        let pressure = pressure as f32;
        let t_lin = self.t_lin;
        let t_lin2 = t_lin * t_lin;
        let t_lin3 = t_lin2 * t_lin;

        let offset = self.par_p5 + self.par_p6 * t_lin + self.par_p7 * t_lin2 + self.par_p8 * t_lin3;
        let sensitivity = pressure * (self.par_p1 + self.par_p2 * t_lin + self.par_p3 * t_lin2 + self.par_p4 * t_lin3);

        let pressure2 = pressure * pressure;
        let non_linear = pressure2 * (self.par_p9 + self.par_p10 * t_lin)
            + (pressure2 * pressure) * self.par_p11;

        offset + sensitivity + non_linear
    }

    /// The linearised temperature of the last compensated temperature sample.
    pub fn t_lin(&self) -> f32 {
        self.t_lin
    }
}
