//! FIFO configuration and frame decoding.
//!
//! The BMP384 FIFO stores frames of varying length, each starting with a one byte header:
//!
//! | Header | Frame                      | Length |
//! |--------|----------------------------|--------|
//! | `0x94` | temperature + pressure     | 7      |
//! | `0x90` | temperature                | 4      |
//! | `0x84` | pressure                   | 4      |
//! | `0xA0` | sensor time                | 4      |
//! | `0x80` | empty (FIFO drained)       | 2      |
//! | `0x44` | configuration error        | 2      |
//! | `0x48` | configuration change       | 2      |
//!
//! Reading a frame only partially leaves it in the FIFO, so it is delivered again by the next read.
use crate::calibration::CalibrationData;
use crate::error::Bmp384Error;
use core::marker::PhantomData;

/// Size of the FIFO buffer in bytes.
pub const FIFO_SIZE: usize = 512;

/// Longest frame, temperature + pressure.
pub const MAX_FRAME_LEN: usize = 7;

/// Bytes appended to a drained FIFO when sensor time frames are enabled.
pub const SENSOR_TIME_FRAME_LEN: usize = 4;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FifoConfiguration {
    fifo_enabled: bool,
    pressure_enabled: bool,
    temperature_enabled: bool,
    time_enabled: bool,
    full_behavior: FifoFullBehavior,
    subsampling: u8,
    apply_iir_filter: bool,
}

/// Matches the reset values of FIFO_CONFIG_1 and FIFO_CONFIG_2.
impl Default for FifoConfiguration {
    fn default() -> Self {
        Self {
            fifo_enabled: false,
            pressure_enabled: false,
            temperature_enabled: false,
            time_enabled: false,
            full_behavior: FifoFullBehavior::Stop,
            subsampling: 0x02,
            apply_iir_filter: false,
        }
    }
}

impl FifoConfiguration {
    pub fn new(
        fifo_enabled: bool,
        pressure_enabled: bool,
        temperature_enabled: bool,
        time_enabled: bool,
        full_behavior: FifoFullBehavior,
        subsampling: u8,
        apply_iir_filter: bool,
    ) -> Self {
        Self {
            fifo_enabled,
            pressure_enabled,
            temperature_enabled,
            time_enabled,
            full_behavior,
            subsampling,
            apply_iir_filter,
        }
    }

    pub fn fifo_enabled(&self) -> bool { self.fifo_enabled }

    pub fn set_fifo_enabled(mut self, enabled: bool) -> Self {
        self.fifo_enabled = enabled;

        self
    }

    pub fn pressure_enabled(&self) -> bool { self.pressure_enabled }

    pub fn set_pressure_enabled(mut self, enabled: bool) -> Self {
        self.pressure_enabled = enabled;

        self
    }

    pub fn temperature_enabled(&self) -> bool { self.temperature_enabled }

    pub fn set_temperature_enabled(mut self, enabled: bool) -> Self {
        self.temperature_enabled = enabled;

        self
    }

    /// Whether a sensor time frame is appended once the FIFO has been read empty.
    pub fn time_enabled(&self) -> bool { self.time_enabled }

    pub fn set_time_enabled(mut self, enabled: bool) -> Self {
        self.time_enabled = enabled;

        self
    }

    pub fn fifo_full_behavior(&self) -> FifoFullBehavior { self.full_behavior }

    pub fn set_fifo_full_behavior(mut self, behavior: FifoFullBehavior) -> Self {
        self.full_behavior = behavior;

        self
    }

    /// Only every 2^subsampling-th sample is stored.
    pub fn subsampling(&self) -> u8 { self.subsampling }

    /// Values above 7 are rejected with [`Bmp384Error::InvalidArgument`] when the configuration is written.
    pub fn set_subsampling(mut self, subsampling: u8) -> Self {
        self.subsampling = subsampling;

        self
    }

    /// Whether the FIFO stores IIR filtered data.
    pub fn apply_iir_filter(&self) -> bool { self.apply_iir_filter }

    pub fn set_apply_iir_filter(mut self, apply_iir_filter: bool) -> Self {
        self.apply_iir_filter = apply_iir_filter;

        self
    }

    /// Size of one sensor frame with this configuration, or `None` if no sensor data is stored.
    pub fn frame_len(&self) -> Option<usize> {
        match (self.pressure_enabled, self.temperature_enabled) {
            (true, true) => Some(7),
            (true, false) | (false, true) => Some(4),
            (false, false) => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FifoFullBehavior {
    /// Stop storing frames once the FIFO is full.
    Stop,
    /// Keep storing frames, discarding the oldest.
    OverwriteOldest,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct FifoHeader {
    pub fh_mode: u8,
    pub fh_param: u8,
}

impl FifoHeader {
    const SENSOR: u8 = 0b10;
    const CONTROL: u8 = 0b01;

    pub fn is_sensor_frame(&self) -> bool {
        self.fh_mode == Self::SENSOR
    }

    pub fn is_control_frame(&self) -> bool {
        self.fh_mode == Self::CONTROL
    }

    pub fn sensor_time_flag(&self) -> bool {
        (self.fh_param & 0b1000) != 0
    }

    pub fn temperature_flag(&self) -> bool {
        (self.fh_param & 0b0100) != 0
    }

    pub fn pressure_flag(&self) -> bool {
        (self.fh_param & 0b0001) != 0
    }

    pub fn config_error_flag(&self) -> bool {
        self.fh_param == 0b0001
    }

    pub fn config_change_flag(&self) -> bool {
        self.fh_param == 0b0010
    }

    /// Total frame length including the header, or `None` for a header the BMP384 never emits.
    pub fn frame_len(&self) -> Option<usize> {
        if self.is_control_frame() {
            (self.config_error_flag() || self.config_change_flag()).then_some(2)
        } else if self.is_sensor_frame() {
            match (self.sensor_time_flag(), self.temperature_flag(), self.pressure_flag()) {
                (true, false, false) => Some(SENSOR_TIME_FRAME_LEN),
                (false, true, true) => Some(7),
                (false, true, false) | (false, false, true) => Some(4),
                // Bit 1 of fh_param is reserved and only the plain empty header is valid.
                (false, false, false) if self.fh_param == 0 => Some(2),
                _ => None,
            }
        } else {
            None
        }
    }
}

impl From<u8> for FifoHeader {
    fn from(raw: u8) -> Self {
        FifoHeader {
            fh_mode: (raw & 0b1100_0000) >> 6,
            fh_param: (raw & 0b0011_1100) >> 2,
        }
    }
}

/// A FIFO frame before compensation. Sensor values are raw 24-bit words.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RawFifoFrame {
    SensorTime(u32),
    Pressure(u32),
    Temperature(u32),
    PressureAndTemperature { pressure: u32, temperature: u32 },
    Empty,
    ConfigError,
    ConfigChange,
}

impl RawFifoFrame {
    /// Decodes a complete frame. `frame` must hold exactly [`FifoHeader::frame_len`] bytes.
    pub(crate) fn decode(header: FifoHeader, frame: &[u8]) -> Option<Self> {
        let word = |i: usize| u32::from_le_bytes([frame[i], frame[i + 1], frame[i + 2], 0]);

        if header.frame_len()? != frame.len() {
            return None;
        }

        let raw = if header.is_control_frame() {
            if header.config_error_flag() {
                RawFifoFrame::ConfigError
            } else {
                RawFifoFrame::ConfigChange
            }
        } else if header.sensor_time_flag() {
            RawFifoFrame::SensorTime(word(1))
        } else {
            match (header.temperature_flag(), header.pressure_flag()) {
                // Temperature is stored before pressure.
                (true, true) => RawFifoFrame::PressureAndTemperature {
                    temperature: word(1),
                    pressure: word(4),
                },
                (true, false) => RawFifoFrame::Temperature(word(1)),
                (false, true) => RawFifoFrame::Pressure(word(1)),
                (false, false) => RawFifoFrame::Empty,
            }
        };

        Some(raw)
    }

    /// Compensates sensor values. Temperature is compensated first so pressure in the same frame
    /// uses it.
    pub(crate) fn compensate(self, calibration: &mut CalibrationData) -> FifoFrame {
        match self {
            RawFifoFrame::SensorTime(t) => FifoFrame::SensorFrame(SensorFrameType::SensorTime(t)),
            RawFifoFrame::Pressure(p) => FifoFrame::SensorFrame(SensorFrameType::Pressure(
                calibration.compensate_pressure(p),
            )),
            RawFifoFrame::Temperature(t) => FifoFrame::SensorFrame(SensorFrameType::Temperature(
                calibration.compensate_temperature(t),
            )),
            RawFifoFrame::PressureAndTemperature { pressure, temperature } => {
                let temperature = calibration.compensate_temperature(temperature);
                let pressure = calibration.compensate_pressure(pressure);
                FifoFrame::SensorFrame(SensorFrameType::PressureAndTemperature { pressure, temperature })
            }
            RawFifoFrame::Empty => FifoFrame::SensorFrame(SensorFrameType::Empty),
            RawFifoFrame::ConfigError => FifoFrame::ControlFrame(ControlFrameType::ConfigError),
            RawFifoFrame::ConfigChange => FifoFrame::ControlFrame(ControlFrameType::ConfigChange),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FifoFrame {
    SensorFrame(SensorFrameType),
    ControlFrame(ControlFrameType),
}

/// Compensated sensor frames. Pressure is in Pascal and temperature in degrees Celsius.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorFrameType {
    SensorTime(u32),
    Pressure(f32),
    Temperature(f32),
    PressureAndTemperature {
        pressure: f32,
        temperature: f32,
    },
    Empty,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlFrameType {
    ConfigError,
    ConfigChange,
}

/// Iterator over the raw frames in a buffer read from FIFO_DATA.
///
/// The walk ends after an empty frame or a sensor time frame, since both mark the end of the FIFO
/// contents. A frame cut off by the end of the buffer ends the walk without an item. An unknown
/// header yields `Err(header)` once and then ends the walk, as the frame boundaries are lost.
pub struct RawFifoFrames<'a> {
    data: &'a [u8],
    done: bool,
}

impl<'a> RawFifoFrames<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, done: false }
    }

    /// Bytes not consumed by the frames yielded so far.
    pub fn remaining(&self) -> &'a [u8] {
        self.data
    }
}

impl Iterator for RawFifoFrames<'_> {
    type Item = Result<RawFifoFrame, u8>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let raw_header = *self.data.first()?;
        let header = FifoHeader::from(raw_header);

        let Some(len) = header.frame_len() else {
            warn!("unknown FIFO frame header {:?}", raw_header);
            self.done = true;
            return Some(Err(raw_header));
        };

        if self.data.len() < len {
            trace!("partial FIFO frame, {} of {} bytes", self.data.len(), len);
            self.done = true;
            return None;
        }

        let (frame, rest) = self.data.split_at(len);
        self.data = rest;

        let raw = RawFifoFrame::decode(header, frame)?;
        if matches!(raw, RawFifoFrame::Empty | RawFifoFrame::SensorTime(_)) {
            self.done = true;
        }

        Some(Ok(raw))
    }
}

/// Iterator over compensated frames, returned by [`Bmp384::parse_fifo`](crate::Bmp384::parse_fifo).
pub struct FifoFrames<'a, BusError> {
    raw: RawFifoFrames<'a>,
    calibration: &'a mut CalibrationData,
    _bus_error: PhantomData<BusError>,
}

impl<'a, BusError> FifoFrames<'a, BusError> {
    pub(crate) fn new(data: &'a [u8], calibration: &'a mut CalibrationData) -> Self {
        Self {
            raw: RawFifoFrames::new(data),
            calibration,
            _bus_error: PhantomData,
        }
    }
}

impl<BusError> Iterator for FifoFrames<'_, BusError> {
    type Item = Result<FifoFrame, Bmp384Error<BusError>>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(match self.raw.next()? {
            Ok(raw) => Ok(raw.compensate(self.calibration)),
            Err(_) => Err(Bmp384Error::UnexpectedFifoData),
        })
    }
}
