use crate::bus::Bus;
use crate::fifo::{ControlFrameType, FifoConfiguration, FifoFrame, SensorFrameType, FIFO_SIZE, SENSOR_TIME_FRAME_LEN};
use crate::typestate::{OutputConfig, Sample, TypeStateError, TypeStateResult};
use crate::{Bmp384, Bmp384Error, Bmp384Result, Interrupts};
use core::fmt::{Debug, Formatter};
use core::marker::PhantomData;
use embedded_hal::digital::InputPin;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::digital::Wait;

/// Represents a BMP384 measuring in normal mode with the FIFO enabled.
///
/// While [`ForcedDevice`](crate::typestate::ForcedDevice) and [`NormalDevice`](crate::typestate::NormalDevice)
/// hand out one sample at a time, [`FifoDevice`] puts a queue abstraction on top of the 512 byte FIFO.
///
/// # Examples
///
/// ```rust,no_run
/// # use embedded_hal_async::delay::DelayNs;
/// # use embedded_hal_async::spi::SpiDevice;
/// use bmp384_rs::fifo::{FifoConfiguration, FifoFrame};
/// use bmp384_rs::typestate::{Bmp384Builder, NoPinError, TypeStateError};
///
/// # async fn demo<S: SpiDevice, D: DelayNs>(spi: S, delay: D) -> Result<(), TypeStateError<S::Error, NoPinError>> {
/// let mut device = Bmp384Builder::new()
///     .use_spi(spi)
///     .enable_pressure()
///     .enable_temperature()
///     .into_fifo(delay, FifoConfiguration::default(), 70)
///     .await?;
///
/// let mut frames = heapless::Vec::<FifoFrame, 16>::new();
/// loop {
///     device.wait_for_frames().await?;
///     device.drain_into(&mut frames).await?;
///     frames.clear();
/// }
/// # }
/// ```
pub struct FifoDevice<Out, B, IntPin, Delay> {
    device: Bmp384<B>,
    int_pin: Option<IntPin>,
    delay: Delay,
    watermark: u16,
    buffer: [u8; FIFO_SIZE + SENSOR_TIME_FRAME_LEN],
    _phantom_data: PhantomData<Out>,
}

/// One entry taken from the FIFO by [`FifoDevice::dequeue`].
#[derive(Copy, Clone, PartialEq)]
pub enum FifoOutput<Out> {
    Sample(Sample<Out>),
    /// Sensor time appended after the last frame.
    SensorTime(u32),
    /// The FIFO holds no more frames.
    Empty,
}

impl<Out: OutputConfig> Debug for FifoOutput<Out> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            FifoOutput::Sample(sample) => f.debug_tuple("Sample").field(sample).finish(),
            FifoOutput::SensorTime(time) => f.debug_tuple("SensorTime").field(time).finish(),
            FifoOutput::Empty => f.write_str("Empty"),
        }
    }
}

impl<Out: OutputConfig, B: Bus, IntPin: Wait + InputPin, Delay: DelayNs> FifoDevice<Out, B, IntPin, Delay> {
    pub(crate) async fn new(
        mut device: Bmp384<B>,
        int_pin: Option<IntPin>,
        delay: Delay,
        fifo: FifoConfiguration,
        watermark: u16,
    ) -> Bmp384Result<Self, B::Error> {
        let fifo = fifo
            .set_fifo_enabled(true)
            .set_pressure_enabled(Out::PRESSURE)
            .set_temperature_enabled(Out::TEMPERATURE);

        device.set_fifo_configuration(fifo).await?;
        device.set_fifo_watermark(watermark).await?;

        // Route the FIFO interrupts to the INT pin instead of data ready.
        if int_pin.is_some() {
            device.mask_interrupts(Interrupts::new().data_ready()).await?;
        }

        // Drop frames stored under the previous configuration.
        device.flush_fifo().await?;

        Ok(Self {
            device,
            int_pin,
            delay,
            watermark,
            buffer: [0; FIFO_SIZE + SENSOR_TIME_FRAME_LEN],
            _phantom_data: PhantomData,
        })
    }

    /// Returns the length (in bytes) of the internal FIFO buffer.
    pub async fn length(&mut self) -> Bmp384Result<u16, B::Error> {
        self.device.fifo_length().await
    }

    pub async fn is_empty(&mut self) -> Bmp384Result<bool, B::Error> {
        Ok(self.length().await? == 0)
    }

    /// Waits until the FIFO holds at least `watermark` bytes, or is full, and returns its length.
    ///
    /// With an interrupt pin the FIFO watermark and FIFO full interrupts are awaited. Without one,
    /// FIFO_LENGTH is polled once per maximum measurement time.
    pub async fn wait_for_frames(&mut self) -> TypeStateResult<u16, B::Error, IntPin::Error> {
        if let Some(int_pin) = &mut self.int_pin {
            loop {
                while int_pin.is_high().map_err(TypeStateError::Pin)? {
                    let status = self.device.interrupt_status().await?;
                    if status.fwm_int || status.ffull_int {
                        return Ok(self.device.fifo_length().await?);
                    }
                }

                int_pin
                    .wait_for_rising_edge()
                    .await
                    .map_err(TypeStateError::Pin)?;
            }
        } else {
            loop {
                let length = self.device.fifo_length().await?;
                if length >= self.watermark {
                    return Ok(length);
                }

                self.delay.delay_us(self.device.max_measurement_time_us()).await;
            }
        }
    }

    /// Reads as many frames as fit in `frames` out of the FIFO and returns how many were added.
    ///
    /// Only the bytes of the frames that fit are read, the rest stays in the FIFO. The sensor time
    /// frame is only read once the remaining frames leave a free slot for it. Config change
    /// frames and the closing empty frame are skipped. A config error frame returns
    /// [`TypeStateError::FifoConfigError`].
    pub async fn drain_into<const N: usize>(
        &mut self,
        frames: &mut heapless::Vec<FifoFrame, N>,
    ) -> TypeStateResult<usize, B::Error, IntPin::Error> {
        let free = frames.capacity() - frames.len();
        if free == 0 {
            return Ok(0);
        }

        let length = self.device.fifo_length().await? as usize;
        let budget = free * Out::FRAME_LEN;
        let n = if length + Out::FRAME_LEN <= budget && self.device.fifo_sensor_time().await? {
            length + SENSOR_TIME_FRAME_LEN
        } else {
            length.min(budget)
        };
        let n = n.min(self.buffer.len());
        if n == 0 {
            return Ok(0);
        }

        self.device.fifo_data(&mut self.buffer[..n]).await?;

        let mut added = 0;
        for frame in self.device.parse_fifo(&self.buffer[..n]) {
            match frame? {
                FifoFrame::ControlFrame(ControlFrameType::ConfigError) => {
                    return Err(TypeStateError::FifoConfigError);
                }
                FifoFrame::ControlFrame(ControlFrameType::ConfigChange)
                | FifoFrame::SensorFrame(SensorFrameType::Empty) => {}
                frame => {
                    // The read is sized to the free slots, so only frames shorter than
                    // `Out::FRAME_LEN` can overflow them, and the BMP384 emits none.
                    if frames.push(frame).is_err() {
                        error!("FIFO held more frames than were read for");
                        return Err(Bmp384Error::UnexpectedFifoData.into());
                    }
                    added += 1;
                }
            }
        }

        Ok(added)
    }

    /// Takes the next frame out of the FIFO.
    ///
    /// Config change frames are skipped, a config error frame returns
    /// [`TypeStateError::FifoConfigError`].
    pub async fn dequeue(&mut self) -> TypeStateResult<FifoOutput<Out>, B::Error, IntPin::Error> {
        loop {
            let output = match self.device.read_fifo_frame().await? {
                FifoFrame::SensorFrame(SensorFrameType::SensorTime(time)) => FifoOutput::SensorTime(time),
                FifoFrame::SensorFrame(SensorFrameType::Pressure(p)) => FifoOutput::Sample(Sample::new(0.0, p)),
                FifoFrame::SensorFrame(SensorFrameType::Temperature(t)) => FifoOutput::Sample(Sample::new(t, 0.0)),
                FifoFrame::SensorFrame(SensorFrameType::PressureAndTemperature { pressure, temperature }) => {
                    FifoOutput::Sample(Sample::new(temperature, pressure))
                }
                FifoFrame::SensorFrame(SensorFrameType::Empty) => FifoOutput::Empty,
                FifoFrame::ControlFrame(ControlFrameType::ConfigError) => {
                    return Err(TypeStateError::FifoConfigError);
                }
                FifoFrame::ControlFrame(ControlFrameType::ConfigChange) => continue,
            };

            return Ok(output);
        }
    }

    /// Gives access to the underlying driver.
    pub fn device(&mut self) -> &mut Bmp384<B> {
        &mut self.device
    }

    /// Puts the device to sleep and hands back the bus.
    pub async fn release(self) -> Bmp384Result<B, B::Error> {
        self.device.release().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeBus, FakeDelay, FakePin};
    use crate::typestate::{Bmp384Builder, Pressure, Temperature};

    const P_AND_T: [u8; 7] = [0x94, 0x98, 0x76, 0x54, 0x32, 0x21, 0x10];
    const CONFIG_CHANGE: [u8; 2] = [0x48, 0x00];
    const CONFIG_ERROR: [u8; 2] = [0x44, 0x00];

    #[tokio::test]
    async fn fifo_device_configures_fifo() {
        let mut device = Bmp384Builder::new()
            .use_bus(FakeBus::new())
            .enable_pressure()
            .enable_temperature()
            .use_irq(FakePin::new(false))
            .into_fifo(FakeDelay::default(), FifoConfiguration::default().set_pressure_enabled(false), 300)
            .await
            .unwrap();

        let bus = device.device().bus_mut();
        // mode, stop on full, pressure and temperature
        assert_eq!(Some(0b0001_1011), bus.written(0x17));
        assert_eq!(300u16.to_le_bytes(), [bus.regs[0x15], bus.regs[0x16]]);
        // FIFO watermark and FIFO full routed to the pin, data ready masked
        assert_eq!(0b0001_1010, bus.regs[0x19]);
        assert_eq!(Some(0xB0), bus.written(0x7E));
        assert!(device.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn fifo_device_rejects_bad_watermark() {
        let result = Bmp384Builder::new()
            .use_bus(FakeBus::new())
            .enable_pressure()
            .into_fifo(FakeDelay::default(), FifoConfiguration::default(), 512)
            .await;

        assert!(matches!(result, Err(crate::Bmp384Error::InvalidArgument)));
    }

    #[tokio::test]
    async fn fifo_device_drain_into_skips_control_frames() {
        let mut device = Bmp384Builder::new()
            .use_bus(FakeBus::new().with_calibration(&[1u8; 21]))
            .enable_pressure()
            .enable_temperature()
            .into_fifo(FakeDelay::default(), FifoConfiguration::default(), 7)
            .await
            .unwrap();

        device.device().bus_mut().push_frame(&CONFIG_CHANGE);
        device.device().bus_mut().push_frame(&P_AND_T);
        device.device().bus_mut().push_frame(&P_AND_T);

        let mut frames = heapless::Vec::<FifoFrame, 8>::new();
        assert_eq!(2, device.drain_into(&mut frames).await.unwrap());
        assert!(device.is_empty().await.unwrap());

        match frames[0] {
            FifoFrame::SensorFrame(SensorFrameType::PressureAndTemperature { pressure, temperature }) => {
                assert!((pressure + 14239.893).abs() < 0.1);
                assert!((temperature - 1.4154308).abs() < 0.0001);
            }
            other => panic!("unexpected frame {:?}", other),
        }
    }

    #[tokio::test]
    async fn fifo_device_drain_into_leaves_what_does_not_fit() {
        let mut device = Bmp384Builder::new()
            .use_bus(FakeBus::new())
            .enable_pressure()
            .enable_temperature()
            .into_fifo(FakeDelay::default(), FifoConfiguration::default(), 7)
            .await
            .unwrap();

        for _ in 0..3 {
            device.device().bus_mut().push_frame(&P_AND_T);
        }

        let mut frames = heapless::Vec::<FifoFrame, 1>::new();
        assert_eq!(1, device.drain_into(&mut frames).await.unwrap());
        assert_eq!(14, device.length().await.unwrap());

        // No room left, nothing is read.
        assert_eq!(0, device.drain_into(&mut frames).await.unwrap());
        assert_eq!(14, device.length().await.unwrap());
    }

    #[tokio::test]
    async fn fifo_device_drain_into_keeps_short_frames_that_do_not_fit() {
        let mut device: FifoDevice<Pressure, _, _, _> = Bmp384Builder::new()
            .use_bus(FakeBus::new())
            .enable_pressure()
            .into_fifo(FakeDelay::default(), FifoConfiguration::default(), 4)
            .await
            .unwrap();

        for i in 0..3 {
            device.device().bus_mut().push_frame(&[0x84, i, 0x00, 0x00]);
        }

        let mut frames = heapless::Vec::<FifoFrame, 1>::new();
        assert_eq!(1, device.drain_into(&mut frames).await.unwrap());
        assert_eq!(8, device.length().await.unwrap());

        // The next frame in line is the second one pushed.
        frames.clear();
        assert_eq!(1, device.drain_into(&mut frames).await.unwrap());
        assert_eq!(4, device.length().await.unwrap());
        assert_eq!(Some(&[0x84, 0x02, 0x00, 0x00][..]), device.device().bus_mut().fifo_front());
    }

    #[tokio::test]
    async fn fifo_device_drain_into_reads_sensor_time_only_with_a_free_slot() {
        let mut device: FifoDevice<Pressure, _, _, _> = Bmp384Builder::new()
            .use_bus(FakeBus::new())
            .enable_pressure()
            .into_fifo(FakeDelay::default(), FifoConfiguration::default().set_time_enabled(true), 4)
            .await
            .unwrap();

        device.device().bus_mut().regs[0x0C..0x0F].copy_from_slice(&[0x78, 0x56, 0x34]);
        device.device().bus_mut().push_frame(&[0x84, 0x01, 0x02, 0x03]);

        // One slot: the sample frame only, the sensor time stays unread.
        let mut frames = heapless::Vec::<FifoFrame, 1>::new();
        assert_eq!(1, device.drain_into(&mut frames).await.unwrap());
        assert!(matches!(frames[0], FifoFrame::SensorFrame(SensorFrameType::Pressure(_))));

        frames.clear();
        assert_eq!(1, device.drain_into(&mut frames).await.unwrap());
        assert_eq!(FifoFrame::SensorFrame(SensorFrameType::SensorTime(0x345678)), frames[0]);

        // Two slots: both in one read.
        device.device().bus_mut().push_frame(&[0x84, 0x01, 0x02, 0x03]);
        let mut frames = heapless::Vec::<FifoFrame, 2>::new();
        assert_eq!(2, device.drain_into(&mut frames).await.unwrap());
        assert_eq!(FifoFrame::SensorFrame(SensorFrameType::SensorTime(0x345678)), frames[1]);
    }

    #[tokio::test]
    async fn fifo_device_config_error() {
        let mut device = Bmp384Builder::new()
            .use_bus(FakeBus::new())
            .enable_pressure()
            .enable_temperature()
            .into_fifo(FakeDelay::default(), FifoConfiguration::default(), 7)
            .await
            .unwrap();

        device.device().bus_mut().push_frame(&CONFIG_ERROR);
        let mut frames = heapless::Vec::<FifoFrame, 4>::new();
        assert!(matches!(
            device.drain_into(&mut frames).await,
            Err(TypeStateError::FifoConfigError)
        ));

        device.device().bus_mut().push_frame(&CONFIG_ERROR);
        assert!(matches!(device.dequeue().await, Err(TypeStateError::FifoConfigError)));
    }

    #[tokio::test]
    async fn fifo_device_dequeue() {
        let mut device: FifoDevice<Temperature, _, _, _> = Bmp384Builder::new()
            .use_bus(FakeBus::new().with_calibration(&[1u8; 21]))
            .enable_temperature()
            .into_fifo(FakeDelay::default(), FifoConfiguration::default(), 4)
            .await
            .unwrap();

        device.device().bus_mut().push_frame(&CONFIG_CHANGE);
        device.device().bus_mut().push_frame(&[0x90, 0x78, 0x56, 0x34]);

        match device.dequeue().await.unwrap() {
            FifoOutput::Sample(sample) => assert!((sample.temperature_celsius() - 0.8454342).abs() < 0.0001),
            other => panic!("unexpected output {:?}", other),
        }
        assert_eq!(FifoOutput::Empty, device.dequeue().await.unwrap());
    }

    #[tokio::test]
    async fn fifo_device_wait_for_frames_polls_length() {
        let mut device = Bmp384Builder::new()
            .use_bus(FakeBus::new())
            .enable_pressure()
            .enable_temperature()
            .into_fifo(FakeDelay::default(), FifoConfiguration::default(), 14)
            .await
            .unwrap();

        device.device().bus_mut().push_frame(&P_AND_T);
        device.device().bus_mut().push_frame(&P_AND_T);

        let start = device.delay.elapsed_ns;
        assert_eq!(14, device.wait_for_frames().await.unwrap());
        assert_eq!(start, device.delay.elapsed_ns);
    }

    #[tokio::test]
    async fn fifo_device_wait_for_frames_uses_interrupt() {
        let mut device = Bmp384Builder::new()
            .use_bus(FakeBus::new())
            .enable_pressure()
            .use_irq(FakePin::new(false))
            .into_fifo(FakeDelay::default(), FifoConfiguration::default(), 8)
            .await
            .unwrap();

        device.device().bus_mut().push_frame(&[0x84, 0x01, 0x02, 0x03]);
        device.device().bus_mut().push_frame(&[0x84, 0x04, 0x05, 0x06]);
        device.device().bus_mut().regs[0x11] = 0b0001;

        assert_eq!(8, device.wait_for_frames().await.unwrap());
        assert_eq!(1, device.int_pin.as_ref().unwrap().rising_edges);
    }
}
