use crate::bus::Bus;
use crate::register::pwr_ctrl::PowerMode;
use crate::typestate::{wait_for_data, OutputConfig, Sample, TypeStateResult};
use crate::{Bmp384, Bmp384Result, Interrupts};
use core::marker::PhantomData;
use embedded_hal::digital::InputPin;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::digital::Wait;

/// A BMP384 that sleeps until a sample is requested.
///
/// Every call to [`read_sample`](ForcedDevice::read_sample) triggers one forced mode conversion.
pub struct ForcedDevice<Out, B, IntPin, Delay> {
    device: Bmp384<B>,
    int_pin: Option<IntPin>,
    delay: Delay,
    _phantom_data: PhantomData<Out>,
}

impl<Out: OutputConfig, B: Bus, IntPin: Wait + InputPin, Delay: DelayNs> ForcedDevice<Out, B, IntPin, Delay> {
    pub(crate) async fn new(
        mut device: Bmp384<B>,
        int_pin: Option<IntPin>,
        delay: Delay,
    ) -> Bmp384Result<Self, B::Error> {
        // Only data ready is routed to the INT pin.
        if int_pin.is_some() {
            device
                .mask_interrupts(Interrupts::new().fifo_full().fifo_watermark())
                .await?;
        }

        Ok(Self {
            device,
            int_pin,
            delay,
            _phantom_data: PhantomData,
        })
    }

    /// Triggers a conversion and returns its result.
    ///
    /// With an interrupt pin the data ready interrupt is awaited. Without one, STATUS is polled
    /// after the typical conversion time, see [`Bmp384::measure`].
    pub async fn read_sample(&mut self) -> TypeStateResult<Sample<Out>, B::Error, IntPin::Error> {
        if self.int_pin.is_some() {
            // Clears a data ready flag left over from an earlier conversion.
            self.device.interrupt_status().await?;
            self.device.set_mode(PowerMode::Forced).await?;

            wait_for_data(&mut self.device, &mut self.int_pin, &mut self.delay).await
        } else {
            Ok(Sample::from(self.device.measure(&mut self.delay).await?))
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
    use crate::testing::{FakeBus, FakeDelay, FakePin};
    use crate::typestate::Bmp384Builder;
    use crate::ResetPolicy;

    #[tokio::test]
    async fn forced_read_sample_polls_status() {
        let mut device = Bmp384Builder::new()
            .use_bus(FakeBus::new())
            .enable_pressure()
            .enable_temperature()
            .reset_policy(ResetPolicy::None)
            .into_forced(FakeDelay::default())
            .await
            .unwrap();

        let sample = device.read_sample().await.unwrap();
        assert!((sample.pressure_pascal() - 100548.42).abs() < 0.1);
        assert!((sample.temperature_celsius() - 25.498167).abs() < 0.0001);
    }

    #[tokio::test]
    async fn forced_read_sample_waits_for_interrupt() {
        let mut device = Bmp384Builder::new()
            .use_bus(FakeBus::new())
            .enable_temperature()
            .use_irq(FakePin::new(false))
            .into_forced(FakeDelay::default())
            .await
            .unwrap();

        let sample = device.read_sample().await.unwrap();
        assert!((sample.temperature_celsius() - 25.498167).abs() < 0.0001);

        // Only data ready is routed to the INT pin.
        assert_eq!(0b0100_0010, device.device().read_register(0x19).await.unwrap());
        assert_eq!(1, device.int_pin.as_ref().unwrap().rising_edges);
    }
}
