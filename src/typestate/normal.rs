use crate::bus::Bus;
use crate::typestate::{wait_for_data, OutputConfig, Sample, TypeStateResult};
use crate::{Bmp384, Bmp384Result, Interrupts};
use core::marker::PhantomData;
use embedded_hal::digital::InputPin;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::digital::Wait;

/// A BMP384 measuring continuously at the configured output data rate.
pub struct NormalDevice<Out, B, IntPin, Delay> {
    device: Bmp384<B>,
    int_pin: Option<IntPin>,
    delay: Delay,
    _phantom_data: PhantomData<Out>,
}

impl<Out: OutputConfig, B: Bus, IntPin: Wait + InputPin, Delay: DelayNs> NormalDevice<Out, B, IntPin, Delay> {
    pub(crate) async fn new(
        mut device: Bmp384<B>,
        int_pin: Option<IntPin>,
        delay: Delay,
    ) -> Bmp384Result<Self, B::Error> {
        // If an interrupt pin is given, enable DRDY interrupts and disable FIFO interrupts.
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

    /// Reads the latest measurement from the device.
    ///
    /// This method will not synchronize data readout with the configured measurement rate, so if you're calling
    /// this method faster than the device measurement rate, you will read the same data multiple times.
    pub async fn read_latest(&mut self) -> Bmp384Result<Sample<Out>, B::Error> {
        Ok(Sample::from(self.device.read_sensor_data().await?))
    }

    /// Reads the next measurement from the device.
    ///
    /// If an interrupt pin was configured using [`Bmp384Builder::use_irq`](crate::typestate::Bmp384Builder::use_irq),
    /// this waits for the data ready interrupt. Otherwise it waits the maximum measurement time
    /// before reading the data.
    pub async fn read_next(&mut self) -> TypeStateResult<Sample<Out>, B::Error, IntPin::Error> {
        wait_for_data(&mut self.device, &mut self.int_pin, &mut self.delay).await
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
