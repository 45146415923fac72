//! Bus abstraction over the I2C and SPI interfaces of the BMP384.
//!
//! Implementors only provide raw register transfers. The typed [`Bus::read`] and [`Bus::write`]
//! methods encode and decode register payloads on top of those.
use crate::error::Bmp384Error;
use crate::register::{Readable, Writable};
use embedded_hal::i2c::SevenBitAddress;

/// Largest register block transferred through [`Bus::read`] / [`Bus::write`] (the NVM calibration block).
pub const MAX_REG_BYTES: usize = 21;

/// Set on the register address to select a read over SPI.
const SPI_READ_BIT: u8 = 0x80;

/// The serial interface a [`Bus`] talks over.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Interface {
    I2c,
    Spi,
}

#[allow(async_fn_in_trait)]
pub trait Bus {
    type Error;

    /// Reads `data.len()` consecutive bytes starting at register `addr`.
    async fn read_raw(&mut self, addr: u8, data: &mut [u8]) -> Result<(), Self::Error>;

    /// Writes `data` to consecutive registers starting at `addr`.
    async fn write_raw(&mut self, addr: u8, data: &[u8]) -> Result<(), Self::Error>;

    fn interface(&self) -> Interface;

    /// Reads and decodes the register block described by `R`.
    async fn read<R: Readable>(&mut self) -> Result<R::Out, Bmp384Error<Self::Error>> {
        let mut buf = [0u8; MAX_REG_BYTES];
        let data = &mut buf[..R::N];
        self.read_raw(R::ADDR, data).await.map_err(Bmp384Error::Bus)?;

        R::decode(data).map_err(Bmp384Error::UnexpectedRegisterData)
    }

    /// Encodes `v` and writes it to the register block described by `W`.
    async fn write<W: Writable>(&mut self, v: &W::In) -> Result<(), Bmp384Error<Self::Error>> {
        let mut buf = [0u8; MAX_REG_BYTES];
        let data = &mut buf[..W::N];
        W::encode(v, data);

        self.write_raw(W::ADDR, data).await.map_err(Bmp384Error::Bus)
    }
}

pub struct I2c<I2cType> {
    i2c: I2cType,
    address: SevenBitAddress,
}

impl<I2cType> I2c<I2cType>
where
    I2cType: embedded_hal_async::i2c::I2c,
{
    pub(crate) fn new(i2c: I2cType, address: SevenBitAddress) -> Self {
        Self { i2c, address }
    }

    /// The 7-bit I2C address the device is addressed with.
    pub fn address(&self) -> SevenBitAddress {
        self.address
    }

    /// Gives back the underlying I2C peripheral.
    pub fn release(self) -> I2cType {
        self.i2c
    }
}

impl<I2cType> Bus for I2c<I2cType>
where
    I2cType: embedded_hal_async::i2c::I2c,
{
    type Error = <I2cType as embedded_hal_async::i2c::ErrorType>::Error;

    async fn read_raw(&mut self, addr: u8, data: &mut [u8]) -> Result<(), Self::Error> {
        self.i2c.write_read(self.address, &[addr], data).await
    }

    async fn write_raw(&mut self, addr: u8, data: &[u8]) -> Result<(), Self::Error> {
        // The BMP384 expects register address / value pairs for multi-byte writes.
        for (offset, value) in data.iter().enumerate() {
            self.i2c
                .write(self.address, &[addr.wrapping_add(offset as u8), *value])
                .await?;
        }

        Ok(())
    }

    fn interface(&self) -> Interface {
        Interface::I2c
    }
}

pub struct Spi<SpiType> {
    spi: SpiType,
}

impl<SpiType> Spi<SpiType>
where
    SpiType: embedded_hal_async::spi::SpiDevice,
{
    pub(crate) fn new(spi: SpiType) -> Self {
        Self { spi }
    }

    /// Gives back the underlying SPI device.
    pub fn release(self) -> SpiType {
        self.spi
    }
}

impl<SpiType> Bus for Spi<SpiType>
where
    SpiType: embedded_hal_async::spi::SpiDevice,
{
    type Error = <SpiType as embedded_hal_async::spi::ErrorType>::Error;

    async fn read_raw(&mut self, addr: u8, data: &mut [u8]) -> Result<(), Self::Error> {
        use embedded_hal_async::spi::Operation;

        // In SPI mode the first byte clocked out after the address is a dummy byte.
        let address = [addr | SPI_READ_BIT];
        let mut dummy = [0u8; 1];
        self.spi
            .transaction(&mut [
                Operation::Write(&address),
                Operation::Read(&mut dummy),
                Operation::Read(data),
            ])
            .await
    }

    async fn write_raw(&mut self, addr: u8, data: &[u8]) -> Result<(), Self::Error> {
        for (offset, value) in data.iter().enumerate() {
            let address = addr.wrapping_add(offset as u8) & !SPI_READ_BIT;
            self.spi.write(&[address, *value]).await?;
        }

        Ok(())
    }

    fn interface(&self) -> Interface {
        Interface::Spi
    }
}
