//! Test doubles: a register file standing in for the BMP384, a delay that only counts, and an
//! interrupt pin.
use crate::bus::{Bus, Interface};
use embedded_hal::digital::{ErrorType, InputPin};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::digital::Wait;
use heapless::{Deque, Vec};

/// NVM calibration block captured from a real device.
pub const NVM: [u8; 21] = [
    0x98, 0x6E, 0x13, 0x4D, 0xF9, 0xB0, 0x1B, 0xC0, 0x15, 0x06, 0x01,
    0x92, 0x4A, 0xAE, 0x5D, 0x03, 0xFA, 0x08, 0x0F, 0x06, 0xF5,
];

/// DATA_0..DATA_5 captured together with [`NVM`]. Compensates to ~100548.4 Pa and ~25.498 °C.
pub const SAMPLE: [u8; 6] = [0x92, 0x51, 0x65, 0x79, 0xCE, 0x83];

const CHIP_ID: usize = 0x00;
const ERR_REG: usize = 0x02;
const STATUS: usize = 0x03;
const DATA: usize = 0x04;
const SENSORTIME: usize = 0x0C;
const EVENT: usize = 0x10;
const INT_STATUS: usize = 0x11;
const FIFO_LENGTH: usize = 0x12;
const FIFO_DATA: u8 = 0x14;
const FIFO_CONFIG_1: usize = 0x17;
const PWR_CTRL: u8 = 0x1B;
const NVM_PAR: usize = 0x31;
const CMD: u8 = 0x7E;

const CMD_RDY: u8 = 0b0001_0000;
const DRDY_PRESS: u8 = 0b0010_0000;
const DRDY_TEMP: u8 = 0b0100_0000;
const INT_DRDY: u8 = 0b0000_1000;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FakeBusError;

/// In-memory model of the BMP384 register file.
///
/// Models the side effects the driver relies on: clear-on-read status registers, forced mode
/// conversions that complete immediately, the FIFO with partial frame re-reads, and the
/// CMD register.
pub struct FakeBus {
    pub regs: [u8; 0x80],
    pub interface: Interface,
    fifo: Deque<Vec<u8, 7>, 96>,
    /// Every register write in order, as (address, value).
    pub writes: Vec<(u8, u8), 128>,
    /// Register accesses touching this address fail with [`FakeBusError`].
    pub fail_on: Option<u8>,
    /// Forced mode conversions leave the data ready bits clear.
    pub stall_conversions: bool,
}

impl FakeBus {
    pub fn new() -> Self {
        let mut bus = Self {
            regs: [0; 0x80],
            interface: Interface::I2c,
            fifo: Deque::new(),
            writes: Vec::new(),
            fail_on: None,
            stall_conversions: false,
        };
        bus.regs[CHIP_ID] = 0x50;
        bus.regs[NVM_PAR..NVM_PAR + NVM.len()].copy_from_slice(&NVM);
        bus.regs[DATA..DATA + SAMPLE.len()].copy_from_slice(&SAMPLE);
        bus.reset_registers();

        bus
    }

    pub fn with_calibration(mut self, nvm: &[u8; 21]) -> Self {
        self.regs[NVM_PAR..NVM_PAR + nvm.len()].copy_from_slice(nvm);

        self
    }

    /// Queues a frame in the FIFO and updates FIFO_LENGTH.
    pub fn push_frame(&mut self, frame: &[u8]) {
        let _ = self.fifo.push_back(Vec::from_slice(frame).unwrap_or_default());
        self.sync_fifo_length();
    }

    /// The frame the next FIFO read starts with.
    pub fn fifo_front(&self) -> Option<&[u8]> {
        self.fifo.front().map(|frame| frame.as_slice())
    }

    pub fn fifo_len(&self) -> usize {
        self.fifo.iter().map(|f| f.len()).sum()
    }

    /// The last value written to `addr`.
    pub fn written(&self, addr: u8) -> Option<u8> {
        self.writes.iter().rev().find(|(a, _)| *a == addr).map(|(_, v)| *v)
    }

    fn reset_registers(&mut self) {
        self.regs[ERR_REG] = 0x00;
        self.regs[STATUS] = CMD_RDY;
        self.regs[EVENT] = 0x01;
        self.regs[INT_STATUS] = 0x00;
        self.regs[0x15] = 0x01;
        self.regs[0x16] = 0x00;
        self.regs[FIFO_CONFIG_1] = 0x02;
        self.regs[0x18] = 0x02;
        self.regs[0x19] = 0x02;
        self.regs[0x1A] = 0x00;
        self.regs[PWR_CTRL as usize] = 0x00;
        self.regs[0x1C] = 0x02;
        self.regs[0x1D] = 0x00;
        self.regs[0x1F] = 0x00;
        self.fifo.clear();
        self.sync_fifo_length();
    }

    fn sync_fifo_length(&mut self) {
        let [lsb, msb] = (self.fifo_len() as u16).to_le_bytes();
        self.regs[FIFO_LENGTH] = lsb;
        self.regs[FIFO_LENGTH + 1] = msb;
    }

    fn read_fifo(&mut self, buf: &mut [u8]) {
        let mut n = 0;
        while let Some(frame) = self.fifo.front() {
            let take = frame.len().min(buf.len() - n);
            buf[n..n + take].copy_from_slice(&frame[..take]);
            n += take;
            if take < frame.len() {
                // A partially read frame stays in the FIFO.
                break;
            }
            self.fifo.pop_front();
        }

        let time_en = self.regs[FIFO_CONFIG_1] & 0b100 != 0;
        if self.fifo.is_empty() && time_en && buf.len() - n >= 4 {
            buf[n] = 0xA0;
            buf[n + 1..n + 4].copy_from_slice(&self.regs[SENSORTIME..SENSORTIME + 3]);
            n += 4;
        }

        for (i, b) in buf[n..].iter_mut().enumerate() {
            *b = if i % 2 == 0 { 0x80 } else { 0x00 };
        }

        self.sync_fifo_length();
    }

    fn write_register(&mut self, addr: u8, value: u8) {
        match addr {
            CMD => match value {
                0xB6 => self.reset_registers(),
                0xB0 => {
                    self.fifo.clear();
                    self.sync_fifo_length();
                }
                _ => {}
            },
            PWR_CTRL => {
                let mode = (value >> 4) & 0b11;
                if mode == 0b01 || mode == 0b10 {
                    if !self.stall_conversions {
                        if value & 0b01 != 0 { self.regs[STATUS] |= DRDY_PRESS; }
                        if value & 0b10 != 0 { self.regs[STATUS] |= DRDY_TEMP; }
                        self.regs[INT_STATUS] |= INT_DRDY;
                    }
                    // The conversion finishes at once and the device drops back to sleep.
                    self.regs[PWR_CTRL as usize] = value & 0b0000_0011;
                } else {
                    self.regs[PWR_CTRL as usize] = value;
                }
            }
            _ => self.regs[addr as usize] = value,
        }
    }
}

impl Bus for FakeBus {
    type Error = FakeBusError;

    async fn read_raw(&mut self, addr: u8, data: &mut [u8]) -> Result<(), Self::Error> {
        if self.fail_on == Some(addr) {
            return Err(FakeBusError);
        }

        if addr == FIFO_DATA {
            self.read_fifo(data);
            return Ok(());
        }

        let start = addr as usize;
        let end = start + data.len();
        data.copy_from_slice(&self.regs[start..end]);

        let touches = |reg: usize| (start..end).contains(&reg);
        if touches(INT_STATUS) {
            self.regs[INT_STATUS] = 0;
        }
        if touches(EVENT) {
            self.regs[EVENT] = 0;
        }
        if touches(ERR_REG) {
            // Only the fatal error flag survives a read.
            self.regs[ERR_REG] &= 0b001;
        }
        if touches(DATA) {
            self.regs[STATUS] &= !(DRDY_PRESS | DRDY_TEMP);
        }

        Ok(())
    }

    async fn write_raw(&mut self, addr: u8, data: &[u8]) -> Result<(), Self::Error> {
        for (i, value) in data.iter().enumerate() {
            let reg = addr + i as u8;
            if self.fail_on == Some(reg) {
                return Err(FakeBusError);
            }
            let _ = self.writes.push((reg, *value));
            self.write_register(reg, *value);
        }

        Ok(())
    }

    fn interface(&self) -> Interface {
        self.interface
    }
}

/// Delay that returns immediately and records how long it was asked to wait.
#[derive(Default)]
pub struct FakeDelay {
    pub elapsed_ns: u64,
}

impl DelayNs for FakeDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns += ns as u64;
    }
}

/// Interrupt pin that reports a fixed level and counts waits for a rising edge.
pub struct FakePin {
    pub high: bool,
    pub rising_edges: u32,
}

impl FakePin {
    pub fn new(high: bool) -> Self {
        Self { high, rising_edges: 0 }
    }
}

impl ErrorType for FakePin {
    type Error = core::convert::Infallible;
}

impl InputPin for FakePin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.high)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.high)
    }
}

impl Wait for FakePin {
    async fn wait_for_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn wait_for_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn wait_for_rising_edge(&mut self) -> Result<(), Self::Error> {
        self.rising_edges += 1;
        self.high = true;
        Ok(())
    }

    async fn wait_for_falling_edge(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn wait_for_any_edge(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
