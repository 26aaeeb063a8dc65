//! [`Transport`] over any [`embedded_hal_async`] I2C bus.

use std::time::Duration;

use embedded_hal_async::{
    delay::DelayNs,
    i2c::{Error as _, ErrorKind, I2c, NoAcknowledgeSource},
};
use log::debug;

use super::{Transport, TransportError};

/// Adapts an async I2C bus and timer to the staged-write [`Transport`] interface.
///
/// Writes are buffered until [`end_transaction`](Transport::end_transaction)
/// and sent as a single bus write. Delays go to `delay`, which should be the
/// timer of the executor the driver runs on.
pub struct HalTransport<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    staged: Vec<u8>,
}

impl<I2C: I2c, D: DelayNs> HalTransport<I2C, D> {
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self {
            i2c,
            delay,
            address: 0,
            staged: Vec::with_capacity(4),
        }
    }

    pub fn into_inner(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }
}

/// Maps a bus error onto the transmission result it most closely matches.
pub fn classify(kind: ErrorKind) -> TransportError {
    match kind {
        ErrorKind::ArbitrationLoss => TransportError::BusyTimeout,
        ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address) => TransportError::AddressTimeout,
        ErrorKind::NoAcknowledge(_) | ErrorKind::Overrun => TransportError::DataTimeout,
        _ => TransportError::Unknown(u8::MAX),
    }
}

impl<I2C: I2c, D: DelayNs> Transport for HalTransport<I2C, D> {
    fn begin_transaction(&mut self, address: u8) {
        self.address = address;
        self.staged.clear();
    }

    fn write_byte(&mut self, byte: u8) {
        self.staged.push(byte);
    }

    async fn end_transaction(&mut self) -> Result<(), TransportError> {
        let result = self
            .i2c
            .write(self.address, &self.staged)
            .await
            .map_err(|e| classify(e.kind()));
        self.staged.clear();
        result
    }

    async fn request_bytes(&mut self, address: u8, buf: &mut [u8]) -> usize {
        match self.i2c.read(address, buf).await {
            Ok(()) => buf.len(),
            Err(e) => {
                debug!("I2C read from {:#04x} failed: {:?}", address, e.kind());
                0
            }
        }
    }

    async fn delay(&mut self, duration: Duration) {
        let micros = u32::try_from(duration.as_micros()).unwrap_or(u32::MAX);
        self.delay.delay_us(micros).await;
    }
}
