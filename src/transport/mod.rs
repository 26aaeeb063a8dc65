//! The two-wire bus seam the driver talks through.

use std::{future::Future, time::Duration};

use log::trace;
use thiserror::Error;

use crate::{
    decode::DecodeError,
    encode::Encode,
    frame::{FrameDump, FRAME_LEN},
};

#[cfg(feature = "embedded-hal")]
pub mod hal;
#[cfg(any(test, feature = "sim"))]
pub mod sim;

/// Non-success results of ending a write transaction.
///
/// The numeric codes are the ones returned by the Wiring `endTransmission` call.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    #[error("busy timeout upon entering endTransmission()")]
    BusyTimeout,
    #[error("START bit generation timeout")]
    StartBitTimeout,
    #[error("end of address transmission timeout")]
    AddressTimeout,
    #[error("data byte transfer timeout")]
    DataTimeout,
    #[error("data byte transfer succeeded, busy timeout immediately after")]
    PostDataBusyTimeout,
    #[error("timeout waiting for peripheral to clear stop bit")]
    StopBitTimeout,
    #[error("Unknown return from endTransmission(): {0}")]
    Unknown(u8),
}

impl TransportError {
    /// Classifies a raw transmission result code. `0` is success.
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => None,
            1 => Some(Self::BusyTimeout),
            2 => Some(Self::StartBitTimeout),
            3 => Some(Self::AddressTimeout),
            4 => Some(Self::DataTimeout),
            5 => Some(Self::PostDataBusyTimeout),
            6 => Some(Self::StopBitTimeout),
            code => Some(Self::Unknown(code)),
        }
    }

    pub const fn code(&self) -> u8 {
        match self {
            Self::BusyTimeout => 1,
            Self::StartBitTimeout => 2,
            Self::AddressTimeout => 3,
            Self::DataTimeout => 4,
            Self::PostDataBusyTimeout => 5,
            Self::StopBitTimeout => 6,
            Self::Unknown(code) => *code,
        }
    }
}

/// Converts a raw transmission result code into a [`Result`].
pub const fn transmission_result(code: u8) -> Result<(), TransportError> {
    match TransportError::from_code(code) {
        None => Ok(()),
        Some(err) => Err(err),
    }
}

/// Reasons a single query/reply exchange produced nothing usable.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeError {
    #[error("Transmission failed: {0}")]
    Transport(#[from] TransportError),
    #[error("Wrong byte count read. Expected {expected}, found {found}")]
    ShortRead { expected: usize, found: usize },
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("Reply with tag {tag:#04x} is not a status packet")]
    NotStatus { tag: u8 },
}

/// A two-wire (I2C) bus connected to a single peripheral.
///
/// Writes are staged with [`begin_transaction`](Transport::begin_transaction)
/// and [`write_byte`](Transport::write_byte) and only hit the bus on
/// [`end_transaction`](Transport::end_transaction).
///
/// The transport also owns the timer used between a query and its reply, so
/// the driver runs on whatever executor the bus implementation targets.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Starts staging a write to `address`.
    fn begin_transaction(&mut self, address: u8);

    /// Stages one byte of the current write.
    fn write_byte(&mut self, byte: u8);

    /// Transmits the staged write.
    fn end_transaction(&mut self) -> impl Future<Output = Result<(), TransportError>>;

    /// Requests up to `buf.len()` bytes from `address`.
    ///
    /// Returns how many bytes were actually delivered. The peripheral may send fewer.
    fn request_bytes(&mut self, address: u8, buf: &mut [u8]) -> impl Future<Output = usize>;

    /// Waits for at least `duration`.
    fn delay(&mut self, duration: Duration) -> impl Future<Output = ()>;

    /// Writes an encoded frame to `address` as a single transaction.
    async fn send_frame(&mut self, address: u8, frame: impl Encode) -> Result<(), TransportError> {
        let mut encoded = vec![0; frame.size()];
        frame.encode(&mut encoded);

        trace!("Sending frame: {:x?}", encoded);

        self.begin_transaction(address);
        for byte in encoded {
            self.write_byte(byte);
        }
        self.end_transaction().await
    }

    /// Reads one full reply frame from `address`.
    ///
    /// Fails with [`ExchangeError::ShortRead`] if fewer than [`FRAME_LEN`] bytes arrive.
    async fn read_frame(&mut self, address: u8) -> Result<[u8; FRAME_LEN], ExchangeError> {
        let mut frame = [0; FRAME_LEN];
        let found = self.request_bytes(address, &mut frame).await.min(FRAME_LEN);

        trace!("{}", FrameDump(&frame[..found]));

        if found != FRAME_LEN {
            return Err(ExchangeError::ShortRead {
                expected: FRAME_LEN,
                found,
            });
        }

        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::{sim::SimulatedNeck, transmission_result, ExchangeError, Transport, TransportError};
    use crate::frame::QueryFrame;

    #[test]
    fn classify_codes() {
        assert_eq!(transmission_result(0), Ok(()));
        assert_eq!(TransportError::from_code(1), Some(TransportError::BusyTimeout));
        assert_eq!(TransportError::from_code(2), Some(TransportError::StartBitTimeout));
        assert_eq!(TransportError::from_code(3), Some(TransportError::AddressTimeout));
        assert_eq!(TransportError::from_code(4), Some(TransportError::DataTimeout));
        assert_eq!(
            TransportError::from_code(5),
            Some(TransportError::PostDataBusyTimeout)
        );
        assert_eq!(TransportError::from_code(6), Some(TransportError::StopBitTimeout));
        assert_eq!(transmission_result(42), Err(TransportError::Unknown(42)));

        for code in 1..=u8::MAX {
            assert_eq!(TransportError::from_code(code).map(|e| e.code()), Some(code));
        }
    }

    #[test]
    fn error_text() {
        assert_eq!(
            TransportError::StartBitTimeout.to_string(),
            "START bit generation timeout"
        );
        assert_eq!(
            TransportError::Unknown(9).to_string(),
            "Unknown return from endTransmission(): 9"
        );
    }

    #[tokio::test]
    async fn send_frame_writes_one_transaction() {
        let mut neck = SimulatedNeck::new();
        neck.send_frame(0x10, QueryFrame).await.unwrap();

        assert_eq!(neck.transactions().len(), 1);
        assert_eq!(neck.transactions()[0].address, 0x10);
        assert_eq!(neck.transactions()[0].bytes, vec![0x53, 0x10, 0x00, 0x01]);
    }

    #[tokio::test]
    async fn send_raw_bytes() {
        let mut neck = SimulatedNeck::new();
        neck.send_frame(0x10, [0x53u8, 0x20].as_slice()).await.unwrap();

        assert_eq!(neck.transactions()[0].bytes, vec![0x53, 0x20]);
    }

    #[tokio::test]
    async fn send_frame_reports_failure() {
        let mut neck = SimulatedNeck::new();
        neck.queue_transmit_error(TransportError::AddressTimeout);

        assert_eq!(
            neck.send_frame(0x10, QueryFrame).await,
            Err(TransportError::AddressTimeout)
        );
    }

    #[tokio::test]
    async fn read_frame_short() {
        let mut neck = SimulatedNeck::new();
        neck.queue_reply([0x52, 0x00]);

        assert_eq!(
            neck.read_frame(0x10).await,
            Err(ExchangeError::ShortRead {
                expected: 4,
                found: 2
            })
        );
    }

    #[tokio::test]
    async fn read_frame_truncates_long_reply() {
        let mut neck = SimulatedNeck::new();
        neck.queue_reply([0x52, 0x00, 0x08, 0x41, 0x99]);

        assert_eq!(neck.read_frame(0x10).await, Ok([0x52, 0x00, 0x08, 0x41]));
        assert_eq!(neck.requests(), &[(0x10, 4)]);
    }
}
