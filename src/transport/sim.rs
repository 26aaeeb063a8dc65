//! An in-memory neck for exercising the driver without hardware.

use std::{
    collections::VecDeque,
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Duration,
};

use super::{Transport, TransportError};

/// A completed write transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub address: u8,
    pub bytes: Vec<u8>,
    pub result: Result<(), TransportError>,
}

/// A scripted peripheral.
///
/// Replies and transmit failures are served from queues in order. Once the
/// reply queue is empty the fallback reply (if any) is served forever;
/// without one, reads deliver zero bytes.
///
/// Delays are recorded instead of waited out. Each one still yields to the
/// executor once, so loops built on it don't starve other tasks.
#[derive(Debug, Default)]
pub struct SimulatedNeck {
    transmit_results: VecDeque<TransportError>,
    replies: VecDeque<Vec<u8>>,
    fallback_reply: Option<Vec<u8>>,
    pending: Option<(u8, Vec<u8>)>,
    transactions: Vec<Transaction>,
    requests: Vec<(u8, usize)>,
    delays: Vec<Duration>,
}

impl SimulatedNeck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a reply to serve on the next read.
    pub fn queue_reply(&mut self, reply: impl Into<Vec<u8>>) -> &mut Self {
        self.replies.push_back(reply.into());
        self
    }

    /// Makes the next transmission fail with `err`.
    pub fn queue_transmit_error(&mut self, err: TransportError) -> &mut Self {
        self.transmit_results.push_back(err);
        self
    }

    /// Sets the reply served once the queue runs dry.
    pub fn set_fallback_reply(&mut self, reply: impl Into<Vec<u8>>) -> &mut Self {
        self.fallback_reply = Some(reply.into());
        self
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Every read as `(address, requested byte count)`.
    pub fn requests(&self) -> &[(u8, usize)] {
        &self.requests
    }

    /// Every delay the driver asked for, in order.
    pub fn delays(&self) -> &[Duration] {
        &self.delays
    }
}

/// Returns `Pending` once, then `Ready`.
struct YieldNow(bool);

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 {
            return Poll::Ready(());
        }
        self.0 = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

impl Transport for SimulatedNeck {
    fn begin_transaction(&mut self, address: u8) {
        self.pending = Some((address, Vec::new()));
    }

    fn write_byte(&mut self, byte: u8) {
        if let Some((_, bytes)) = &mut self.pending {
            bytes.push(byte);
        }
    }

    async fn end_transaction(&mut self) -> Result<(), TransportError> {
        let result = match self.transmit_results.pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        };

        if let Some((address, bytes)) = self.pending.take() {
            self.transactions.push(Transaction {
                address,
                bytes,
                result,
            });
        }

        result
    }

    async fn request_bytes(&mut self, address: u8, buf: &mut [u8]) -> usize {
        self.requests.push((address, buf.len()));

        let Some(reply) = self
            .replies
            .pop_front()
            .or_else(|| self.fallback_reply.clone())
        else {
            return 0;
        };

        let len = reply.len().min(buf.len());
        buf[..len].copy_from_slice(&reply[..len]);
        len
    }

    async fn delay(&mut self, duration: Duration) {
        self.delays.push(duration);
        YieldNow(false).await;
    }
}
