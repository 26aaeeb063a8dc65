//! Driver for guitar neck controller boards connected over I2C.
//!
//! The neck answers a fixed 4-byte query with a 4-byte reply. Until it has
//! acknowledged a handshake its replies aren't trusted; afterwards each reply
//! tagged as a status packet is decoded into a [`ButtonState`].
//!
//! The crate is structured around the [`Encode`](encode::Encode) and
//! [`Decode`](decode::Decode) traits for frames, the [`Transport`] trait for
//! the bus, and the [`NeckDriver`] state machine that ties them together.
//! The driver never fails: every problem is logged through [`log`] and the
//! next [`tick`](NeckDriver::tick) simply tries again.

pub mod buttons;
pub mod config;
pub mod decode;
pub mod driver;
pub mod encode;
pub mod frame;
pub mod transport;

pub use buttons::{ButtonState, Color};
pub use config::{DriverConfig, NECK_ADDRESS};
pub use driver::{NeckDriver, NeckState};
pub use frame::{Reply, HELLO_FRAME, QUERY_FRAME, STATUS_TAG};
pub use transport::{ExchangeError, Transport, TransportError};
