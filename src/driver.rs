//! The neck protocol state machine.

use log::{debug, info, warn};

use crate::{
    buttons::ButtonState,
    config::DriverConfig,
    decode::{Decode, DecodeError},
    frame::{QueryFrame, Reply, FRAME_LEN, HELLO_FRAME},
    transport::{ExchangeError, Transport},
};

/// Lifecycle of the connection to the neck.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum NeckState {
    /// No valid handshake reply seen yet. Every tick retries the handshake.
    #[default]
    Uninitialized,
    /// Handshake done. Every tick polls for button state.
    Ready,
}

/// Polls a neck over a [`Transport`].
///
/// The driver exclusively owns its transport, so only one exchange is ever in flight.
pub struct NeckDriver<T: Transport> {
    transport: T,
    config: DriverConfig,
    state: NeckState,
    latest: Option<ButtonState>,
    last_known: Option<ButtonState>,
    failures: u32,
}

impl<T: Transport> NeckDriver<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, DriverConfig::default())
    }

    pub fn with_config(transport: T, config: DriverConfig) -> Self {
        Self {
            transport,
            config,
            state: NeckState::Uninitialized,
            latest: None,
            last_known: None,
            failures: 0,
        }
    }

    pub fn state(&self) -> NeckState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.state == NeckState::Ready
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// State decoded by the most recent tick, or `None` if it produced nothing.
    pub fn latest(&self) -> Option<ButtonState> {
        self.latest
    }

    /// The last state ever decoded, however old.
    pub fn last_known(&self) -> Option<ButtonState> {
        self.last_known
    }

    /// Polls in a row that produced no state.
    pub fn consecutive_failures(&self) -> u32 {
        self.failures
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Waits for the neck to power up. Call once before the first tick.
    pub async fn power_up(&mut self) {
        self.transport.delay(self.config.power_up_delay).await;
    }

    /// Runs one step: a handshake attempt while uninitialized, a poll once ready.
    pub async fn tick(&mut self) -> Option<ButtonState> {
        match self.state {
            NeckState::Uninitialized => {
                self.latest = None;
                self.attempt_handshake().await;
                None
            }
            NeckState::Ready => self.poll_once().await,
        }
    }

    /// Powers up, then ticks forever at the configured interval.
    ///
    /// Every decoded state is passed to `on_state`. This never returns.
    pub async fn run(&mut self, mut on_state: impl FnMut(ButtonState)) {
        self.power_up().await;

        loop {
            self.transport.delay(self.config.tick_interval).await;

            if let Some(state) = self.tick().await {
                on_state(state);
            }
        }
    }

    /// Sends the query and checks for the exact handshake reply.
    ///
    /// Returns whether the neck is initialized afterwards. Failures are only logged.
    pub async fn attempt_handshake(&mut self) -> bool {
        match self.handshake().await {
            Ok(()) => {
                if self.state != NeckState::Ready {
                    info!("Neck initialized");
                }
                self.state = NeckState::Ready;
                self.failures = 0;
            }
            Err(e) => debug!("Handshake failed: {}", e),
        }

        self.is_initialized()
    }

    /// Requests and decodes the current button state.
    ///
    /// Returns `None` if the exchange failed or the reply was not a status packet.
    pub async fn poll_once(&mut self) -> Option<ButtonState> {
        let polled = match self.poll().await {
            Ok(state) => {
                self.failures = 0;
                self.last_known = Some(state);
                Some(state)
            }
            Err(e) => {
                debug!("Poll produced no state: {}", e);
                self.failures = self.failures.saturating_add(1);
                self.check_rehandshake();
                None
            }
        };

        self.latest = polled;
        polled
    }

    fn check_rehandshake(&mut self) {
        let Some(limit) = self.config.rehandshake_after else {
            return;
        };

        if self.failures >= limit.get() {
            warn!(
                "No button state after {} polls, falling back to handshake",
                self.failures
            );
            self.state = NeckState::Uninitialized;
            self.failures = 0;
        }
    }

    async fn exchange(&mut self) -> Result<[u8; FRAME_LEN], ExchangeError> {
        let address = self.config.address;

        self.transport.send_frame(address, QueryFrame).await?;
        self.transport.delay(self.config.settle_delay).await;
        self.transport.read_frame(address).await
    }

    async fn handshake(&mut self) -> Result<(), ExchangeError> {
        let frame = self.exchange().await?;

        if frame != HELLO_FRAME {
            return Err(DecodeError::InvalidHandshake {
                found: frame,
                expected: HELLO_FRAME,
            }
            .into());
        }

        Ok(())
    }

    async fn poll(&mut self) -> Result<ButtonState, ExchangeError> {
        let frame = self.exchange().await?;

        // The frame is complete, so decoding only fails on a foreign tag.
        match Reply::decode(&mut frame.as_slice()) {
            Ok(Reply::Status(state)) => Ok(state),
            Ok(Reply::Hello) | Err(_) => Err(ExchangeError::NotStatus { tag: frame[0] }),
        }
    }
}
