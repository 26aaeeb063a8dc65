use std::{num::NonZeroU32, time::Duration};

/// Bus address of the neck.
pub const NECK_ADDRESS: u8 = 0x10;

/// Wait between sending a query and reading the reply.
///
/// The manual asks for 50µs, but the stock controller board waits 10ms.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(10);

/// One-time wait for the neck to power up before the first tick.
pub const DEFAULT_POWER_UP_DELAY: Duration = Duration::from_millis(350);

/// Wait between ticks.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(10);

/// Timing and recovery settings for a [`NeckDriver`](crate::driver::NeckDriver).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DriverConfig {
    pub address: u8,
    pub settle_delay: Duration,
    pub power_up_delay: Duration,
    pub tick_interval: Duration,

    /// Number of consecutive empty polls after which the driver falls back
    /// to the handshake. `None` keeps a neck initialized forever.
    pub rehandshake_after: Option<NonZeroU32>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            address: NECK_ADDRESS,
            settle_delay: DEFAULT_SETTLE_DELAY,
            power_up_delay: DEFAULT_POWER_UP_DELAY,
            tick_interval: DEFAULT_TICK_INTERVAL,
            rehandshake_after: None,
        }
    }
}

impl DriverConfig {
    /// Slow timing that keeps trace output readable.
    pub fn verbose() -> Self {
        Self {
            settle_delay: Duration::from_millis(50),
            tick_interval: Duration::from_millis(500),
            ..Self::default()
        }
    }

    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn with_power_up_delay(mut self, delay: Duration) -> Self {
        self.power_up_delay = delay;
        self
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn with_rehandshake_after(mut self, polls: Option<NonZeroU32>) -> Self {
        self.rehandshake_after = polls;
        self
    }
}
