use std::time::Duration;

use log::info;
use neck_driver::{
    transport::{sim::SimulatedNeck, TransportError},
    Color, DriverConfig, NeckDriver, HELLO_FRAME,
};

#[tokio::main]
async fn main() {
    simplelog::TermLogger::init(
        log::LevelFilter::Trace,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Always,
    )
    .unwrap();

    // A neck that is slow to wake up, then holds green and touches the red sensor.
    let mut neck = SimulatedNeck::new();
    neck.queue_transmit_error(TransportError::AddressTimeout)
        .queue_reply([0x55, 0x55])
        .queue_reply(HELLO_FRAME)
        .queue_reply([0x52, 0x00, 0x00, 0x40])
        .queue_reply([0x51, 0x00, 0x00, 0x00])
        .set_fallback_reply([0x52, 0x00, 0x04, 0x40]);

    let mut driver = NeckDriver::with_config(
        neck,
        DriverConfig::default().with_power_up_delay(Duration::from_millis(50)),
    );

    driver.power_up().await;

    for _ in 0..8 {
        tokio::time::sleep(driver.config().tick_interval).await;

        let Some(state) = driver.tick().await else {
            continue;
        };

        for color in Color::ALL {
            if state.fret(color) || state.touch(color) {
                info!(
                    "{:?}: fret={} touch={}",
                    color,
                    state.fret(color),
                    state.touch(color)
                );
            }
        }
    }
}
