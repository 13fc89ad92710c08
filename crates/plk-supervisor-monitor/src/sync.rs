// crates/plk-supervisor-monitor/src/sync.rs
//! The DataSync loop: exchanges the process image with the stack once per
//! period and publishes a snapshot to observers.

use crate::model::{MonitorEvent, ProcessImageSnapshot};
use log::{info, trace, warn};
use plk_supervisor::{DispatchError, ProcessImage, ProcessImageExchange};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};

pub struct DataSync<E: ProcessImageExchange> {
    exchange: E,
    image: Arc<Mutex<ProcessImage>>,
    cycle: u64,
}

impl<E: ProcessImageExchange> DataSync<E> {
    pub fn new(exchange: E, image: Arc<Mutex<ProcessImage>>) -> Self {
        Self {
            exchange,
            image,
            cycle: 0,
        }
    }

    pub fn cycle_count(&self) -> u64 {
        self.cycle
    }

    /// Runs one exchange. The image stays locked for the whole exchange and
    /// snapshot, so observers never see a half-updated image.
    pub fn run_cycle(&mut self) -> Result<MonitorEvent, DispatchError> {
        let mut image = self.image.lock().unwrap_or_else(PoisonError::into_inner);
        self.exchange.exchange(&mut image)?;
        self.cycle += 1;
        trace!("DataSync cycle {} complete.", self.cycle);
        Ok(MonitorEvent::ProcessImage {
            cycle: self.cycle,
            image: ProcessImageSnapshot::capture(&image),
        })
    }

    /// Runs cycles every `period` until the task is dropped. A failed
    /// exchange is logged once and retried on the next tick.
    pub async fn run(mut self, period: Duration, events: broadcast::Sender<MonitorEvent>) {
        info!("DataSync started with a {:?} period.", period);
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut failing = false;
        loop {
            interval.tick().await;
            match self.run_cycle() {
                Ok(event) => {
                    if failing {
                        info!("DataSync exchange recovered.");
                        failing = false;
                    }
                    // No receivers is fine.
                    let _ = events.send(event);
                }
                Err(e) => {
                    if !failing {
                        warn!("DataSync exchange failed: {}", e);
                        failing = true;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plk_supervisor::{Channel, Direction, IecDataType, IecValue};

    /// Increments every input byte on each exchange.
    struct Counter {
        fail: bool,
    }

    impl ProcessImageExchange for Counter {
        fn exchange(&mut self, image: &mut ProcessImage) -> Result<(), DispatchError> {
            if self.fail {
                return Err(DispatchError::StackNotRunning);
            }
            for byte in image.buffer_mut(Direction::Input) {
                *byte = byte.wrapping_add(1);
            }
            Ok(())
        }
    }

    fn image() -> Arc<Mutex<ProcessImage>> {
        Arc::new(Mutex::new(
            ProcessImage::new(
                1,
                0,
                vec![Channel::new("Count", IecDataType::Usint, 0, 0, 8, Direction::Input).unwrap()],
            )
            .unwrap(),
        ))
    }

    #[test]
    fn test_cycle_exchanges_and_snapshots() {
        let image = image();
        let mut sync = DataSync::new(Counter { fail: false }, Arc::clone(&image));
        sync.run_cycle().unwrap();
        let event = sync.run_cycle().unwrap();
        let MonitorEvent::ProcessImage { cycle, image: snapshot } = event else {
            panic!("unexpected event");
        };
        assert_eq!(cycle, 2);
        assert_eq!(snapshot.input, vec![2]);
        assert_eq!(snapshot.channels[0].value, "2");
        assert_eq!(
            image.lock().unwrap().read_value("Count"),
            Ok(IecValue::Usint(2))
        );
    }

    #[test]
    fn test_failed_exchange_does_not_count() {
        let mut sync = DataSync::new(Counter { fail: true }, image());
        assert_eq!(sync.run_cycle(), Err(DispatchError::StackNotRunning));
        assert_eq!(sync.cycle_count(), 0);
    }

    #[tokio::test]
    async fn test_run_publishes_snapshots() {
        let (events, mut rx) = broadcast::channel(8);
        let task = tokio::spawn(
            DataSync::new(Counter { fail: false }, image()).run(Duration::from_millis(5), events),
        );
        for expected in 1..=3u64 {
            let event = time::timeout(Duration::from_secs(5), rx.recv())
                .await
                .unwrap()
                .unwrap();
            assert!(matches!(event, MonitorEvent::ProcessImage { cycle, .. } if cycle == expected));
        }
        task.abort();
    }
}
