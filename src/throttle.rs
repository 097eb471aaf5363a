//! Courtesy pause between successive Spotify lookups.

use std::time::{Duration, Instant};

/// Spotify has no published fixed limit; one request pair per second keeps
/// long runs well clear of 429s.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(1000);

/// Blocks until at least `interval` has passed since the previous call.
/// The first call never blocks.
pub struct Throttle {
    interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub fn wait(&mut self) {
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                std::thread::sleep(self.interval - elapsed);
            }
        }
        self.last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_wait_does_not_block() {
        let mut throttle = Throttle::new(Duration::from_secs(60));
        let start = Instant::now();
        throttle.wait();
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_second_wait_respects_interval() {
        let mut throttle = Throttle::new(Duration::from_millis(30));
        throttle.wait();
        let start = Instant::now();
        throttle.wait();
        assert!(start.elapsed() >= Duration::from_millis(25));
    }
}
