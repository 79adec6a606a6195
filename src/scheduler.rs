use std::time::Duration;

use rand::Rng;
use tokio::sync::watch;

/// Paces a poller: a fixed interval plus optional random jitter, cut short by shutdown.
pub struct Ticker {
    interval: Duration,
    jitter: Duration,
    shutdown: watch::Receiver<bool>,
}

impl Ticker {
    pub fn new(interval: Duration, shutdown: watch::Receiver<bool>) -> Self {
        Self {
            interval,
            jitter: Duration::ZERO,
            shutdown,
        }
    }

    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    /// Interval plus a uniform draw from `[0, jitter]`.
    pub fn next_delay(&self) -> Duration {
        if self.jitter.is_zero() {
            return self.interval;
        }
        let max_ms = u64::try_from(self.jitter.as_millis()).unwrap_or(u64::MAX);
        self.interval + Duration::from_millis(rand::thread_rng().gen_range(0..=max_ms))
    }

    pub fn is_shutdown(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Sleep until the next tick. Returns `false` once shutdown is signalled
    /// or the shutdown sender is gone.
    pub async fn wait(&mut self) -> bool {
        if self.is_shutdown() {
            return false;
        }
        let sleep = tokio::time::sleep(self.next_delay());
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                () = &mut sleep => return !self.is_shutdown(),
                changed = self.shutdown.changed() => {
                    if changed.is_err() || self.is_shutdown() {
                        return false;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_without_jitter_is_exact() {
        let (_tx, rx) = watch::channel(false);
        let ticker = Ticker::new(Duration::from_secs(30), rx);
        assert_eq!(ticker.next_delay(), Duration::from_secs(30));
    }

    #[test]
    fn delay_with_jitter_is_bounded() {
        let (_tx, rx) = watch::channel(false);
        let ticker = Ticker::new(Duration::from_secs(30), rx).with_jitter(Duration::from_secs(5));
        for _ in 0..100 {
            let d = ticker.next_delay();
            assert!(d >= Duration::from_secs(30) && d <= Duration::from_secs(35));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn wait_ticks_after_interval() {
        let (_tx, rx) = watch::channel(false);
        let mut ticker = Ticker::new(Duration::from_secs(60), rx);
        let start = tokio::time::Instant::now();
        assert!(ticker.wait().await);
        assert!(start.elapsed() >= Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_interrupts_wait() {
        let (tx, rx) = watch::channel(false);
        let mut ticker = Ticker::new(Duration::from_secs(3600), rx);
        let handle = tokio::spawn(async move { ticker.wait().await });
        tokio::time::sleep(Duration::from_secs(1)).await;
        tx.send(true).unwrap();
        assert!(!handle.await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_sender_stops_ticker() {
        let (tx, rx) = watch::channel(false);
        let mut ticker = Ticker::new(Duration::from_secs(3600), rx);
        drop(tx);
        assert!(!ticker.wait().await);
    }

    #[tokio::test]
    async fn already_shut_down_returns_immediately() {
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();
        let mut ticker = Ticker::new(Duration::from_secs(3600), rx);
        assert!(!ticker.wait().await);
    }
}
