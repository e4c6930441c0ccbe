//! Periodic sampling of capture sources.

use crate::guard::Revocable;
use crate::utils::CaptureSource;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Turns a [`CaptureSource`] into a stream of payloads on a fixed cadence.
pub struct MediaSampler;

impl MediaSampler {
    /// Starts sampling `source` every `cadence`.
    ///
    /// Each tick captures at most one payload and hands it to `on_sample`.
    /// Ticks where the source is not ready are skipped silently. The first
    /// tick fires one full cadence after the start.
    pub fn start<P, S, F>(cadence: Duration, mut source: S, mut on_sample: F) -> SamplerHandle
    where
        P: Send + 'static,
        S: CaptureSource<P> + 'static,
        F: FnMut(P) + Send + 'static,
    {
        let live = Revocable::new(());
        let task_live = live.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + cadence, cadence);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if task_live.is_revoked() {
                    break;
                }
                let Some(payload) = source.capture() else {
                    tracing::trace!("capture source not ready, skipping tick");
                    continue;
                };
                if task_live.with(|_| on_sample(payload)).is_none() {
                    tracing::debug!("sampler stopped mid-tick, payload dropped");
                    break;
                }
            }
        });

        SamplerHandle {
            live,
            task,
            cadence,
        }
    }
}

/// Owner of a running sampler. Dropping it stops the sampler.
#[derive(Debug)]
pub struct SamplerHandle {
    live: Revocable<()>,
    task: JoinHandle<()>,
    cadence: Duration,
}

impl SamplerHandle {
    /// Stops the sampler. After this returns `on_sample` is never invoked
    /// again, even for a tick that was already due. Idempotent.
    pub fn stop(&self) {
        if self.live.revoke() {
            tracing::debug!("sampler stopped ({:?} cadence)", self.cadence);
        }
        self.task.abort();
    }

    pub fn is_stopped(&self) -> bool {
        self.live.is_revoked()
    }

    pub fn cadence(&self) -> Duration {
        self.cadence
    }
}

impl Drop for SamplerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Yields increasing numbers once `warmup` captures have been refused.
    struct Counter {
        warmup: u32,
        next: u32,
    }

    impl CaptureSource<u32> for Counter {
        fn capture(&mut self) -> Option<u32> {
            if self.warmup > 0 {
                self.warmup -= 1;
                return None;
            }
            self.next += 1;
            Some(self.next)
        }
    }

    fn collecting() -> (Arc<std::sync::Mutex<Vec<u32>>>, impl FnMut(u32) + Send + 'static) {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |n| sink.lock().unwrap().push(n))
    }

    #[tokio::test(start_paused = true)]
    async fn emits_one_payload_per_tick() {
        let (seen, on_sample) = collecting();
        let handle = MediaSampler::start(
            Duration::from_millis(1500),
            Counter { warmup: 0, next: 0 },
            on_sample,
        );

        tokio::time::sleep(Duration::from_millis(1400)).await;
        assert!(seen.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_millis(3200)).await;
        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
        handle.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn skips_ticks_while_source_is_not_ready() {
        let (seen, on_sample) = collecting();
        let _handle = MediaSampler::start(
            Duration::from_millis(2000),
            Counter { warmup: 2, next: 0 },
            on_sample,
        );

        tokio::time::sleep(Duration::from_millis(8100)).await;
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn no_payloads_after_stop() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let handle = MediaSampler::start(
            Duration::from_millis(1500),
            Counter { warmup: 0, next: 0 },
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        );

        tokio::time::sleep(Duration::from_millis(1600)).await;
        handle.stop();
        let frozen = calls.load(Ordering::SeqCst);
        assert_eq!(frozen, 1);
        assert!(handle.is_stopped());

        tokio::time::sleep(Duration::from_millis(10_000)).await;
        assert_eq!(calls.load(Ordering::SeqCst), frozen);
        handle.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_stops_sampling() {
        let (seen, on_sample) = collecting();
        let handle = MediaSampler::start(
            Duration::from_millis(1000),
            Counter { warmup: 0, next: 0 },
            on_sample,
        );
        tokio::time::sleep(Duration::from_millis(1100)).await;
        drop(handle);
        tokio::time::sleep(Duration::from_millis(5000)).await;
        assert_eq!(*seen.lock().unwrap(), vec![1]);
    }
}
