use crate::capture::{CaptureDevice, CaptureSource};
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// A self-contained audio segment (mono 16-bit PCM WAV).
pub type AudioChunk = Vec<u8>;

/// How many seconds of audio the tap holds before dropping new samples.
pub const TAP_SECONDS: usize = 10;

pub fn shared_buffer(size: usize) -> HeapRb<f32> {
    HeapRb::new(size)
}

/// Averages interleaved frames down to one channel.
pub fn downmix(data: &[f32], channels: usize) -> Vec<f32> {
    if channels > 1 {
        data.chunks(channels)
            .map(|c| c.iter().sum::<f32>() / channels as f32)
            .collect()
    } else {
        data.to_vec()
    }
}

pub fn encode_wav(samples: &[f32], sample_rate: u32) -> anyhow::Result<AudioChunk> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for &sample in samples {
            let pcm = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer.write_sample(pcm)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

/// Producer half of an audio tap; lives with the capture callback.
///
/// Samples are only kept while at least one source opened from the tap is
/// alive. Otherwise they are discarded on arrival.
pub struct AudioFeed {
    producer: HeapProd<f32>,
    listeners: Arc<AtomicUsize>,
}

impl AudioFeed {
    pub fn is_armed(&self) -> bool {
        self.listeners.load(Ordering::Acquire) > 0
    }

    /// Pushes mono samples, returning how many were dropped for lack of room.
    /// Samples arriving while the feed is not armed are discarded and not
    /// counted as dropped.
    pub fn push(&mut self, samples: &[f32]) -> usize {
        if !self.is_armed() {
            return 0;
        }
        let pushed = self.producer.push_slice(samples);
        samples.len() - pushed
    }
}

/// Collapses a stream of drop counts into at most one report per `interval`.
#[derive(Debug)]
pub struct DropReporter {
    interval: Duration,
    pending: usize,
    last_report: Option<Instant>,
}

impl DropReporter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            pending: 0,
            last_report: None,
        }
    }

    /// Adds `dropped` and returns the total to report, if one is due at `now`.
    pub fn record(&mut self, dropped: usize, now: Instant) -> Option<usize> {
        self.pending += dropped;
        if self.pending == 0 {
            return None;
        }
        let due = self
            .last_report
            .map_or(true, |last| now.duration_since(last) >= self.interval);
        if !due {
            return None;
        }
        self.last_report = Some(now);
        Some(std::mem::take(&mut self.pending))
    }
}

/// Consumer half of an audio tap. Opening it arms the feed.
#[derive(Clone)]
pub struct AudioTap {
    consumer: Arc<Mutex<HeapCons<f32>>>,
    listeners: Arc<AtomicUsize>,
    sample_rate: u32,
}

pub fn audio_tap(capacity: usize, sample_rate: u32) -> (AudioFeed, AudioTap) {
    let (producer, consumer) = shared_buffer(capacity).split();
    let listeners = Arc::new(AtomicUsize::new(0));
    (
        AudioFeed {
            producer,
            listeners: Arc::clone(&listeners),
        },
        AudioTap {
            consumer: Arc::new(Mutex::new(consumer)),
            listeners,
            sample_rate,
        },
    )
}

impl AudioTap {
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn drain(&self) -> Vec<f32> {
        match self.consumer.lock() {
            Ok(mut consumer) => consumer.pop_iter().collect(),
            Err(_) => {
                tracing::error!("audio tap poisoned");
                Vec::new()
            }
        }
    }
}

impl CaptureDevice<AudioChunk> for AudioTap {
    fn open(&mut self) -> anyhow::Result<Box<dyn CaptureSource<AudioChunk>>> {
        // Audio left over from a previous source must not leak into the first chunk.
        let stale = self.drain().len();
        if stale > 0 {
            tracing::debug!("discarded {} buffered samples", stale);
        }
        self.listeners.fetch_add(1, Ordering::AcqRel);
        Ok(Box::new(TapSource { tap: self.clone() }))
    }
}

/// A live reader of an [`AudioTap`]. Each capture drains everything recorded
/// since the previous one into a single WAV chunk. Dropping the last one
/// disarms the feed.
pub struct TapSource {
    tap: AudioTap,
}

impl CaptureSource<AudioChunk> for TapSource {
    fn capture(&mut self) -> Option<AudioChunk> {
        let samples = self.tap.drain();
        if samples.is_empty() {
            return None;
        }
        match encode_wav(&samples, self.tap.sample_rate) {
            Ok(chunk) => Some(chunk),
            Err(e) => {
                tracing::warn!("failed to encode audio chunk: {}", e);
                None
            }
        }
    }
}

impl Drop for TapSource {
    fn drop(&mut self) {
        self.tap.listeners.fetch_sub(1, Ordering::AcqRel);
    }
}
