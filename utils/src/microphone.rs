use crate::audio::{audio_tap, downmix, AudioTap, DropReporter, TAP_SECONDS};
use crate::device;
use cpal::traits::{DeviceTrait, StreamTrait};
use std::time::{Duration, Instant};

const DROP_REPORT_INTERVAL: Duration = Duration::from_secs(5);

/// A running microphone stream feeding an [`AudioTap`].
///
/// Audio is only recorded while a source opened from the tap is alive, so a
/// disabled voice signal keeps nothing. The stream stops when this value is
/// dropped.
pub struct Microphone {
    _stream: cpal::Stream,
    tap: AudioTap,
    name: String,
}

impl Microphone {
    pub fn open(device_name: Option<String>) -> anyhow::Result<Self> {
        let input = device::get_or_default_input(device_name)?;
        let name = input.name()?;
        let config = input.default_input_config()?.config();
        let channels = config.channels as usize;
        let sample_rate = config.sample_rate.0;
        tracing::info!("Using input device: {} ({}ch, {}hz)", name, channels, sample_rate);

        let (mut feed, tap) = audio_tap(sample_rate as usize * TAP_SECONDS, sample_rate);
        let mut drops = DropReporter::new(DROP_REPORT_INTERVAL);
        let input_data_fn = move |data: &[f32], _: &cpal::InputCallbackInfo| {
            if !feed.is_armed() {
                return;
            }
            let dropped = feed.push(&downmix(data, channels));
            if let Some(total) = drops.record(dropped, Instant::now()) {
                tracing::warn!("audio tap full, dropped {} samples", total);
            }
        };
        let stream = input.build_input_stream(
            &config,
            input_data_fn,
            move |err| tracing::error!("An error occurred on input stream: {}", err),
            None,
        )?;
        stream.play()?;

        Ok(Self {
            _stream: stream,
            tap,
            name,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// A handle on the recorded audio, usable as the voice capture device.
    pub fn tap(&self) -> AudioTap {
        self.tap.clone()
    }
}
