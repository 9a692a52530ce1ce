//! Audio device setup and the realtime callback.

use std::sync::Arc;

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{error, info, warn};
use rtrb::{Producer, RingBuffer};

use blitsynth::{
    dsp::guard::GuardMeter, Synth, SynthMessage, SynthParams, MAX_BLOCK_SIZE,
};

/// Control messages that can be queued between two audio callbacks.
const QUEUE_CAPACITY: usize = 256;

/// A running output stream with a synth inside it.
pub struct Player {
    tx: Producer<SynthMessage>,
    sample_rate: f32,
    meter: Arc<GuardMeter>,
    // Dropping the stream stops playback
    _stream: cpal::Stream,
}

impl Player {
    /// Open the default output device and start rendering.
    ///
    /// `configure` receives the device sample rate and returns the patch.
    pub fn start(configure: impl FnOnce(f32) -> SynthParams) -> EyreResult<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;
        info!("output: {sample_rate} Hz, {channels} channel(s)");

        let params = configure(sample_rate);
        params
            .validate()
            .wrap_err("patch has invalid parameters")?;

        let mut synth = Synth::new(params);
        synth
            .allocate_resources(sample_rate, MAX_BLOCK_SIZE)
            .wrap_err("failed to prepare synth")?;

        let meter = synth.guard_meter();
        let (tx, mut rx) = RingBuffer::<SynthMessage>::new(QUEUE_CAPACITY);

        let mut left = vec![0.0f32; MAX_BLOCK_SIZE];
        let mut right = vec![0.0f32; MAX_BLOCK_SIZE];

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                synth.drain_messages(&mut rx);

                for frames in data.chunks_mut(MAX_BLOCK_SIZE * channels) {
                    let count = frames.len() / channels;
                    let (l, r) = (&mut left[..count], &mut right[..count]);

                    if channels == 1 {
                        synth.render(l, None);
                    } else {
                        synth.render(l, Some(&mut *r));
                    }

                    for (i, frame) in frames.chunks_mut(channels).enumerate() {
                        match frame {
                            [mono] => *mono = l[i],
                            [out_l, out_r, rest @ ..] => {
                                *out_l = l[i];
                                *out_r = r[i];
                                rest.fill(0.0);
                            }
                            [] => {}
                        }
                    }
                }
            },
            |err| error!("audio stream error: {err}"),
            None,
        )?;

        stream.play()?;

        Ok(Self {
            tx,
            sample_rate,
            meter,
            _stream: stream,
        })
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Queue a message for the audio thread. Dropped if the queue is full.
    pub fn send(&mut self, message: SynthMessage) {
        self.report_output();
        if self.tx.push(message).is_err() {
            error!("message queue full, dropped {message:?}");
        }
    }

    /// Log anything the output guard caught since the last check.
    pub fn report_output(&self) {
        if let Some(report) = self.meter.take_snapshot() {
            warn!(
                "output guard: {} buffer(s) clipped, {} silenced",
                report.clipped, report.silenced
            );
        }
    }
}
