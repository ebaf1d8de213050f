//! Audio device setup and the realtime render callback

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    SampleFormat,
};
use rtrb::RingBuffer;

use saavy_poly::{Patch, Synth, SynthMessage, MAX_BLOCK_SIZE};

use super::ui::{EngineSnapshot, UiApp};

/// Pending MIDI and parameter messages, UI → audio.
const MESSAGE_CAPACITY: usize = 256;
/// Meter snapshots, audio → UI. One per callback.
const SNAPSHOT_CAPACITY: usize = 64;

/// Open the default output, start the engine and hand the terminal to the UI
/// until the user quits.
pub fn run(patch: Patch) -> EyreResult<()> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    if config.sample_format() != SampleFormat::F32 {
        return Err(eyre!(
            "output device wants {:?} samples, only f32 is supported",
            config.sample_format()
        ));
    }

    let sample_rate = config.sample_rate().0 as f32;
    let channels = config.channels() as usize;

    let params = patch.to_params(sample_rate);

    let mut synth = Synth::new();
    synth.allocate_resources(sample_rate, MAX_BLOCK_SIZE);
    synth.set_params(params);
    synth.reset();

    let (message_tx, mut message_rx) = RingBuffer::<SynthMessage>::new(MESSAGE_CAPACITY);
    let (mut snapshot_tx, snapshot_rx) = RingBuffer::<EngineSnapshot>::new(SNAPSHOT_CAPACITY);

    // Preallocated so the callback never allocates
    let mut left_buf = vec![0.0f32; MAX_BLOCK_SIZE];
    let mut right_buf = vec![0.0f32; MAX_BLOCK_SIZE];

    let stream = device.build_output_stream(
        &config.into(),
        move |data: &mut [f32], _| {
            synth.process_messages(&mut message_rx);

            let total_frames = data.len() / channels;
            let mut frames_written = 0;
            let mut peak = 0.0f32;

            while frames_written < total_frames {
                let frames_to_render = (total_frames - frames_written).min(MAX_BLOCK_SIZE);

                let left = &mut left_buf[..frames_to_render];
                let right = &mut right_buf[..frames_to_render];
                synth.render(left, Some(&mut *right));

                let out_start = frames_written * channels;
                let out = &mut data[out_start..out_start + frames_to_render * channels];
                for (frame, (&l, &r)) in out
                    .chunks_exact_mut(channels)
                    .zip(left.iter().zip(right.iter()))
                {
                    write_frame(frame, l, r);
                }

                peak = left
                    .iter()
                    .chain(right.iter())
                    .fold(peak, |acc, sample| acc.max(sample.abs()));

                frames_written += frames_to_render;
            }

            // A full ring means the UI is behind; it only needs the latest anyway
            let _ = snapshot_tx.push(EngineSnapshot::capture(&synth, peak));
        },
        |err| eprintln!("Audio error: {}", err),
        None,
    )?;

    stream.play()?;

    let mut terminal = ratatui::init();
    let result = UiApp::new(message_tx, snapshot_rx, patch, params, sample_rate).run(&mut terminal);
    ratatui::restore();

    drop(stream);
    result
}

/// Stereo into the first two channels, mono devices get the average, any
/// extra channels stay silent.
fn write_frame(frame: &mut [f32], left: f32, right: f32) {
    match frame {
        [mono] => *mono = (left + right) * 0.5,
        [out_left, out_right, rest @ ..] => {
            *out_left = left;
            *out_right = right;
            rest.fill(0.0);
        }
        [] => {}
    }
}
