//! blitsynth - plays a short demo through the default audio output
//!
//! Run with: cargo run --release
//! Set RUST_LOG=debug to see engine lifecycle messages.

mod app;

use std::{thread, time::Duration};

use app::Player;
use blitsynth::{
    dsp::envelope::EnvelopeParams, GlideMode, PolyMode, SynthMessage, SynthParams,
};
use log::info;

/// Quarter note at 100 BPM.
const BEAT: Duration = Duration::from_millis(600);

fn note_on(player: &mut Player, note: u8, velocity: u8) {
    player.send(SynthMessage::NoteOn { note, velocity });
}

fn note_off(player: &mut Player, note: u8) {
    player.send(SynthMessage::NoteOff { note, velocity: 0 });
}

/// Warm detuned pad for the chords.
fn pad(sample_rate: f32) -> SynthParams {
    let mut params = SynthParams::new(sample_rate);
    params.amp_envelope = EnvelopeParams::from_times(0.08, 0.6, 0.7, 0.4, sample_rate);
    params.osc_mix = 1.0;
    params.detune = 1.004;
    params.noise_mix = 0.01;
    params.filter_key_tracking = 2.0;
    params.filter_lfo_depth = 0.3;
    params.volume_trim = 0.002;
    params
}

fn chords(player: &mut Player) {
    info!("poly: chord progression with the sustain pedal");

    let progression: [[u8; 4]; 4] = [
        [48, 55, 60, 64],
        [45, 52, 57, 60],
        [41, 48, 53, 57],
        [43, 50, 55, 59],
    ];

    for chord in progression {
        player.send(SynthMessage::ControlChange {
            controller: 0x40,
            value: 127,
        });
        for &note in &chord {
            note_on(player, note, 90);
        }
        thread::sleep(BEAT);
        for &note in &chord {
            note_off(player, note);
        }
        thread::sleep(BEAT);
        player.send(SynthMessage::ControlChange {
            controller: 0x40,
            value: 0,
        });
        thread::sleep(BEAT / 4);
    }

    thread::sleep(BEAT * 2);
}

fn lead(player: &mut Player) {
    info!("mono: legato phrase with glide and mod wheel");

    player.send(SynthMessage::ControlChange {
        controller: 0x01,
        value: 70,
    });

    // Each short note glides off the held C, and its release falls back to it
    note_on(player, 60, 100);
    thread::sleep(BEAT);
    for note in [63, 67, 70, 72] {
        note_on(player, note, 100);
        thread::sleep(BEAT / 2);
        note_off(player, note);
    }
    thread::sleep(BEAT);

    // Bend the held note up and back
    for step in (0..=16u16).chain((0..16).rev()) {
        player.send(SynthMessage::PitchBend {
            value: 8192 + step * 511,
        });
        thread::sleep(BEAT / 16);
    }
    note_off(player, 60);
    thread::sleep(BEAT * 2);

    player.send(SynthMessage::AllNotesOff);
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("=== blitsynth ===");

    let mut player = Player::start(pad)?;
    println!("Sample rate: {} Hz", player.sample_rate());
    chords(&mut player);
    drop(player);

    let mut player = Player::start(|sample_rate| {
        let mut params = SynthParams::new(sample_rate);
        params.poly_mode = PolyMode::Mono;
        params.glide_mode = GlideMode::Legato;
        params.glide_rate = 0.05;
        params.vibrato = 0.004;
        params.filter_envelope.sustain = 0.3;
        params
    })?;
    lead(&mut player);
    thread::sleep(BEAT);

    println!("Done.");
    Ok(())
}
