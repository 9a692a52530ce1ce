use std::{f32::consts::PI, ops::Range, sync::Arc};

use log::{debug, info};

use crate::{
    dsp::{
        guard::{protect_your_ears, BufferHealth, GuardMeter},
        lfo::Lfo,
        noise::NoiseGenerator,
        smoother::LinearSmoother,
    },
    error::EngineError,
    io::{
        converter::midi_to_synth,
        midi::{MidiEvent, TimedMidi},
    },
    synth::{
        held_notes::HeldNotes,
        message::{cc, MessageReceiver, SynthMessage},
        params::{GlideMode, PolyMode, SynthParams, SEMITONE},
        voice::{Voice, VoiceNote},
    },
    MAX_BLOCK_SIZE, MAX_VOICES,
};

/*
Polyphonic Engine
=================

The engine owns a fixed pool of voices and everything shared between them:
the noise source, the LFO, the controller state and the master gain. Nothing
is allocated after construction.

Vocabulary
----------

  block        The span of samples the host asks for in one `render()` call.
               Block-constant values (pitch bend, Q, glide rate) are copied
               into the active voices once at the start.

  tick         One LFO update, every 32 samples. Vibrato, PWM and the filter
               modulation are recomputed and pushed into the voices.

  steal        Reusing a sounding voice for a new note because the pool has
               no silent one left.

  legato       Pressing a new key before releasing the previous one.


Voice Allocation
----------------

Polyphonic note-ons take the quietest voice that is not in its attack stage:

    voice   0     1     2     3     4     5     6     7
    level  0.86  0.00  0.75  0.91  0.00  0.88  0.93  1.00
    attack  -     -     -     -     -     -     -     ●
                  ↑
                  first voice with the lowest level wins

Silent voices have level 0.0, so they are always used first. Once every voice
sounds, the one furthest into its release (or decay) is stolen. A voice still
in attack is never stolen while any other voice is available. When every voice
is in attack, voice 0 is taken.


Mono Mode and the Held-Note Queue
---------------------------------

In mono mode everything plays on voice 0. A new key while another is sounding
does not retrigger the envelopes; the voice is retuned in place and the old
key is remembered:

    press C     voice 0 = C          queue = []
    press E     voice 0 = E          queue = [C]
    press G     voice 0 = G          queue = [E, C]
    release G   voice 0 = E          queue = [C]
    release C   voice 0 = E          queue = []      (C was only queued)
    release E   voice 0 released

Queued keys that are released are dropped, so they can never come back.


Sustain Pedal
-------------

While the pedal is down, note-offs do not release voices. The voice is tagged
`Sustained` instead. Lifting the pedal releases every `Sustained` voice at
once.


Pitch
-----

A note's period in samples is

    period = tune × e^(−ln2/12 × (note + 0.002 × voice_index))

The small per-voice offset detunes the pool slightly against itself, like the
drift between the voice cards of an analog polysynth. Periods shorter than 6
samples are raised an octave at a time: the oscillator needs at least a few
samples per half cycle.
*/

/// Per-voice pitch drift, in semitones per voice index.
const ANALOG: f32 = 0.002;

/// Shortest period the oscillators can render, in samples.
const MIN_PERIOD: f32 = 6.0;

/// Upper bound on octave shifts in `calc_period`.
const MAX_OCTAVE_SHIFTS: u32 = 32;

/// Frequency ratio of one semitone.
const SEMITONE_RATIO: f32 = 1.059_463_1;

/// One-pole coefficient for de-zippering the filter modulation per tick.
const FILTER_ZIP: f32 = 0.005;

/// Velocity used for every note when velocity is ignored.
const FIXED_VELOCITY: u8 = 80;

/// Ramp time for output level changes.
const OUTPUT_RAMP_SECONDS: f32 = 0.05;

const DEFAULT_SAMPLE_RATE: f32 = 44_100.0;

/// Scalars derived from MIDI controllers. Reset to these defaults by
/// `Synth::reset()`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Controllers {
    /// Period multiplier; 1.0 = wheel centered.
    pub pitch_bend: f32,
    pub sustain_pedal: bool,
    /// Extra vibrato and PWM depth.
    pub mod_wheel: f32,
    /// Multiplier on the filter Q.
    pub resonance: f32,
    /// Channel aftertouch, adds to the filter LFO depth.
    pub pressure: f32,
    /// Cutoff shift from the filter +/- controllers.
    pub filter_offset: f32,
}

impl Default for Controllers {
    fn default() -> Self {
        Self {
            pitch_bend: 1.0,
            sustain_pedal: false,
            mod_wheel: 0.0,
            resonance: 1.0,
            pressure: 0.0,
            filter_offset: 0.0,
        }
    }
}

pub struct Synth {
    params: SynthParams,
    sample_rate: f32,

    voices: [Voice; MAX_VOICES],
    noise: NoiseGenerator,
    lfo: Lfo,

    held_notes: HeldNotes,
    /// Most recently started note, for glide.
    last_note: Option<u8>,

    /// Smoothed filter modulation.
    filter_zip: f32,

    controllers: Controllers,
    output_level: LinearSmoother,

    /// Worst guard result of the last `render()`.
    last_health: BufferHealth,
    guard_meter: Arc<GuardMeter>,
}

impl Synth {
    pub fn new(params: SynthParams) -> Self {
        let mut synth = Self {
            output_level: LinearSmoother::new(params.output_level),
            params,
            sample_rate: DEFAULT_SAMPLE_RATE,
            voices: std::array::from_fn(|_| Voice::new(DEFAULT_SAMPLE_RATE)),
            noise: NoiseGenerator::new(),
            lfo: Lfo::new(),
            held_notes: HeldNotes::new(),
            last_note: None,
            filter_zip: 0.0,
            controllers: Controllers::default(),
            last_health: BufferHealth::Clean,
            guard_meter: Arc::new(GuardMeter::new()),
        };
        synth.reset();
        synth
    }

    /// Prepare for playback at `sample_rate`. Resets the engine.
    ///
    /// Parameters that depend on the rate (tune, envelope multipliers, LFO
    /// increment) are not touched; the caller supplies them for the new rate.
    pub fn allocate_resources(
        &mut self,
        sample_rate: f32,
        max_block_size: usize,
    ) -> Result<(), EngineError> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(EngineError::InvalidSampleRate(sample_rate));
        }
        if max_block_size == 0 || max_block_size > MAX_BLOCK_SIZE {
            return Err(EngineError::InvalidBlockSize(max_block_size));
        }

        info!("allocating synth: {sample_rate} Hz, blocks up to {max_block_size} samples");

        self.sample_rate = sample_rate;
        for voice in &mut self.voices {
            voice.filter.sample_rate = sample_rate;
        }
        self.reset();

        Ok(())
    }

    /// Counterpart of `allocate_resources`. The pool is fixed-size, so there
    /// is nothing to free; sounding voices are silenced.
    pub fn deallocate_resources(&mut self) {
        debug!("deallocating synth");
        for voice in &mut self.voices {
            voice.reset();
        }
    }

    /// Silence everything and return every piece of state to its default.
    pub fn reset(&mut self) {
        debug!("resetting synth");

        for voice in &mut self.voices {
            voice.reset();
        }
        self.noise.reset();
        self.lfo.reset();

        self.held_notes.clear();
        self.last_note = None;
        self.filter_zip = 0.0;
        self.controllers = Controllers::default();
        self.last_health = BufferHealth::Clean;

        self.output_level.reset(self.sample_rate, OUTPUT_RAMP_SECONDS);
        self.output_level.set_current_and_target(self.params.output_level);
    }

    // --- Rendering ---------------------------------------------------------

    /// Render into `left`, and `right` if given. Without a right channel the
    /// two sides are mixed down to mono. With one, `min(left, right)` samples
    /// are rendered.
    pub fn render(&mut self, left: &mut [f32], right: Option<&mut [f32]>) {
        self.output_level.set_target(self.params.output_level);

        for voice in self.voices.iter_mut().filter(|v| v.is_active()) {
            update_period(voice, self.controllers.pitch_bend, self.params.detune);
            voice.glide_rate = self.params.glide_rate;
            voice.filter_q = self.params.filter_q * self.controllers.resonance;
            voice.pitch_bend = self.controllers.pitch_bend;
            voice.filter_env_depth = self.params.filter_env_depth;
        }

        match right {
            Some(right) => {
                let frames = left.len().min(right.len());
                let (left, right) = (&mut left[..frames], &mut right[..frames]);

                for (l, r) in left.iter_mut().zip(right.iter_mut()) {
                    (*l, *r) = self.next_frame();
                }

                self.deactivate_silent_voices();
                self.last_health = protect_your_ears(left).max(protect_your_ears(right));
            }
            None => {
                for out in left.iter_mut() {
                    let (l, r) = self.next_frame();
                    *out = (l + r) * 0.5;
                }

                self.deactivate_silent_voices();
                self.last_health = protect_your_ears(left);
            }
        }

        self.guard_meter.record(self.last_health);
    }

    /// Render a whole host block, applying raw MIDI events at their sample
    /// offsets.
    ///
    /// Offsets are clamped to the block and must not go backwards; an event
    /// earlier than the previous one is applied at the previous one's offset.
    pub fn process_block(
        &mut self,
        left: &mut [f32],
        mut right: Option<&mut [f32]>,
        events: &[TimedMidi],
    ) {
        let frames = right
            .as_deref()
            .map_or(left.len(), |r| left.len().min(r.len()));

        let mut position = 0;
        for event in events {
            let offset = event.sample_offset.clamp(position, frames);
            if offset > position {
                self.render_range(left, &mut right, position..offset);
                position = offset;
            }

            if let Some(message) = MidiEvent::from_slice(event.bytes).and_then(midi_to_synth) {
                self.handle_message(message);
            }
        }

        if position < frames {
            self.render_range(left, &mut right, position..frames);
        }
    }

    fn render_range(
        &mut self,
        left: &mut [f32],
        right: &mut Option<&mut [f32]>,
        range: Range<usize>,
    ) {
        let right = right.as_deref_mut().map(|r| &mut r[range.clone()]);
        self.render(&mut left[range], right);
    }

    #[inline]
    fn next_frame(&mut self) -> (f32, f32) {
        self.update_lfo();

        let noise = self.noise.next_value() * self.params.noise_mix;

        let mut left = 0.0;
        let mut right = 0.0;
        for voice in self.voices.iter_mut().filter(|v| v.is_active()) {
            let output = voice.render(noise);
            let (pan_left, pan_right) = voice.pan();
            left += output * pan_left;
            right += output * pan_right;
        }

        let level = self.output_level.next_value();
        (left * level, right * level)
    }

    fn deactivate_silent_voices(&mut self) {
        for voice in self.voices.iter_mut().filter(|v| !v.is_active()) {
            voice.reset();
        }
    }

    /// Advance the LFO one sample. On a tick, push the new modulation into
    /// every active voice.
    fn update_lfo(&mut self) {
        let Some(sine) = self.lfo.tick(self.params.lfo_increment) else {
            return;
        };

        let params = &self.params;
        let controllers = &self.controllers;

        let vibrato_mod = 1.0 + sine * (controllers.mod_wheel + params.vibrato);
        let pwm = 1.0 + sine * (controllers.mod_wheel + params.pwm_depth);

        let filter_mod = params.filter_key_tracking
            + controllers.filter_offset
            + (params.filter_lfo_depth + controllers.pressure) * sine;
        self.filter_zip += FILTER_ZIP * (filter_mod - self.filter_zip);

        for voice in self.voices.iter_mut().filter(|v| v.is_active()) {
            voice.osc1.modulation = vibrato_mod;
            voice.osc2.modulation = pwm;
            voice.filter_mod = self.filter_zip;
            voice.update_lfo();
            update_period(voice, controllers.pitch_bend, params.detune);
        }
    }

    // --- Control events ----------------------------------------------------

    /// Apply a raw three-byte MIDI message. Anything the engine does not
    /// understand is ignored.
    pub fn midi_message(&mut self, status: u8, data1: u8, data2: u8) {
        if let Some(message) = MidiEvent::from_bytes(status, data1, data2).and_then(midi_to_synth)
        {
            self.handle_message(message);
        }
    }

    /// Apply every message waiting in `rx`.
    pub fn drain_messages<R: MessageReceiver + ?Sized>(&mut self, rx: &mut R) {
        while let Some(message) = rx.pop() {
            self.handle_message(message);
        }
    }

    pub fn handle_message(&mut self, message: SynthMessage) {
        match message {
            SynthMessage::NoteOn { note, velocity } if note <= 0x7F && velocity <= 0x7F => {
                if velocity == 0 {
                    self.note_off(note);
                } else {
                    self.note_on(note, velocity);
                }
            }
            SynthMessage::NoteOff { note, .. } if note <= 0x7F => self.note_off(note),
            SynthMessage::ControlChange { controller, value }
                if controller <= 0x7F && value <= 0x7F =>
            {
                self.control_change(controller, value);
            }
            SynthMessage::ChannelPressure { pressure } if pressure <= 0x7F => {
                // Parabolic: 0.0 at rest up to ~1.61 at full pressure
                self.controllers.pressure = 0.0001 * (pressure as f32 * pressure as f32);
            }
            SynthMessage::PitchBend { value } if value <= 0x3FFF => {
                // ±2 semitones
                self.controllers.pitch_bend = (-0.000_014_102 * (value as f32 - 8192.0)).exp();
            }
            SynthMessage::AllNotesOff => self.all_notes_off(),
            _ => {}
        }
    }

    fn control_change(&mut self, controller: u8, value: u8) {
        let v = value as f32;

        match controller {
            cc::MOD_WHEEL => self.controllers.mod_wheel = 0.000_005 * v * v,
            cc::SUSTAIN_PEDAL => {
                self.controllers.sustain_pedal = value >= 64;
                if !self.controllers.sustain_pedal {
                    self.release_sustained();
                }
            }
            cc::RESONANCE | cc::RESONANCE_ALT => {
                self.controllers.resonance = 154.0 / (154.0 - v);
            }
            cc::FILTER_UP | cc::FILTER_UP_ALT => self.controllers.filter_offset = 0.02 * v,
            cc::FILTER_DOWN | cc::FILTER_DOWN_ALT => self.controllers.filter_offset = -0.03 * v,
            c if c >= cc::ALL_NOTES_OFF_START => self.all_notes_off(),
            _ => {}
        }
    }

    /// Hard stop: every voice is reset immediately, without a release.
    pub fn all_notes_off(&mut self) {
        for voice in &mut self.voices {
            voice.reset();
        }
        self.controllers.sustain_pedal = false;
        self.held_notes.clear();
    }

    pub fn note_on(&mut self, note: u8, velocity: u8) {
        let velocity = if self.params.ignore_velocity {
            FIXED_VELOCITY
        } else {
            velocity
        };

        let index = match self.params.poly_mode {
            PolyMode::Mono => {
                if let VoiceNote::Key(current) = self.voices[0].note {
                    self.held_notes.push(current);
                    // Voices left over from poly mode would ring forever
                    for voice in &mut self.voices[1..] {
                        voice.release();
                        voice.note = VoiceNote::Idle;
                    }
                    self.restart_mono_voice(note, Some(velocity));
                    return;
                }
                0
            }
            PolyMode::Poly => self.find_free_voice(),
        };

        self.start_voice(index, note, velocity);
    }

    pub fn note_off(&mut self, note: u8) {
        self.release_note(VoiceNote::Key(note));
    }

    /// What lifting the sustain pedal does.
    fn release_sustained(&mut self) {
        self.release_note(VoiceNote::Sustained);
    }

    fn release_note(&mut self, target: VoiceNote) {
        if let VoiceNote::Key(note) = target {
            self.held_notes.remove(note);
        }

        if self.params.poly_mode == PolyMode::Mono && self.voices[0].note == target {
            if let Some(queued) = self.held_notes.pop_most_recent() {
                // Voice 0 now plays the queued key and no longer matches below
                self.restart_mono_voice(queued, None);
            }
        }

        let pedal = self.controllers.sustain_pedal;
        for voice in self.voices.iter_mut().filter(|v| v.note == target) {
            if pedal {
                voice.note = VoiceNote::Sustained;
            } else {
                voice.release();
                voice.note = VoiceNote::Idle;
            }
        }
    }

    fn start_voice(&mut self, index: usize, note: u8, velocity: u8) {
        let period = self.calc_period(index, note);

        let distance = match self.last_note {
            Some(last)
                if self.params.glide_mode == GlideMode::Always
                    || (self.params.glide_mode == GlideMode::Legato
                        && self.is_playing_legato_style()) =>
            {
                note as f32 - last as f32
            }
            _ => 0.0,
        };

        self.last_note = Some(note);

        let params = &self.params;
        let voice = &mut self.voices[index];

        voice.target = period;
        // Start from the previous note's pitch when gliding. The bend applies
        // either way.
        voice.period =
            (period * SEMITONE_RATIO.powf(distance - params.glide_bend)).max(MIN_PERIOD);

        voice.note = VoiceNote::Key(note);
        voice.update_panning();

        voice.cutoff = self.sample_rate / (period * PI)
            * (params.velocity_sensitivity * (velocity as f32 - 64.0)).exp();

        // Parabolic velocity curve
        let velocity = velocity as f32;
        let level = 0.004 * (velocity + 64.0) * (velocity + 64.0) - 8.0;
        voice.osc1.amplitude = params.volume_trim * level;
        voice.osc2.amplitude = voice.osc1.amplitude * params.osc_mix;

        if params.vibrato == 0.0 && params.pwm_depth > 0.0 {
            voice.osc2.square_wave(&voice.osc1, voice.period);
        }

        voice.env.set_params(params.amp_envelope);
        voice.env.attack();

        voice.filter_env.set_params(params.filter_envelope);
        voice.filter_env.attack();
    }

    /// Retune voice 0 without a new attack. Used for legato in mono mode
    /// and when a queued key takes over. A queued key has no velocity left.
    fn restart_mono_voice(&mut self, note: u8, velocity: Option<u8>) {
        let period = self.calc_period(0, note);

        let params = &self.params;
        let voice = &mut self.voices[0];

        voice.target = period;
        if params.glide_mode == GlideMode::Off {
            voice.period = period;
        }

        voice.cutoff = self.sample_rate / (period * PI);
        if let Some(velocity) = velocity {
            voice.cutoff *= (params.velocity_sensitivity * (velocity as f32 - 64.0)).exp();
        }

        voice.env.keep_alive();
        voice.note = VoiceNote::Key(note);
        voice.update_panning();
    }

    /// Period in samples for `note` played on voice `index`.
    pub fn calc_period(&self, index: usize, note: u8) -> f32 {
        let mut period =
            self.params.tune * (-SEMITONE * (note as f32 + ANALOG * index as f32)).exp();

        let mut shifts = 0;
        while (period < MIN_PERIOD || period * self.params.detune < MIN_PERIOD)
            && shifts < MAX_OCTAVE_SHIFTS
        {
            period += period;
            shifts += 1;
        }

        period
    }

    /// Quietest voice that is not in its attack; lowest index on ties.
    pub fn find_free_voice(&self) -> usize {
        let mut index = 0;
        let mut quietest = 100.0;

        for (i, voice) in self.voices.iter().enumerate() {
            if voice.env.level() < quietest && !voice.env.is_in_attack() {
                quietest = voice.env.level();
                index = i;
            }
        }

        index
    }

    /// Is any key still down, sounding or queued?
    fn is_playing_legato_style(&self) -> bool {
        !self.held_notes.is_empty() || self.voices.iter().any(|v| v.note.is_key_down())
    }

    // --- Parameters and inspection -----------------------------------------

    pub fn params(&self) -> &SynthParams {
        &self.params
    }

    /// Parameters are read at block and note boundaries, so edits take effect
    /// on the next `render()` or note-on.
    pub fn params_mut(&mut self) -> &mut SynthParams {
        &mut self.params
    }

    pub fn set_params(&mut self, params: SynthParams) {
        self.params = params;
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn active_voice_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    pub fn controllers(&self) -> &Controllers {
        &self.controllers
    }

    pub fn held_notes(&self) -> &HeldNotes {
        &self.held_notes
    }

    pub fn last_note(&self) -> Option<u8> {
        self.last_note
    }

    /// What the output guard had to do in the last `render()`.
    pub fn last_buffer_health(&self) -> BufferHealth {
        self.last_health
    }

    /// Shared tally of guard interventions. Clone it before handing the
    /// engine to the audio thread and drain it from somewhere that may log.
    pub fn guard_meter(&self) -> Arc<GuardMeter> {
        Arc::clone(&self.guard_meter)
    }
}

impl Default for Synth {
    fn default() -> Self {
        Self::new(SynthParams::default())
    }
}

#[inline]
fn update_period(voice: &mut Voice, pitch_bend: f32, detune: f32) {
    voice.osc1.period = voice.period * pitch_bend;
    voice.osc2.period = voice.osc1.period * detune;
}
