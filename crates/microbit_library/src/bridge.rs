//! Turns decoded telemetry into MIDI and motor output.

use crate::channels::Channel;
use crate::edges::{self, Action};
use crate::history::History;
use crate::mapping::{LIGHT_THRESHOLD, Tempo, light_to_cutoff};
use crate::midi::{MidiOut, MidiSink};
use crate::motor::{MotorCommand, MotorLink};
use crate::scheduler::{NOTE_HOLD, NoteScheduler};
use crate::telemetry::{Buttons, ParseError, Telemetry, parse_line};
use std::io::Write;
use std::time::Instant;
use tracing::{debug, info};

/// Everything the bridge remembers between lines
#[derive(Debug, Clone, Default)]
pub struct BridgeState {
    pub channel: Channel,
    /// Most recent light reading
    pub light: u8,
    /// Light value last forwarded to the filter
    pub last_light: u8,
    pub filter_active: bool,
    pub tempo: Tempo,
    pub motor_enabled: bool,
    pub history: History,
    /// Button states from the previous line, for edge detection
    pub buttons: Buttons,
}

pub struct Bridge<M: MidiSink, W: Write> {
    state: BridgeState,
    midi: MidiOut<M>,
    motor: MotorLink<W>,
    notes: NoteScheduler,
}

impl<M: MidiSink, W: Write> Bridge<M, W> {
    pub fn new(midi: Option<M>, serial: Option<W>) -> Self {
        Self {
            state: BridgeState::default(),
            midi: MidiOut::new(midi),
            motor: MotorLink::new(serial),
            notes: NoteScheduler::new(),
        }
    }

    pub fn state(&self) -> &BridgeState {
        &self.state
    }

    pub fn midi(&self) -> &MidiOut<M> {
        &self.midi
    }

    #[cfg(test)]
    pub fn motor(&self) -> &MotorLink<W> {
        &self.motor
    }

    /// Announces the initial tempo
    pub fn start(&mut self) {
        self.push_tempo();
    }

    /// Parses and applies one line. On error nothing has changed.
    pub fn handle_line(&mut self, line: &str, now: Instant) -> Result<(), ParseError> {
        if let Some(telemetry) = parse_line(line)? {
            self.apply(telemetry, now);
        }
        Ok(())
    }

    pub fn apply(&mut self, telemetry: Telemetry, now: Instant) {
        match telemetry {
            Telemetry::Primary {
                light,
                buttons,
                reported,
            } => {
                self.state.light = light;
                for action in edges::actions(&self.state.buttons, &buttons) {
                    self.perform(action, now);
                }
                if light != self.state.last_light {
                    self.forward_light(light);
                    self.state.last_light = light;
                }
                self.state.buttons = buttons.keep_unreported(&self.state.buttons, reported);
            }
            Telemetry::Legacy { a, b } => {
                let current = Buttons {
                    a,
                    b,
                    ..self.state.buttons
                };
                if let Some(action) = edges::ab_action(&self.state.buttons, &current) {
                    self.perform(action, now);
                }
                self.state.buttons = current;
            }
        }
    }

    /// Keyboard input; only `m` does anything
    pub fn handle_key(&mut self, key: char) -> bool {
        if !key.eq_ignore_ascii_case(&'m') {
            return false;
        }
        self.state.motor_enabled = !self.state.motor_enabled;
        if self.state.motor_enabled {
            info!("Motor tempo feedback activated");
        } else {
            info!("Motor tempo feedback deactivated");
        }
        self.update_motor();
        true
    }

    /// Sends Note Offs whose hold time has elapsed
    pub fn flush_due(&mut self, now: Instant) {
        for channel in self.notes.take_due(now) {
            self.midi.note_off(channel);
        }
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.notes.next_due()
    }

    /// Sends every pending Note Off right away
    pub fn release_all(&mut self) {
        for channel in self.notes.take_all() {
            self.midi.note_off(channel);
        }
    }

    fn perform(&mut self, action: Action, now: Instant) {
        match action {
            Action::SelectAndPlay(channel) => {
                self.select(channel);
                self.play(channel, now);
            }
            Action::PlayCurrent => self.play(self.state.channel, now),
            Action::ToggleFilter => {
                self.state.filter_active = !self.state.filter_active;
                if self.state.filter_active {
                    info!("Filter control activated");
                } else {
                    info!("Filter control deactivated");
                }
            }
            Action::TempoUp => {
                self.state.tempo.increase();
                info!("Tempo increased to {} BPM", self.state.tempo.bpm());
                self.push_tempo();
            }
            Action::TempoDown => {
                self.state.tempo.decrease();
                info!("Tempo decreased to {} BPM", self.state.tempo.bpm());
                self.push_tempo();
            }
        }
    }

    fn select(&mut self, channel: Channel) {
        self.state.channel = channel;
        info!("Switched to channel {} - {}", channel.index(), channel.name());
    }

    /// Without MIDI nothing is played and the motor stays quiet
    fn play(&mut self, channel: Channel, now: Instant) {
        if !self.midi.is_open() {
            return;
        }
        // keep on/off strictly paired when a note is retriggered inside its hold
        if self.notes.take(channel) {
            self.midi.note_off(channel);
        }
        if self.midi.note_on(channel) {
            self.notes.schedule(channel, now + NOTE_HOLD);
            info!("Note On on channel {} ({})", channel.index(), channel.name());
        }
        self.motor.send(MotorCommand::pulse());
    }

    fn push_tempo(&mut self) {
        if !self.midi.is_open() {
            return;
        }
        let value = self.state.tempo.cc_value();
        if self.midi.tempo(value) {
            debug!("Tempo {} BPM (MIDI value {value})", self.state.tempo.bpm());
        }
        if self.state.motor_enabled {
            self.update_motor();
        }
    }

    fn update_motor(&mut self) {
        let command = MotorCommand::continuous(self.state.tempo, self.state.motor_enabled);
        self.motor.send(command);
    }

    fn forward_light(&mut self, light: u8) {
        if !self.state.filter_active {
            return;
        }
        self.state.history.push(light);
        let cutoff = light_to_cutoff(light);
        if self.midi.filter_cutoff(cutoff) {
            debug!("Light {light}, filter {cutoff} (threshold {LIGHT_THRESHOLD})");
        }
    }
}
