//! MIDI message encoding and the output the bridge talks to.

use crate::channels::Channel;
use midly::MidiMessage;
use midly::live::LiveEvent;
use midly::num::{u4, u7};
use std::fmt;
use tracing::{debug, warn};

pub const NOTE_PITCH: u8 = 60;
pub const NOTE_VELOCITY: u8 = 100;
/// Controller carrying the filter cutoff
pub const FILTER_CC: u8 = 16;
/// Controller carrying the tempo
pub const TEMPO_CC: u8 = 17;
/// Controllers are always sent on the first MIDI channel
pub const CONTROL_CHANNEL: u8 = 0;

/// Anything that accepts raw MIDI bytes, usually a port connection
pub trait MidiSink {
    fn send(&mut self, message: &[u8]) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    Channel(u8),
    Data(u8),
    Write,
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::Channel(c) => write!(f, "MIDI channel {c} out of range 0-15"),
            EncodeError::Data(d) => write!(f, "MIDI data byte {d} out of range 0-127"),
            EncodeError::Write => write!(f, "MIDI event could not be serialized"),
        }
    }
}

impl std::error::Error for EncodeError {}

fn data(value: u8) -> Result<u7, EncodeError> {
    u7::try_from(value).ok_or(EncodeError::Data(value))
}

fn encode(channel: u8, message: MidiMessage) -> Result<Vec<u8>, EncodeError> {
    let channel = u4::try_from(channel).ok_or(EncodeError::Channel(channel))?;
    let mut buf = Vec::with_capacity(3);
    LiveEvent::Midi { channel, message }
        .write_std(&mut buf)
        .map_err(|_| EncodeError::Write)?;
    Ok(buf)
}

pub fn note_on(channel: u8, key: u8, vel: u8) -> Result<Vec<u8>, EncodeError> {
    encode(
        channel,
        MidiMessage::NoteOn {
            key: data(key)?,
            vel: data(vel)?,
        },
    )
}

/// Note Off with release velocity 0
pub fn note_off(channel: u8, key: u8) -> Result<Vec<u8>, EncodeError> {
    encode(
        channel,
        MidiMessage::NoteOff {
            key: data(key)?,
            vel: data(0)?,
        },
    )
}

pub fn control_change(channel: u8, controller: u8, value: u8) -> Result<Vec<u8>, EncodeError> {
    encode(
        channel,
        MidiMessage::Controller {
            controller: data(controller)?,
            value: data(value)?,
        },
    )
}

/// Optional MIDI connection. Every send is a no-op while closed and never reports failure.
pub struct MidiOut<M: MidiSink> {
    sink: Option<M>,
}

impl<M: MidiSink> MidiOut<M> {
    pub fn new(sink: Option<M>) -> Self {
        Self { sink }
    }

    pub fn is_open(&self) -> bool {
        self.sink.is_some()
    }

    #[cfg(test)]
    pub fn sink(&self) -> Option<&M> {
        self.sink.as_ref()
    }

    fn send(&mut self, what: &str, message: Result<Vec<u8>, EncodeError>) -> bool {
        let Some(sink) = self.sink.as_mut() else {
            return false;
        };
        let bytes = match message {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Can't build {what}: {e}");
                return false;
            }
        };
        match sink.send(&bytes) {
            Ok(()) => {
                debug!("MIDI -> {what} {bytes:02X?}");
                true
            }
            Err(e) => {
                warn!("Failed to send {what}: {e}");
                false
            }
        }
    }

    pub fn note_on(&mut self, channel: Channel) -> bool {
        self.send(
            "Note On",
            note_on(channel.midi_channel(), NOTE_PITCH, NOTE_VELOCITY),
        )
    }

    pub fn note_off(&mut self, channel: Channel) -> bool {
        self.send("Note Off", note_off(channel.midi_channel(), NOTE_PITCH))
    }

    pub fn filter_cutoff(&mut self, value: u8) -> bool {
        self.send(
            "filter CC",
            control_change(CONTROL_CHANNEL, FILTER_CC, value),
        )
    }

    pub fn tempo(&mut self, value: u8) -> bool {
        self.send("tempo CC", control_change(CONTROL_CHANNEL, TEMPO_CC, value))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Keeps every message it was given
    #[derive(Debug, Default)]
    pub(crate) struct RecordingSink {
        pub sent: Vec<Vec<u8>>,
    }

    impl MidiSink for RecordingSink {
        fn send(&mut self, message: &[u8]) -> anyhow::Result<()> {
            self.sent.push(message.to_vec());
            Ok(())
        }
    }

    struct BrokenSink;

    impl MidiSink for BrokenSink {
        fn send(&mut self, _message: &[u8]) -> anyhow::Result<()> {
            anyhow::bail!("port went away")
        }
    }

    #[test]
    fn encodes_channel_messages() {
        assert_eq!(Ok(vec![0x93, 60, 100]), note_on(3, 60, 100));
        assert_eq!(Ok(vec![0x84, 60, 0]), note_off(4, 60));
        assert_eq!(Ok(vec![0xB0, 17, 44]), control_change(0, 17, 44));
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert_eq!(Err(EncodeError::Channel(16)), note_on(16, 60, 100));
        assert_eq!(Err(EncodeError::Data(200)), control_change(0, 16, 200));
    }

    #[test]
    fn controllers_use_channel_zero() {
        let mut out = MidiOut::new(Some(RecordingSink::default()));
        assert!(out.filter_cutoff(127));
        assert!(out.tempo(44));
        let sent = &out.sink().unwrap().sent;
        assert_eq!(vec![vec![0xB0, 16, 127], vec![0xB0, 17, 44]], *sent);
    }

    #[test]
    fn closed_output_is_a_no_op() {
        let mut out: MidiOut<RecordingSink> = MidiOut::new(None);
        assert!(!out.is_open());
        assert!(!out.note_on(Channel::Kick));
    }

    #[test]
    fn send_failures_are_swallowed() {
        let mut out = MidiOut::new(Some(BrokenSink));
        assert!(!out.note_on(Channel::Snare));
    }
}
