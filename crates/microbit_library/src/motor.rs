//! Vibration motor commands written back to the micro:bit.

use crate::mapping::Tempo;
use std::fmt;
use std::io::Write;
use tracing::{debug, warn};

/// Strength of the tempo-synced vibration (0-1023)
pub const MOTOR_INTENSITY: u16 = 600;
/// Strength of the per-note pulse (0-1023)
pub const PULSE_INTENSITY: u16 = 800;
pub const PULSE_DURATION_MS: u32 = 100;
const STOPPED_INTERVAL_MS: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorCommand {
    /// `M:<intensity>,<interval>`: keep pulsing every `interval_ms`
    Continuous { intensity: u16, interval_ms: u32 },
    /// `P:<intensity>,<duration>`: single buzz
    Pulse { intensity: u16, duration_ms: u32 },
}

impl MotorCommand {
    /// Continuous command for the current tempo, or the stop command when disabled
    pub fn continuous(tempo: Tempo, enabled: bool) -> Self {
        if enabled {
            MotorCommand::Continuous {
                intensity: MOTOR_INTENSITY,
                interval_ms: tempo.beat_interval_ms(),
            }
        } else {
            MotorCommand::Continuous {
                intensity: 0,
                interval_ms: STOPPED_INTERVAL_MS,
            }
        }
    }

    pub fn pulse() -> Self {
        MotorCommand::Pulse {
            intensity: PULSE_INTENSITY,
            duration_ms: PULSE_DURATION_MS,
        }
    }
}

impl fmt::Display for MotorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotorCommand::Continuous {
                intensity,
                interval_ms,
            } => write!(f, "M:{intensity},{interval_ms}"),
            MotorCommand::Pulse {
                intensity,
                duration_ms,
            } => write!(f, "P:{intensity},{duration_ms}"),
        }
    }
}

/// Outbound serial link; without a writer every command is dropped silently
pub struct MotorLink<W: Write> {
    writer: Option<W>,
}

impl<W: Write> MotorLink<W> {
    pub fn new(writer: Option<W>) -> Self {
        Self { writer }
    }

    #[cfg(test)]
    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    #[cfg(test)]
    pub fn writer(&self) -> Option<&W> {
        self.writer.as_ref()
    }

    pub fn send(&mut self, command: MotorCommand) {
        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        let line = format!("{command}\n");
        match writer.write_all(line.as_bytes()).and_then(|_| writer.flush()) {
            Ok(()) => debug!("Serial -> {command}"),
            Err(e) => warn!("Failed to write motor command {command}: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_format() {
        let enabled = MotorCommand::continuous(Tempo::default(), true);
        assert_eq!("M:600,462", enabled.to_string());

        let disabled = MotorCommand::continuous(Tempo::default(), false);
        assert_eq!("M:0,1000", disabled.to_string());

        assert_eq!("P:800,100", MotorCommand::pulse().to_string());
    }

    #[test]
    fn link_writes_terminated_lines() {
        let mut link = MotorLink::new(Some(Vec::new()));
        link.send(MotorCommand::pulse());
        link.send(MotorCommand::continuous(Tempo::new(300), true));
        assert_eq!(
            Some(&b"P:800,100\nM:600,200\n".to_vec()),
            link.writer()
        );
    }

    #[test]
    fn closed_link_is_silent() {
        let mut link: MotorLink<Vec<u8>> = MotorLink::new(None);
        link.send(MotorCommand::pulse());
        assert!(!link.is_open());
    }
}
