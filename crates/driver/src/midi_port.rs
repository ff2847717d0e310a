//! MIDI output device selection.

use crate::settings::Settings;
use anyhow::{Result, anyhow, bail};
use microbit_library::midi::MidiSink;
use midir::{MidiOutput, MidiOutputConnection};
use tracing::info;

pub(crate) struct MidiPort {
    conn: MidiOutputConnection,
}

impl MidiSink for MidiPort {
    fn send(&mut self, message: &[u8]) -> Result<()> {
        self.conn.send(message).map_err(|e| anyhow!("{e}"))
    }
}

pub(crate) fn list_ports(client_name: &str) -> Result<Vec<String>> {
    let output = MidiOutput::new(client_name)?;
    Ok(output
        .ports()
        .iter()
        .filter_map(|p| output.port_name(p).ok())
        .collect())
}

/// Index of the first name containing one of `patterns` (earlier patterns win),
/// else the first name
fn choose_port(names: &[String], patterns: &[String]) -> Option<usize> {
    patterns
        .iter()
        .find_map(|pattern| names.iter().position(|n| n.contains(pattern.as_str())))
        .or(if names.is_empty() { None } else { Some(0) })
}

pub(crate) fn open(settings: &Settings) -> Result<MidiPort> {
    let output = MidiOutput::new(&settings.client_name)?;

    if settings.virtual_port {
        return open_virtual(output, settings);
    }

    let ports = output.ports();
    let names: Vec<String> = ports
        .iter()
        .map(|p| output.port_name(p).unwrap_or_default())
        .collect();

    let Some(idx) = choose_port(&names, &settings.port_match) else {
        bail!("no MIDI output ports found");
    };
    let name = names[idx].clone();
    let conn = output
        .connect(&ports[idx], &settings.client_name)
        .map_err(|e| anyhow!("connect {name}: {e}"))?;

    info!("Connected to MIDI output {name}");
    Ok(MidiPort { conn })
}

#[cfg(unix)]
fn open_virtual(output: MidiOutput, settings: &Settings) -> Result<MidiPort> {
    use midir::os::unix::VirtualOutput;

    let conn = output
        .create_virtual(&settings.port_name)
        .map_err(|e| anyhow!("create virtual port {}: {e}", settings.port_name))?;
    info!("Created virtual MIDI output {}", settings.port_name);
    Ok(MidiPort { conn })
}

#[cfg(not(unix))]
fn open_virtual(_output: MidiOutput, _settings: &Settings) -> Result<MidiPort> {
    bail!("virtual MIDI ports are not supported on this platform")
}
