//! Serial link to the micro:bit.

use crate::Event;
use anyhow::{Context, Result, bail};
use serialport::SerialPort;
use std::io::{ErrorKind, Read};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{info, warn};

const READ_TIMEOUT: Duration = Duration::from_millis(100);

pub(crate) fn list_ports() -> Vec<String> {
    match serialport::available_ports() {
        Ok(ports) => ports.into_iter().map(|p| p.port_name).collect(),
        Err(e) => {
            warn!("Can't enumerate serial ports: {e}");
            Vec::new()
        }
    }
}

/// Opens `path`, or the first available port when `path` is empty
pub(crate) fn open(path: &str, baud_rate: u32) -> Result<Box<dyn SerialPort>> {
    let path = if path.is_empty() {
        match list_ports().into_iter().next() {
            Some(first) => first,
            None => bail!("no serial ports found"),
        }
    } else {
        path.to_string()
    };

    let port = serialport::new(&path, baud_rate)
        .timeout(READ_TIMEOUT)
        .open()
        .with_context(|| format!("Failed to open serial port at {path}"))?;
    info!("Connected to serial port {path} at {baud_rate} baud");
    Ok(port)
}

/// Forwards everything read from `port` to the event loop
pub(crate) fn spawn_reader(mut port: Box<dyn SerialPort>, tx: Sender<Event>) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut buf = [0u8; 256];
        loop {
            match port.read(&mut buf) {
                Ok(0) => continue,
                Ok(n) => {
                    if tx.send(Event::Serial(buf[..n].to_vec())).is_err() {
                        return;
                    }
                }
                Err(e) if e.kind() == ErrorKind::TimedOut => continue,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!("Serial read failed, input stopped: {e}");
                    tx.send(Event::SerialClosed).ok();
                    return;
                }
            }
        }
    })
}
