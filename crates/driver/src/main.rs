mod midi_port;
mod serial;
mod settings;

use crate::midi_port::MidiPort;
use crate::settings::Settings;
use anyhow::{Context, Result, anyhow};
use clap::Parser;
use config::Config;
use crossterm::event::{self as term, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use microbit_library::bridge::Bridge;
use microbit_library::framer::LineFramer;
use microbit_library::screen::{self, Screen};
use microbit_library::visualizer;
use serialport::SerialPort;
use std::io::{self, IsTerminal, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Longest wait when neither a frame nor a Note Off is due
const IDLE_WAIT: Duration = Duration::from_secs(1);

pub(crate) enum Event {
    Serial(Vec<u8>),
    SerialClosed,
    Key(char),
    Quit,
}

/// Keeps the terminal in raw mode so single key presses arrive unbuffered and unechoed
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        terminal::disable_raw_mode().ok();
    }
}

/// stderr with `\r\n` line endings, so log lines stay readable in raw mode
struct LogWriter;

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut err = io::stderr().lock();
        for chunk in buf.split_inclusive(|&b| b == b'\n') {
            match chunk.strip_suffix(b"\n") {
                Some(line) => {
                    err.write_all(line)?;
                    err.write_all(b"\r\n")?;
                }
                None => err.write_all(chunk)?,
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "micro:bit to MIDI bridge",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
)]
struct Args {
    #[clap(short, long, help = "Config file (see example_config.toml)")]
    config: Option<String>,

    #[clap(short, long, help = "Serial port of the micro:bit (overrides config)")]
    serial_port: Option<String>,

    #[clap(long, help = "Log only, don't draw the status screen")]
    no_display: bool,

    #[clap(short, long, help = "List serial and MIDI ports, then exit")]
    list: bool,
}

type SerialBridge = Bridge<MidiPort, Box<dyn SerialPort>>;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(|| LogWriter)
        .init();

    let args = Args::parse();

    let mut cfg = Config::builder();
    if let Some(config_fn) = &args.config {
        cfg = cfg.add_source(config::File::with_name(config_fn.as_str()));
    }
    let cfg = cfg.build().context("Can't create settings")?;
    let mut settings: Settings = cfg.try_deserialize().context("Can't parse settings")?;
    if let Some(port) = args.serial_port {
        settings.serial_port = port;
    }
    settings.validate().map_err(|e| anyhow!(e))?;

    list_devices(&settings);
    if args.list {
        return Ok(());
    }

    info!("Running with settings: {settings:?}");

    let (tx, rx) = mpsc::channel();

    let serial_out = match serial::open(&settings.serial_port, settings.baud_rate) {
        Ok(port) => match port.try_clone() {
            Ok(reader) => {
                serial::spawn_reader(reader, tx.clone());
                Some(port)
            }
            Err(e) => {
                warn!("Can't clone serial port, running without micro:bit: {e}");
                None
            }
        },
        Err(e) => {
            warn!("Running without micro:bit: {e:#}");
            None
        }
    };

    let midi = match midi_port::open(&settings) {
        Ok(port) => Some(port),
        Err(e) => {
            warn!("Running without MIDI output: {e:#}");
            None
        }
    };

    let raw_mode = if io::stdin().is_terminal() {
        RawMode::enable()
            .map_err(|e| warn!("Keyboard disabled, can't enter raw mode: {e}"))
            .ok()
    } else {
        None
    };
    if raw_mode.is_some() {
        spawn_keyboard(tx);
    } else {
        drop(tx);
    }

    let mut bridge: SerialBridge = Bridge::new(midi, serial_out);
    bridge.start();

    let display = if args.no_display {
        None
    } else {
        Some(Duration::from_secs_f64(1.0 / settings.refresh_hz as f64))
    };
    main_loop(&mut bridge, rx, display)?;

    bridge.release_all();
    drop(raw_mode);
    info!("Exiting");
    Ok(())
}

fn list_devices(settings: &Settings) {
    info!("Available serial ports: {:?}", serial::list_ports());
    match midi_port::list_ports(&settings.client_name) {
        Ok(ports) => info!("Available MIDI outputs: {ports:?}"),
        Err(e) => warn!("Can't enumerate MIDI outputs: {e}"),
    }
}

/// Forwards single key presses; Ctrl-C asks the loop to stop
fn spawn_keyboard(tx: Sender<Event>) {
    thread::spawn(move || {
        loop {
            let key = match term::read() {
                Ok(term::Event::Key(key)) if key.kind == KeyEventKind::Press => key,
                Ok(_) => continue,
                Err(e) => {
                    warn!("Keyboard input stopped: {e}");
                    return;
                }
            };
            let event = match key.code {
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Event::Quit,
                KeyCode::Char(ch) => Event::Key(ch),
                _ => continue,
            };
            if tx.send(event).is_err() {
                return;
            }
        }
    });
}

fn main_loop(
    bridge: &mut SerialBridge,
    rx: Receiver<Event>,
    frame_period: Option<Duration>,
) -> Result<()> {
    let mut framer = LineFramer::new();
    let mut screen = Screen::new();
    let mut stdout = io::stdout();
    let mut next_frame = Instant::now();

    if frame_period.is_some() {
        screen::clear(&mut stdout)?;
    }

    loop {
        let now = Instant::now();
        let mut deadline = now + IDLE_WAIT;
        if frame_period.is_some() {
            deadline = deadline.min(next_frame);
        }
        if let Some(due) = bridge.next_due() {
            deadline = deadline.min(due);
        }

        match rx.recv_timeout(deadline.saturating_duration_since(now)) {
            Ok(Event::Serial(bytes)) => {
                for line in framer.push(&bytes) {
                    if let Err(e) = bridge.handle_line(&line, Instant::now()) {
                        warn!("Error processing line {line:?}: {e}");
                    }
                }
            }
            Ok(Event::SerialClosed) => warn!("micro:bit disconnected"),
            Ok(Event::Key(key)) => {
                bridge.handle_key(key);
            }
            Ok(Event::Quit) => return Ok(()),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => return Ok(()),
        }

        let now = Instant::now();
        bridge.flush_due(now);

        if let Some(period) = frame_period {
            if now >= next_frame {
                visualizer::draw(&mut screen, bridge.state(), bridge.midi().is_open());
                if let Err(e) = screen.write(&mut stdout.lock()) {
                    warn!("Can't draw status screen: {e}");
                }
                next_frame += period;
                if next_frame < now {
                    next_frame = now + period;
                }
            }
        }
    }
}
