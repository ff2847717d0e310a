//! Decoding of the status lines sent by the micro:bit.
//!
//! Current firmware sends
//! `L:<light>,A:<True|False>,B:<True|False>,U:<0|1>,D:<0|1>,L:<0|1>,R:<0|1>,F1:<0|1>,F2:<0|1>`.
//! Older firmware sent bare comma separated values where fields 3 and 4 hold the
//! A and B buttons. Fields are positional; prefixes are skipped, not checked.

use std::fmt;

const LIGHT_PREFIX: &str = "L:";
const LIGHT_MAX: i64 = 127;
const LEGACY_MIN_FIELDS: usize = 5;

/// Pressed state of every button the bridge reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Buttons {
    pub a: bool,
    pub b: bool,
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub fire1: bool,
    pub fire2: bool,
}

impl Buttons {
    /// Takes the D-pad and fire states from `previous` for groups the line left out
    pub fn keep_unreported(self, previous: &Buttons, reported: Reported) -> Buttons {
        let mut merged = self;
        if !reported.pad {
            merged.up = previous.up;
            merged.down = previous.down;
            merged.left = previous.left;
            merged.right = previous.right;
        }
        if !reported.fire1 {
            merged.fire1 = previous.fire1;
        }
        if !reported.fire2 {
            merged.fire2 = previous.fire2;
        }
        merged
    }
}

/// Optional button groups a primary line actually carried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Reported {
    pub pad: bool,
    pub fire1: bool,
    pub fire2: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineFormat {
    Primary,
    Legacy,
    Unrecognized,
}

impl LineFormat {
    pub fn detect(line: &str) -> Self {
        if line.starts_with(LIGHT_PREFIX) {
            LineFormat::Primary
        } else if line.contains(',') {
            LineFormat::Legacy
        } else {
            LineFormat::Unrecognized
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Telemetry {
    /// Light level plus all eight buttons; missing ones read as released
    Primary {
        light: u8,
        buttons: Buttons,
        reported: Reported,
    },
    /// Only the A and B buttons
    Legacy { a: bool, b: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Light level is not an integer
    InvalidLight(String),
    /// Field is shorter than the prefix it should carry
    TruncatedField { index: usize, field: String },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InvalidLight(raw) => write!(f, "invalid light value {raw:?}"),
            ParseError::TruncatedField { index, field } => {
                write!(f, "field {index} is too short: {field:?}")
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Parses one line. `Ok(None)` means the line has no recognizable shape and is ignored.
pub fn parse_line(line: &str) -> Result<Option<Telemetry>, ParseError> {
    match LineFormat::detect(line) {
        LineFormat::Primary => parse_primary(&split_fields(line)).map(Some),
        LineFormat::Legacy => Ok(parse_legacy(&split_fields(line))),
        LineFormat::Unrecognized => Ok(None),
    }
}

/// Comma split that drops trailing empty fields
fn split_fields(line: &str) -> Vec<&str> {
    let mut fields: Vec<&str> = line.split(',').collect();
    while fields.last().is_some_and(|f| f.is_empty()) {
        fields.pop();
    }
    fields
}

fn field_value<'a>(fields: &[&'a str], index: usize, prefix_len: usize) -> Result<&'a str, ParseError> {
    let field = fields[index];
    // prefixes are counted in characters
    field
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(field.len()))
        .nth(prefix_len)
        .map(|start| field[start..].trim())
        .ok_or_else(|| ParseError::TruncatedField {
            index,
            field: field.to_string(),
        })
}

fn flag(fields: &[&str], index: usize, prefix_len: usize, pressed: &str) -> Result<bool, ParseError> {
    if index < fields.len() {
        Ok(field_value(fields, index, prefix_len)? == pressed)
    } else {
        Ok(false)
    }
}

fn parse_primary(fields: &[&str]) -> Result<Telemetry, ParseError> {
    let raw = field_value(fields, 0, LIGHT_PREFIX.len())?;
    let light = raw
        .parse::<i64>()
        .map_err(|_| ParseError::InvalidLight(raw.to_string()))?
        .clamp(0, LIGHT_MAX) as u8;

    let mut buttons = Buttons::default();
    let mut reported = Reported::default();

    if fields.len() >= 3 {
        buttons.a = flag(fields, 1, 2, "True")?;
        buttons.b = flag(fields, 2, 2, "True")?;
    }

    if fields.len() >= 7 {
        buttons.up = flag(fields, 3, 2, "1")?;
        buttons.down = flag(fields, 4, 2, "1")?;
        buttons.left = flag(fields, 5, 2, "1")?;
        buttons.right = flag(fields, 6, 2, "1")?;
        // F1/F2 carry a three character prefix
        buttons.fire1 = flag(fields, 7, 3, "1")?;
        buttons.fire2 = flag(fields, 8, 3, "1")?;
        reported = Reported {
            pad: true,
            fire1: fields.len() >= 8,
            fire2: fields.len() >= 9,
        };
    }

    Ok(Telemetry::Primary {
        light,
        buttons,
        reported,
    })
}

fn parse_legacy(fields: &[&str]) -> Option<Telemetry> {
    if fields.len() < LEGACY_MIN_FIELDS {
        return None;
    }
    Some(Telemetry::Legacy {
        a: fields[3].trim() == "True",
        b: fields[4].trim() == "True",
    })
}
