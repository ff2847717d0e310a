//! Status screen drawn from the bridge state.
//!
//! Drawing only reads state. The filter curve and history plot appear while the
//! filter is active.

use crate::bridge::BridgeState;
use crate::channels::Channel;
use crate::history::HISTORY_LEN;
use crate::mapping::{LIGHT_THRESHOLD, map_range};
use crate::screen::{Color, Screen, WIDTH};

const LIGHT_ROW: usize = 1;
const BAR_ROW: usize = 3;
const BAR_COL: usize = 30;
const BAR_WIDTH: usize = 40;
const STATUS_ROW: usize = 5;
const CHANNEL_ROW: usize = 6;
const TEMPO_ROW: usize = 7;
const CURVE_TOP: usize = 9;
const CURVE_ROWS: usize = 6;
const HISTORY_TOP: usize = 15;
const HISTORY_ROWS: usize = 6;
const HELP_TOP: usize = 21;

const HELP: [&str; 3] = [
    "A: play current  B: FLEX Bass  A+B: filter on/off  Pad: Kick/Clap/HiHat/Snare",
    "FIRE1/FIRE2: tempo +/- 10 BPM  Light: covered = max filter, above 30 = none",
    "M: toggle motor tempo feedback   Ctrl-C: quit",
];

/// Scale `value` in `0..=max` onto `0..=cells` cells
fn scaled(value: u8, max: u8, cells: usize) -> usize {
    (value as f64 * cells as f64 / max as f64).round() as usize
}

pub fn draw(screen: &mut Screen, state: &BridgeState, midi_open: bool) {
    screen.reset();

    screen.write_centered(LIGHT_ROW, &format!("Light: {}", state.light), Color::Yellow);
    draw_light_bar(screen, state.light);
    draw_status(screen, state.filter_active, midi_open);

    let channel: Channel = state.channel;
    screen.write_centered(
        CHANNEL_ROW,
        &format!("Channel: {} - {}", channel.index(), channel.name()),
        Color::Cyan,
    );
    let motor = if state.motor_enabled { "on" } else { "off" };
    screen.write_centered(
        TEMPO_ROW,
        &format!("Tempo: {} BPM   Motor: {motor}", state.tempo.bpm()),
        Color::White,
    );

    if state.filter_active {
        draw_filter_curve(screen, state.last_light);
        draw_history(screen, state);
    }

    for (i, line) in HELP.iter().enumerate() {
        screen.write_centered(HELP_TOP + i, line, Color::Grey);
    }
}

fn draw_light_bar(screen: &mut Screen, light: u8) {
    let filled = scaled(light, 127, BAR_WIDTH);
    for i in 0..BAR_WIDTH {
        let (ch, color) = if i < filled {
            ('█', Color::Orange)
        } else {
            ('░', Color::Grey)
        };
        screen.set(BAR_ROW, BAR_COL + i, ch, color);
    }
    let marker = BAR_COL + scaled(LIGHT_THRESHOLD, 127, BAR_WIDTH);
    screen.set(BAR_ROW, marker, '|', Color::Red);
}

fn draw_status(screen: &mut Screen, filter_active: bool, midi_open: bool) {
    let (label, color) = if midi_open {
        ("● MIDI connected", Color::Green)
    } else {
        ("● MIDI offline", Color::Red)
    };
    screen.write_centered(STATUS_ROW, label, color);
    if filter_active {
        screen.write_str(STATUS_ROW, WIDTH / 2 + 12, "● FILTER ON", Color::Yellow);
    }
}

fn draw_filter_curve(screen: &mut Screen, last_light: u8) {
    let cutoff = if last_light > LIGHT_THRESHOLD {
        0.0
    } else {
        map_range(
            last_light as f64,
            0.0,
            LIGHT_THRESHOLD as f64,
            WIDTH as f64 / 2.0,
            0.0,
        )
    };
    let middle = (CURVE_TOP + CURVE_ROWS / 2) as f64;
    let amplitude = (CURVE_ROWS / 2) as f64 - 0.5;

    for x in 0..WIDTH {
        let xf = x as f64;
        let offset = if xf < cutoff {
            // attenuated band
            amplitude * (xf * 0.1).sin() * (xf / cutoff.max(1.0))
        } else {
            -amplitude * (xf * 0.05).sin()
        };
        let row = (middle + offset)
            .round()
            .clamp(CURVE_TOP as f64, (CURVE_TOP + CURVE_ROWS - 1) as f64) as usize;
        screen.set(row, x, '•', Color::Orange);
    }
}

fn draw_history(screen: &mut Screen, state: &BridgeState) {
    let bottom = HISTORY_TOP + HISTORY_ROWS - 1;
    for (i, value) in state.history.newest_first().enumerate().take(HISTORY_LEN.min(WIDTH)) {
        let col = WIDTH - 1 - i;
        let row = bottom - scaled(value, 127, HISTORY_ROWS - 1);
        screen.set(row, col, '▪', Color::Cyan);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen::HEIGHT;

    fn render(state: &BridgeState, midi_open: bool) -> Screen {
        let mut screen = Screen::new();
        draw(&mut screen, state, midi_open);
        screen
    }

    fn row_has(screen: &Screen, row: usize, ch: char) -> bool {
        (0..WIDTH).any(|col| screen.get(row, col).ch == ch)
    }

    #[test]
    fn shows_light_channel_and_tempo() {
        let state = BridgeState {
            light: 64,
            channel: Channel::Clap,
            ..BridgeState::default()
        };
        let screen = render(&state, true);
        assert!(screen.row_text(LIGHT_ROW).ends_with("Light: 64"));
        assert!(screen.row_text(CHANNEL_ROW).ends_with("Channel: 1 - 808 Clap"));
        assert!(screen.row_text(TEMPO_ROW).ends_with("Tempo: 130 BPM   Motor: off"));
    }

    #[test]
    fn status_color_follows_midi() {
        let state = BridgeState::default();
        let online = render(&state, true);
        let offline = render(&state, false);
        assert!(online.row_text(STATUS_ROW).contains("MIDI connected"));
        assert!(offline.row_text(STATUS_ROW).contains("MIDI offline"));

        let dot = |screen: &Screen| {
            (0..WIDTH)
                .map(|col| screen.get(STATUS_ROW, col))
                .find(|cell| cell.ch == '●')
                .map(|cell| cell.color)
        };
        assert_eq!(Some(Color::Green), dot(&online));
        assert_eq!(Some(Color::Red), dot(&offline));
    }

    #[test]
    fn light_bar_is_proportional_with_threshold_marker() {
        let state = BridgeState {
            light: 127,
            ..BridgeState::default()
        };
        let screen = render(&state, false);
        let filled = (0..WIDTH).filter(|&c| screen.get(BAR_ROW, c).ch == '█').count();
        assert_eq!(BAR_WIDTH - 1, filled, "one cell is covered by the marker");
        assert_eq!('|', screen.get(BAR_ROW, BAR_COL + 9).ch);

        let dark = render(&BridgeState::default(), false);
        assert!(!row_has(&dark, BAR_ROW, '█'));
    }

    #[test]
    fn filter_views_only_while_active() {
        let mut state = BridgeState::default();
        let screen = render(&state, true);
        assert!(!screen.row_text(STATUS_ROW).contains("FILTER ON"));
        for row in CURVE_TOP..HELP_TOP {
            assert_eq!("", screen.row_text(row), "row {row}");
        }

        state.filter_active = true;
        state.history.push(127);
        let screen = render(&state, true);
        assert!(screen.row_text(STATUS_ROW).contains("FILTER ON"));
        assert!((CURVE_TOP..CURVE_TOP + CURVE_ROWS).any(|row| row_has(&screen, row, '•')));
        // newest sample sits in the rightmost column at the top of the plot
        assert_eq!('▪', screen.get(HISTORY_TOP, WIDTH - 1).ch);
        assert_eq!('▪', screen.get(HISTORY_TOP + HISTORY_ROWS - 1, WIDTH - 2).ch);
    }

    #[test]
    fn layout_fits_the_screen() {
        assert!(HELP_TOP + HELP.len() <= HEIGHT);
        assert!(HELP.iter().all(|line| line.chars().count() <= WIDTH));
    }
}
