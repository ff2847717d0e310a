use crate::channels::Channel;
use crate::telemetry::Buttons;

/// What a rising edge asks the bridge to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SelectAndPlay(Channel),
    PlayCurrent,
    ToggleFilter,
    TempoUp,
    TempoDown,
}

fn rising(previous: bool, current: bool) -> bool {
    current && !previous
}

/// A/B handling shared by both line formats.
///
/// Holding both toggles the filter once when the pair becomes held and
/// suppresses the single button actions for that line.
pub fn ab_action(previous: &Buttons, current: &Buttons) -> Option<Action> {
    if current.a && current.b {
        (!previous.a || !previous.b).then_some(Action::ToggleFilter)
    } else if rising(previous.a, current.a) {
        Some(Action::PlayCurrent)
    } else if rising(previous.b, current.b) {
        Some(Action::SelectAndPlay(Channel::Bass))
    } else {
        None
    }
}

/// Every action triggered by going from `previous` to `current`, in dispatch order
pub fn actions(previous: &Buttons, current: &Buttons) -> Vec<Action> {
    let mut out = Vec::new();

    if rising(previous.fire1, current.fire1) {
        out.push(Action::TempoUp);
    }
    if rising(previous.fire2, current.fire2) {
        out.push(Action::TempoDown);
    }

    let pad = [
        (previous.up, current.up, Channel::Kick),
        (previous.right, current.right, Channel::Clap),
        (previous.down, current.down, Channel::HiHat),
        (previous.left, current.left, Channel::Snare),
    ];
    for (was, is, channel) in pad {
        if rising(was, is) {
            out.push(Action::SelectAndPlay(channel));
        }
    }

    out.extend(ab_action(previous, current));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: Buttons = Buttons {
        a: false,
        b: false,
        up: false,
        down: false,
        left: false,
        right: false,
        fire1: false,
        fire2: false,
    };

    #[test]
    fn fires_on_rising_edge_only() {
        let held = Buttons { a: true, ..NONE };
        assert_eq!(vec![Action::PlayCurrent], actions(&NONE, &held));
        assert!(actions(&held, &held).is_empty(), "sustained press");
        assert!(actions(&held, &NONE).is_empty(), "release");
    }

    #[test]
    fn both_held_toggles_and_suppresses_single_buttons() {
        let both = Buttons { a: true, b: true, ..NONE };
        assert_eq!(vec![Action::ToggleFilter], actions(&NONE, &both));
        assert!(actions(&both, &both).is_empty());

        let only_a = Buttons { a: true, ..NONE };
        assert_eq!(vec![Action::ToggleFilter], actions(&only_a, &both));
    }

    #[test]
    fn b_selects_bass() {
        let b = Buttons { b: true, ..NONE };
        assert_eq!(vec![Action::SelectAndPlay(Channel::Bass)], actions(&NONE, &b));
    }

    #[test]
    fn pad_and_fire_order() {
        let all = Buttons {
            up: true,
            down: true,
            left: true,
            right: true,
            fire1: true,
            fire2: true,
            ..NONE
        };
        assert_eq!(
            vec![
                Action::TempoUp,
                Action::TempoDown,
                Action::SelectAndPlay(Channel::Kick),
                Action::SelectAndPlay(Channel::Clap),
                Action::SelectAndPlay(Channel::HiHat),
                Action::SelectAndPlay(Channel::Snare),
            ],
            actions(&NONE, &all)
        );
    }

    #[test]
    fn pad_edge_and_ab_toggle_fire_together() {
        let current = Buttons {
            a: true,
            b: true,
            up: true,
            ..NONE
        };
        assert_eq!(
            vec![Action::SelectAndPlay(Channel::Kick), Action::ToggleFilter],
            actions(&NONE, &current)
        );
    }
}
