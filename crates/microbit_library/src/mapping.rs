// Fixed conversions from sensor/tempo space into MIDI values

/// Light level at and above which the filter is fully open
pub const LIGHT_THRESHOLD: u8 = 30;

pub const TEMPO_MIN: u16 = 40;
pub const TEMPO_MAX: u16 = 300;
pub const TEMPO_DEFAULT: u16 = 130;
pub const TEMPO_STEP: u16 = 10;

/// Linear re-mapping of `value` from one range to another, unclamped
pub fn map_range(value: f64, in_lo: f64, in_hi: f64, out_lo: f64, out_hi: f64) -> f64 {
    out_lo + (value - in_lo) * (out_hi - out_lo) / (in_hi - in_lo)
}

/// Filter cutoff for a light level: dark means more filtering, anything above the threshold none
pub fn light_to_cutoff(light: u8) -> u8 {
    if light > LIGHT_THRESHOLD {
        return 0;
    }
    map_range(light as f64, 0.0, LIGHT_THRESHOLD as f64, 127.0, 0.0)
        .round()
        .clamp(0.0, 127.0) as u8
}

/// Tempo in BPM, always within `TEMPO_MIN..=TEMPO_MAX`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tempo(u16);

impl Default for Tempo {
    fn default() -> Self {
        Self(TEMPO_DEFAULT)
    }
}

impl Tempo {
    pub fn new(bpm: u16) -> Self {
        Self(bpm.clamp(TEMPO_MIN, TEMPO_MAX))
    }

    pub fn bpm(self) -> u16 {
        self.0
    }

    pub fn increase(&mut self) {
        *self = Self::new(self.0.saturating_add(TEMPO_STEP));
    }

    pub fn decrease(&mut self) {
        *self = Self::new(self.0.saturating_sub(TEMPO_STEP));
    }

    /// Controller value (0-127) announcing this tempo
    pub fn cc_value(self) -> u8 {
        map_range(
            self.0 as f64,
            TEMPO_MIN as f64,
            TEMPO_MAX as f64,
            0.0,
            127.0,
        )
        .round() as u8
    }

    /// Milliseconds between beats
    pub fn beat_interval_ms(self) -> u32 {
        (60_000.0 / self.0 as f64).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cutoff_follows_reversed_mapping_below_threshold() {
        for light in 0..=LIGHT_THRESHOLD {
            let expected = (127.0 - light as f64 * 127.0 / 30.0).round() as u8;
            assert_eq!(expected, light_to_cutoff(light), "light {light}");
        }
        assert_eq!(127, light_to_cutoff(0));
        assert_eq!(123, light_to_cutoff(1));
        assert_eq!(0, light_to_cutoff(30));
    }

    #[test]
    fn cutoff_is_zero_above_threshold() {
        for light in (LIGHT_THRESHOLD + 1)..=127 {
            assert_eq!(0, light_to_cutoff(light));
        }
    }

    #[test]
    fn tempo_cc_covers_full_range() {
        assert_eq!(0, Tempo::new(TEMPO_MIN).cc_value());
        assert_eq!(127, Tempo::new(TEMPO_MAX).cc_value());
        assert_eq!(44, Tempo::default().cc_value());
        for bpm in TEMPO_MIN..=TEMPO_MAX {
            let expected = ((bpm - 40) as f64 * 127.0 / 260.0).round() as u8;
            assert_eq!(expected, Tempo::new(bpm).cc_value(), "bpm {bpm}");
        }
    }

    #[test]
    fn increase_then_decrease_returns_to_start() {
        for bpm in [50, 130, 290] {
            let mut tempo = Tempo::new(bpm);
            tempo.increase();
            tempo.decrease();
            assert_eq!(bpm, tempo.bpm());
        }
    }

    #[test]
    fn tempo_is_clamped_at_bounds() {
        let mut tempo = Tempo::new(TEMPO_MAX);
        tempo.increase();
        assert_eq!(TEMPO_MAX, tempo.bpm());

        let mut tempo = Tempo::new(TEMPO_MIN);
        tempo.decrease();
        assert_eq!(TEMPO_MIN, tempo.bpm());

        let mut tempo = Tempo::new(295);
        tempo.increase();
        assert_eq!(TEMPO_MAX, tempo.bpm());
    }

    #[test]
    fn beat_interval_is_rounded() {
        assert_eq!(462, Tempo::default().beat_interval_ms());
        assert_eq!(1500, Tempo::new(40).beat_interval_ms());
        assert_eq!(200, Tempo::new(300).beat_interval_ms());
    }
}
