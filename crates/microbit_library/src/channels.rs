use num_derive::FromPrimitive;

/// Instrument slots, one MIDI channel each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, FromPrimitive)]
pub enum Channel {
    #[default]
    Kick = 0,
    Clap = 1,
    HiHat = 2,
    Snare = 3,
    Bass = 4,
}

impl Channel {
    #[cfg(test)]
    pub const ALL: [Channel; 5] = [
        Channel::Kick,
        Channel::Clap,
        Channel::HiHat,
        Channel::Snare,
        Channel::Bass,
    ];

    #[cfg(test)]
    pub fn from_index(index: usize) -> Option<Self> {
        num_traits::FromPrimitive::from_usize(index)
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// MIDI channel number (0-15) the slot plays on
    pub fn midi_channel(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Channel::Kick => "808 Kick",
            Channel::Clap => "808 Clap",
            Channel::HiHat => "808 HiHat",
            Channel::Snare => "808 Snare",
            Channel::Bass => "FLEX Bass",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trips_for_every_slot() {
        for (i, channel) in Channel::ALL.iter().enumerate() {
            assert_eq!(Some(*channel), Channel::from_index(i));
            assert_eq!(i, channel.index());
        }
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        assert_eq!(None, Channel::from_index(5));
    }

    #[test]
    fn names() {
        assert_eq!("808 Kick", Channel::Kick.name());
        assert_eq!("FLEX Bass", Channel::Bass.name());
        assert_eq!(4, Channel::Bass.midi_channel());
    }
}
