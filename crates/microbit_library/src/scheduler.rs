use crate::channels::Channel;
use std::time::{Duration, Instant};

/// How long a triggered note sounds before its Note Off
pub const NOTE_HOLD: Duration = Duration::from_millis(100);

/// Note Offs waiting for their deadline, at most one per channel
#[derive(Debug, Default)]
pub struct NoteScheduler {
    pending: Vec<(Instant, Channel)>,
}

impl NoteScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, channel: Channel, due: Instant) {
        self.pending.push((due, channel));
    }

    /// Withdraws the pending Note Off for `channel`, if any
    pub fn take(&mut self, channel: Channel) -> bool {
        let before = self.pending.len();
        self.pending.retain(|&(_, c)| c != channel);
        self.pending.len() != before
    }

    /// Removes and returns channels whose deadline is at or before `now`, earliest first
    pub fn take_due(&mut self, now: Instant) -> Vec<Channel> {
        let mut due: Vec<(Instant, Channel)> = Vec::new();
        self.pending.retain(|&(at, channel)| {
            if at <= now {
                due.push((at, channel));
                false
            } else {
                true
            }
        });
        due.sort_by_key(|&(at, _)| at);
        due.into_iter().map(|(_, channel)| channel).collect()
    }

    pub fn take_all(&mut self) -> Vec<Channel> {
        self.pending.sort_by_key(|&(at, _)| at);
        self.pending.drain(..).map(|(_, channel)| channel).collect()
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.pending.iter().map(|&(at, _)| at).min()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
