pub const HISTORY_LEN: usize = 100;

/// Fixed size ring of recent light values, oldest overwritten first
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    values: [u8; HISTORY_LEN],
    next: usize,
}

impl Default for History {
    fn default() -> Self {
        Self {
            values: [0; HISTORY_LEN],
            next: 0,
        }
    }
}

impl History {
    pub fn push(&mut self, value: u8) {
        self.values[self.next] = value;
        self.next = (self.next + 1) % HISTORY_LEN;
    }

    /// All slots, most recent first; never-written slots read as zero
    pub fn newest_first(&self) -> impl Iterator<Item = u8> + '_ {
        (1..=HISTORY_LEN).map(move |i| self.values[(self.next + HISTORY_LEN - i) % HISTORY_LEN])
    }
}
