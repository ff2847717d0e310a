/// Splits a serial byte stream into text lines.
///
/// Both `\r` and `\n` terminate a line, so `\r\n` endings yield a single line.
/// Nothing bounds the buffer: a sender that never terminates a line grows it forever.
#[derive(Debug, Default)]
pub struct LineFramer {
    buffer: Vec<u8>,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes, returning every line completed by them
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        for &byte in bytes {
            if byte == b'\n' || byte == b'\r' {
                if !self.buffer.is_empty() {
                    lines.push(String::from_utf8_lossy(&self.buffer).into_owned());
                    self.buffer.clear();
                }
            } else {
                self.buffer.push(byte);
            }
        }
        lines
    }

    #[cfg(test)]
    /// Bytes received since the last terminator
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_complete_lines_only() {
        let mut framer = LineFramer::new();
        assert!(framer.push(b"L:12,A:Tr").is_empty());
        assert_eq!(9, framer.pending());

        let lines = framer.push(b"ue\nL:13");
        assert_eq!(vec!["L:12,A:True".to_string()], lines);
        assert_eq!(4, framer.pending());
    }

    #[test]
    fn crlf_and_blank_lines_are_skipped() {
        let mut framer = LineFramer::new();
        let lines = framer.push(b"one\r\n\r\n\ntwo\r");
        assert_eq!(vec!["one".to_string(), "two".to_string()], lines);
        assert_eq!(0, framer.pending());
    }

    #[test]
    fn lone_terminator_is_ignored() {
        let mut framer = LineFramer::new();
        assert!(framer.push(b"\n").is_empty());
    }
}
