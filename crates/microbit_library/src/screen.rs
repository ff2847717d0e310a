use std::io::{self, Write};

pub const WIDTH: usize = 100;
pub const HEIGHT: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    #[default]
    White,
    Grey,
    Red,
    Green,
    Yellow,
    Orange,
    Cyan,
}

impl Color {
    fn ansi(self) -> &'static str {
        match self {
            Color::White => "\x1b[97m",
            Color::Grey => "\x1b[90m",
            Color::Red => "\x1b[91m",
            Color::Green => "\x1b[92m",
            Color::Yellow => "\x1b[93m",
            Color::Orange => "\x1b[38;5;214m",
            Color::Cyan => "\x1b[96m",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub color: Color,
}

const BLANK: Cell = Cell {
    ch: ' ',
    color: Color::White,
};

/// Character cell frame buffer for the terminal
pub struct Screen {
    buffer: [[Cell; WIDTH]; HEIGHT],
}

impl Screen {
    #[allow(clippy::new_without_default, reason = "intentional")]
    pub fn new() -> Self {
        Self {
            buffer: [[BLANK; WIDTH]; HEIGHT],
        }
    }

    pub fn reset(&mut self) {
        for row in self.buffer.iter_mut() {
            row.fill(BLANK);
        }
    }

    #[cfg(test)]
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.buffer[row][col]
    }

    /// Out of range cells are clipped
    pub fn set(&mut self, row: usize, col: usize, ch: char, color: Color) {
        if row < HEIGHT && col < WIDTH {
            self.buffer[row][col] = Cell { ch, color };
        }
    }

    pub fn write_str(&mut self, row: usize, col: usize, text: &str, color: Color) {
        for (i, ch) in text.chars().enumerate() {
            self.set(row, col + i, ch, color);
        }
    }

    pub fn write_centered(&mut self, row: usize, text: &str, color: Color) {
        let len = text.chars().count();
        let col = WIDTH.saturating_sub(len) / 2;
        self.write_str(row, col, text, color);
    }

    #[cfg(test)]
    /// Plain text of one row without trailing blanks
    pub fn row_text(&self, row: usize) -> String {
        let text: String = self.buffer[row].iter().map(|c| c.ch).collect();
        text.trim_end().to_string()
    }

    /// Redraws the whole frame in place from the top-left corner
    pub fn write<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let mut frame = String::with_capacity(WIDTH * HEIGHT * 2);
        frame.push_str("\x1b[H");
        for row in self.buffer.iter() {
            let mut color = None;
            for cell in row.iter() {
                if color != Some(cell.color) {
                    frame.push_str(cell.color.ansi());
                    color = Some(cell.color);
                }
                frame.push(cell.ch);
            }
            // raw terminal mode needs the explicit carriage return
            frame.push_str("\x1b[0m\x1b[K\r\n");
        }
        out.write_all(frame.as_bytes())?;
        out.flush()
    }
}

/// Clears the terminal once before the first frame
pub fn clear<W: Write>(out: &mut W) -> io::Result<()> {
    out.write_all(b"\x1b[2J\x1b[H")?;
    out.flush()
}
