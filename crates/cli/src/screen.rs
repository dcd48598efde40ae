//! Terminal frame buffer: a fixed `columns x rows` grid of characters,
//! drawn in one shot behind an ANSI home sequence so a full-width terminal
//! wraps each row on its own without embedded newlines.

const ESCAPE_CLEAR: &str = "\u{1b}[2J";
const ESCAPE_HOME: &str = "\u{1b}[;H";

pub struct Screen {
    columns: usize,
    rows: usize,
    frame: Vec<char>,
}

impl Screen {
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            columns,
            rows,
            frame: vec![' '; columns * rows],
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// The row's cells, from `col` to the end of the frame buffer.
    pub fn pos(&mut self, col: usize, row: usize) -> &mut [char] {
        let idx = row * self.columns + col;
        &mut self.frame[idx..]
    }

    /// Write up to `n - 1` characters of `text` at `(col, row)`. The cell
    /// right after the written text is set to `new_terminator`, or left
    /// holding whatever character was already there if `new_terminator`
    /// is `None`.
    pub fn nprintf(&mut self, col: usize, row: usize, n: usize, new_terminator: Option<char>, text: &str) {
        let idx = row * self.columns + col;
        let max_len = n.saturating_sub(1).min(self.frame.len().saturating_sub(idx));
        let chars: Vec<char> = text.chars().take(max_len).collect();
        let terminator_idx = idx + chars.len();

        let terminator = match new_terminator {
            Some(c) => c,
            None => self.frame.get(terminator_idx).copied().unwrap_or(' '),
        };

        for (i, c) in chars.into_iter().enumerate() {
            self.frame[idx + i] = c;
        }
        if let Some(cell) = self.frame.get_mut(terminator_idx) {
            *cell = terminator;
        }
    }

    /// Blank the frame buffer back to spaces.
    pub fn blank(&mut self) {
        self.frame.fill(' ');
    }

    /// The ANSI home sequence followed by the whole frame buffer.
    pub fn draw(&self) -> String {
        let mut out = String::with_capacity(ESCAPE_HOME.len() + self.frame.len());
        out.push_str(ESCAPE_HOME);
        out.extend(self.frame.iter());
        out
    }

    pub fn clear() -> &'static str {
        ESCAPE_CLEAR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pos_indexes_row_major() {
        let mut screen = Screen::new(4, 2);
        screen.pos(0, 1)[0] = 'x';
        assert_eq!(screen.frame[4], 'x');
    }

    #[test]
    fn nprintf_preserves_prior_terminator_by_default() {
        let mut screen = Screen::new(10, 1);
        screen.pos(0, 0)[3] = '!';
        screen.nprintf(0, 0, 4, None, "abc");
        assert_eq!(screen.frame[0..3], ['a', 'b', 'c']);
        assert_eq!(screen.frame[3], '!');
    }

    #[test]
    fn nprintf_truncates_to_n_minus_one() {
        let mut screen = Screen::new(10, 1);
        screen.nprintf(0, 0, 3, Some('|'), "abcdef");
        assert_eq!(screen.frame[0], 'a');
        assert_eq!(screen.frame[1], 'b');
        assert_eq!(screen.frame[2], '|');
    }

    #[test]
    fn draw_opens_with_the_home_sequence() {
        let screen = Screen::new(2, 2);
        assert!(screen.draw().starts_with(ESCAPE_HOME));
    }
}
