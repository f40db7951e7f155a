//! Character-offset view of the lower-cased menu text.
//!
//! Positions, windows and distances are all measured in characters, not
//! bytes, so Hangul and Latin text behave the same way. Regex and `str::find`
//! report byte offsets; `CharText` converts between the two.

#[derive(Debug, Clone)]
pub(crate) struct CharText<'a> {
    text: &'a str,
    /// Byte offset of every char, followed by `text.len()`.
    starts: Vec<usize>,
}

impl<'a> CharText<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut starts: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        starts.push(text.len());
        Self { text, starts }
    }

    pub fn as_str(&self) -> &'a str {
        self.text
    }

    pub fn char_len(&self) -> usize {
        self.starts.len() - 1
    }

    /// Char index of the char starting at (or containing) `byte`.
    pub fn char_at(&self, byte: usize) -> usize {
        match self.starts.binary_search(&byte) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        }
    }

    /// First occurrence of `needle`, as a char index.
    pub fn find(&self, needle: &str) -> Option<usize> {
        self.text.find(needle).map(|byte| self.char_at(byte))
    }

    /// Chars `start..end`, clipped to the text.
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        let len = self.char_len();
        let start = start.min(len);
        let end = end.clamp(start, len);
        &self.text[self.starts[start]..self.starts[end]]
    }

    /// Chars within `radius` of `center` on either side.
    pub fn window(&self, center: usize, radius: usize) -> &'a str {
        self.slice(center.saturating_sub(radius), center.saturating_add(radius))
    }
}
