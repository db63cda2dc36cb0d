// Indexable views of strings in a chosen text unit.
//
// Script offsets and lengths count "units".  Two unit systems are supported:
// Unicode scalar values (`Indexing::Chars`) and UTF-16 code units
// (`Indexing::Utf16`), the latter for scripts produced by generators that
// index strings the way JavaScript does.

/// The unit in which script offsets and lengths are measured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Indexing {
    /// Unicode scalar values (`char`).
    #[default]
    Chars,
    /// UTF-16 code units; astral characters count as two.
    Utf16,
}

impl Indexing {
    pub fn as_str(self) -> &'static str {
        match self {
            Indexing::Chars => "chars",
            Indexing::Utf16 => "utf16",
        }
    }
}

/// Length of `text` measured in `indexing` units.
pub fn unit_len(text: &str, indexing: Indexing) -> usize {
    match indexing {
        Indexing::Chars => text.chars().count(),
        Indexing::Utf16 => text.encode_utf16().count(),
    }
}

/// A string addressable by unit index.
pub trait TextUnits {
    /// Output buffer the units are appended to.
    type Buf: Default;

    /// Number of units in the view.
    fn unit_len(&self) -> usize;

    /// Append units `start..end` to `out`.
    ///
    /// Callers guarantee `start <= end <= self.unit_len()`.
    fn push_range(&self, start: usize, end: usize, out: &mut Self::Buf);
}

// ---------------------------------------------------------------------------
// Chars
// ---------------------------------------------------------------------------

/// Char-indexed view over a borrowed `str`.
///
/// ASCII text is addressed directly by byte offset.  Other text keeps a table
/// of char boundaries so that every slice is a zero-copy `&str`.
pub struct CharView<'a> {
    text: &'a str,
    /// Byte offset of each char, plus a trailing `text.len()`.
    /// `None` when the text is ASCII.
    bounds: Option<Vec<usize>>,
}

impl<'a> CharView<'a> {
    pub fn new(text: &'a str) -> Self {
        let bounds = if text.is_ascii() {
            None
        } else {
            Some(
                text.char_indices()
                    .map(|(i, _)| i)
                    .chain(std::iter::once(text.len()))
                    .collect(),
            )
        };
        Self { text, bounds }
    }

    #[inline]
    fn byte_offset(&self, unit: usize) -> usize {
        match &self.bounds {
            None => unit,
            Some(bounds) => bounds[unit],
        }
    }

    /// Units `start..end` as a string slice.
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.text[self.byte_offset(start)..self.byte_offset(end)]
    }
}

impl TextUnits for CharView<'_> {
    type Buf = String;

    #[inline]
    fn unit_len(&self) -> usize {
        match &self.bounds {
            None => self.text.len(),
            Some(bounds) => bounds.len() - 1,
        }
    }

    #[inline]
    fn push_range(&self, start: usize, end: usize, out: &mut String) {
        out.push_str(self.slice(start, end));
    }
}

// ---------------------------------------------------------------------------
// UTF-16
// ---------------------------------------------------------------------------

/// UTF-16 code unit view.  Slices may split a surrogate pair; the caller
/// decides how to turn the output units back into a `String`.
pub struct Utf16View {
    units: Vec<u16>,
}

impl Utf16View {
    pub fn new(text: &str) -> Self {
        Self {
            units: text.encode_utf16().collect(),
        }
    }
}

impl TextUnits for Utf16View {
    type Buf = Vec<u16>;

    #[inline]
    fn unit_len(&self) -> usize {
        self.units.len()
    }

    #[inline]
    fn push_range(&self, start: usize, end: usize, out: &mut Vec<u16>) {
        out.extend_from_slice(&self.units[start..end]);
    }
}
