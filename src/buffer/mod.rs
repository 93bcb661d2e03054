//! The line buffer engine.
//!
//! A [`LineBuffer`] owns an ordered sequence of [`Line`]s addressed by
//! 1-based position. Positions are derived from the current order on every
//! call — never stored on the line — so they cannot go stale across
//! insertions and deletions. Length is likewise derived from the container.
//!
//! Backed by a contiguous `Vec`, so arbitrary insert/delete is O(n) in the
//! buffer length and append is amortized O(1). The contract is purely
//! positional; callers holding a position across a mutation must re-derive it.

use crate::classify::{classify, LineKind};
use crate::error::EditError;
use crate::pattern::{self, CaseSensitivity};

/// Default cap on line length, in characters.
///
/// Text beyond the cap is silently truncated at load time; content loss on
/// over-long lines is a known limitation, not an error.
pub const DEFAULT_MAX_LINE_LEN: usize = 4096;

/// Original line-ending style of a line, preserved for round-trip on save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminator {
    /// No terminator (final line of a file without a trailing newline).
    None,
    /// `\n`
    Lf,
    /// `\r`
    Cr,
    /// `\r\n`
    CrLf,
}

impl Terminator {
    /// The terminator as written to output.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Lf => "\n",
            Self::Cr => "\r",
            Self::CrLf => "\r\n",
        }
    }

    /// Length in bytes when rendered.
    pub const fn byte_len(self) -> usize {
        self.as_str().len()
    }
}

/// One logical line of text, without its terminator.
///
/// Lines are exclusively owned by their buffer; the buffer hands out shared
/// references for inspection only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    text: String,
    terminator: Terminator,
    kind: LineKind,
}

impl Line {
    /// Create a line, computing its kind from the text.
    fn new(text: String, terminator: Terminator) -> Self {
        let kind = classify(&text);
        Self {
            text,
            terminator,
            kind,
        }
    }

    /// The text content, terminator excluded.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The line's original terminator.
    pub const fn terminator(&self) -> Terminator {
        self.terminator
    }

    /// The line's kind, computed when the text was last set.
    pub const fn kind(&self) -> LineKind {
        self.kind
    }

    /// Rendered length in bytes: text plus terminator.
    pub fn rendered_len(&self) -> usize {
        self.text.len() + self.terminator.byte_len()
    }
}

/// A mutable sequence of lines with 1-based positional addressing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineBuffer {
    lines: Vec<Line>,
}

impl LineBuffer {
    /// Split raw bytes into lines, capped at [`DEFAULT_MAX_LINE_LEN`].
    pub fn from_bytes(raw: &[u8]) -> Self {
        Self::with_max_line_len(raw, DEFAULT_MAX_LINE_LEN)
    }

    /// Split raw bytes into lines with an explicit line-length cap.
    ///
    /// A line ends at the first `\n`, `\r`, or `\r\n`, or at end of input;
    /// the terminator style is recorded per line. Bytes are decoded lossily,
    /// so invalid UTF-8 becomes U+FFFD rather than failing the load. Text
    /// beyond `max_line_len` characters is silently dropped. Empty input
    /// yields an empty buffer.
    pub fn with_max_line_len(raw: &[u8], max_line_len: usize) -> Self {
        let mut lines = Vec::new();
        let mut rest = raw;
        while !rest.is_empty() {
            let end = rest
                .iter()
                .position(|&b| b == b'\n' || b == b'\r')
                .unwrap_or(rest.len());
            let terminator = match rest.get(end) {
                Some(b'\r') if rest.get(end + 1) == Some(&b'\n') => Terminator::CrLf,
                Some(b'\r') => Terminator::Cr,
                Some(b'\n') => Terminator::Lf,
                _ => Terminator::None,
            };
            let mut text = String::from_utf8_lossy(&rest[..end]).into_owned();
            if let Some((byte_idx, _)) = text.char_indices().nth(max_line_len) {
                text.truncate(byte_idx);
            }
            lines.push(Line::new(text, terminator));
            rest = &rest[end + terminator.byte_len()..];
        }
        Self { lines }
    }

    /// Number of lines. Always equal to the length of the underlying
    /// container; there is no separately maintained counter.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the buffer holds no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The line at a 1-based position.
    pub fn line_at(&self, position: usize) -> Option<&Line> {
        position.checked_sub(1).and_then(|idx| self.lines.get(idx))
    }

    /// Iterate lines in order with their current 1-based positions.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Line)> {
        self.lines.iter().enumerate().map(|(idx, line)| (idx + 1, line))
    }

    /// The first line whose text matches `pattern`, with its position.
    ///
    /// Deterministic: always the earliest match by position. `None` when no
    /// line matches or the buffer is empty.
    pub fn find(&self, pattern: &str, case: CaseSensitivity) -> Option<(usize, &Line)> {
        self.iter()
            .find(|(_, line)| pattern::matches(pattern, line.text(), case))
    }

    /// Byte offset of the start of the line at `position` in rendered
    /// output. Derived by summing the rendered lengths of preceding lines.
    pub fn offset_at(&self, position: usize) -> Option<usize> {
        if position < 1 || position > self.lines.len() {
            return None;
        }
        Some(
            self.lines[..position - 1]
                .iter()
                .map(Line::rendered_len)
                .sum(),
        )
    }

    /// Insert `text` as a new line at a 1-based position.
    ///
    /// Valid positions are `1..=len() + 1`; inserting at `len() + 1`
    /// appends. Positions strictly beyond the end fail with
    /// [`EditError::OutOfRange`] rather than clamping. The new line takes
    /// the LF terminator and its kind is computed immediately. Positions of
    /// all lines at or after the insertion point shift by one; positions a
    /// caller cached before this call are invalid afterwards.
    pub fn insert(&mut self, position: usize, text: &str) -> Result<(), EditError> {
        if position < 1 || position > self.lines.len() + 1 {
            return Err(self.out_of_range(position));
        }
        self.lines
            .insert(position - 1, Line::new(text.to_string(), Terminator::Lf));
        Ok(())
    }

    /// Delete the line at a 1-based position.
    ///
    /// Valid positions are `1..=len()`; anything else — including any
    /// position on an empty buffer — fails with [`EditError::OutOfRange`].
    pub fn delete_at(&mut self, position: usize) -> Result<(), EditError> {
        if position < 1 || position > self.lines.len() {
            return Err(self.out_of_range(position));
        }
        self.lines.remove(position - 1);
        Ok(())
    }

    /// Delete the first line matching `pattern`, reporting the position it
    /// held. At most one line is removed per call; callers needing bulk
    /// removal loop until [`EditError::NotFound`].
    pub fn delete_first_matching(
        &mut self,
        pattern: &str,
        case: CaseSensitivity,
    ) -> Result<usize, EditError> {
        match self.find(pattern, case) {
            Some((position, _)) => {
                self.lines.remove(position - 1);
                Ok(position)
            }
            None => Err(EditError::NotFound {
                pattern: pattern.to_string(),
            }),
        }
    }

    /// Replace the line at a 1-based position with `text`.
    ///
    /// Semantically a delete followed by an insert at the same position,
    /// performed as a single in-place swap so no intermediate state is
    /// observable and a failed call leaves the buffer unchanged. The
    /// replacement takes the LF terminator, as a fresh insert would, and its
    /// kind is recomputed.
    pub fn replace_at(&mut self, position: usize, text: &str) -> Result<(), EditError> {
        if position < 1 || position > self.lines.len() {
            return Err(self.out_of_range(position));
        }
        self.lines[position - 1] = Line::new(text.to_string(), Terminator::Lf);
        Ok(())
    }

    /// Remove the first line matching `pattern`, then insert `text` at
    /// position 1.
    ///
    /// The reinsertion point is always the head of the buffer, not the
    /// position the removed line held. Fails with [`EditError::NotFound`]
    /// (leaving the buffer unchanged) when nothing matches; the head insert
    /// itself cannot fail, so a successful removal is never left unpaired.
    pub fn replace_first_matching(
        &mut self,
        pattern: &str,
        case: CaseSensitivity,
        text: &str,
    ) -> Result<(), EditError> {
        self.delete_first_matching(pattern, case)?;
        self.lines.insert(0, Line::new(text.to_string(), Terminator::Lf));
        Ok(())
    }

    /// Lines in order as `(text, terminator)` pairs, for the save path.
    pub fn render(&self) -> impl Iterator<Item = (&str, Terminator)> {
        self.lines
            .iter()
            .map(|line| (line.text(), line.terminator()))
    }

    /// Serialize the buffer back to bytes, preserving each line's original
    /// terminator.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.lines.iter().map(Line::rendered_len).sum());
        for (text, terminator) in self.render() {
            out.extend_from_slice(text.as_bytes());
            out.extend_from_slice(terminator.as_str().as_bytes());
        }
        out
    }

    fn out_of_range(&self, position: usize) -> EditError {
        EditError::OutOfRange {
            position,
            len: self.lines.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_of(lines: &[&str]) -> LineBuffer {
        let mut buf = LineBuffer::default();
        for (idx, text) in lines.iter().enumerate() {
            buf.insert(idx + 1, text).expect("insert in range");
        }
        buf
    }

    fn texts(buf: &LineBuffer) -> Vec<String> {
        buf.iter().map(|(_, line)| line.text().to_string()).collect()
    }

    // --- Construction ---

    #[test]
    fn test_empty_input_yields_empty_buffer() {
        let buf = LineBuffer::from_bytes(b"");
        assert_eq!(buf.len(), 0);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_split_on_lf() {
        let buf = LineBuffer::from_bytes(b"one\ntwo\nthree\n");
        assert_eq!(texts(&buf), vec!["one", "two", "three"]);
    }

    #[test]
    fn test_trailing_unterminated_line() {
        let buf = LineBuffer::from_bytes(b"one\ntwo");
        assert_eq!(buf.len(), 2);
        assert_eq!(buf.line_at(2).unwrap().terminator(), Terminator::None);
    }

    #[test]
    fn test_mixed_terminators_preserved() {
        let buf = LineBuffer::from_bytes(b"a\r\nb\rc\nd");
        assert_eq!(texts(&buf), vec!["a", "b", "c", "d"]);
        assert_eq!(buf.line_at(1).unwrap().terminator(), Terminator::CrLf);
        assert_eq!(buf.line_at(2).unwrap().terminator(), Terminator::Cr);
        assert_eq!(buf.line_at(3).unwrap().terminator(), Terminator::Lf);
        assert_eq!(buf.line_at(4).unwrap().terminator(), Terminator::None);
    }

    #[test]
    fn test_blank_lines_survive_split() {
        let buf = LineBuffer::from_bytes(b"a\n\nb\n");
        assert_eq!(texts(&buf), vec!["a", "", "b"]);
    }

    #[test]
    fn test_kind_computed_at_construction() {
        let buf = LineBuffer::from_bytes(b"echo hi\n; note\n\n");
        assert_eq!(buf.line_at(1).unwrap().kind(), crate::classify::LineKind::Command);
        assert_eq!(buf.line_at(2).unwrap().kind(), crate::classify::LineKind::Comment);
        assert_eq!(buf.line_at(3).unwrap().kind(), crate::classify::LineKind::Empty);
    }

    #[test]
    fn test_long_line_truncated_to_cap() {
        let raw = format!("{}\nshort\n", "x".repeat(10));
        let buf = LineBuffer::with_max_line_len(raw.as_bytes(), 4);
        assert_eq!(texts(&buf), vec!["xxxx", "shor"]);
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let raw = "ééééé\n".as_bytes().to_vec();
        let buf = LineBuffer::with_max_line_len(&raw, 3);
        assert_eq!(buf.line_at(1).unwrap().text(), "ééé");
    }

    #[test]
    fn test_invalid_utf8_is_replaced_not_fatal() {
        let buf = LineBuffer::from_bytes(b"ok\n\xFF\xFE\n");
        assert_eq!(buf.len(), 2);
        assert!(buf.line_at(2).unwrap().text().contains('\u{FFFD}'));
    }

    // --- Queries ---

    #[test]
    fn test_line_at_is_one_based() {
        let buf = buffer_of(&["one", "two"]);
        assert_eq!(buf.line_at(1).unwrap().text(), "one");
        assert_eq!(buf.line_at(2).unwrap().text(), "two");
        assert!(buf.line_at(0).is_none());
        assert!(buf.line_at(3).is_none());
    }

    #[test]
    fn test_find_returns_earliest_match() {
        let buf = buffer_of(&["alpha", "echo one", "echo two"]);
        let (position, line) = buf.find("echo *", CaseSensitivity::Sensitive).unwrap();
        assert_eq!(position, 2);
        assert_eq!(line.text(), "echo one");
    }

    #[test]
    fn test_find_no_match_is_none() {
        let buf = buffer_of(&["alpha", "beta"]);
        assert!(buf.find("echo *", CaseSensitivity::Sensitive).is_none());
    }

    #[test]
    fn test_find_on_empty_buffer_is_none() {
        let buf = LineBuffer::default();
        assert!(buf.find("*", CaseSensitivity::Sensitive).is_none());
    }

    #[test]
    fn test_find_case_insensitive() {
        let buf = buffer_of(&["Echo One"]);
        assert!(buf.find("echo *", CaseSensitivity::Sensitive).is_none());
        assert!(buf.find("echo *", CaseSensitivity::Insensitive).is_some());
    }

    #[test]
    fn test_offsets_derived_from_rendered_lengths() {
        let buf = LineBuffer::from_bytes(b"ab\r\nc\nd");
        assert_eq!(buf.offset_at(1), Some(0));
        assert_eq!(buf.offset_at(2), Some(4)); // "ab\r\n"
        assert_eq!(buf.offset_at(3), Some(6)); // + "c\n"
        assert_eq!(buf.offset_at(4), None);
    }

    // --- Insert ---

    #[test]
    fn test_insert_at_head() {
        let mut buf = buffer_of(&["two"]);
        buf.insert(1, "one").unwrap();
        assert_eq!(texts(&buf), vec!["one", "two"]);
    }

    #[test]
    fn test_insert_in_middle_shifts_following() {
        let mut buf = buffer_of(&["one", "two"]);
        buf.insert(2, "mid").unwrap();
        assert_eq!(texts(&buf), vec!["one", "mid", "two"]);
    }

    #[test]
    fn test_insert_at_len_plus_one_appends() {
        let mut buf = buffer_of(&["one"]);
        buf.insert(2, "two").unwrap();
        assert_eq!(texts(&buf), vec!["one", "two"]);
    }

    #[test]
    fn test_insert_beyond_end_fails() {
        let mut buf = buffer_of(&["one"]);
        let err = buf.insert(3, "nope").unwrap_err();
        assert!(matches!(err, EditError::OutOfRange { position: 3, len: 1 }));
        assert_eq!(buf.len(), 1);
    }

    #[test]
    fn test_insert_at_zero_fails() {
        let mut buf = buffer_of(&["one"]);
        assert!(matches!(
            buf.insert(0, "nope"),
            Err(EditError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_insert_into_empty_buffer() {
        let mut buf = LineBuffer::default();
        buf.insert(1, "only").unwrap();
        assert_eq!(buf.len(), 1);
    }

    #[test]
    fn test_inserted_line_defaults_to_lf_and_has_kind() {
        let mut buf = LineBuffer::default();
        buf.insert(1, "; note").unwrap();
        let line = buf.line_at(1).unwrap();
        assert_eq!(line.terminator(), Terminator::Lf);
        assert_eq!(line.kind(), crate::classify::LineKind::Comment);
    }

    // --- Delete ---

    #[test]
    fn test_delete_at_removes_line() {
        let mut buf = buffer_of(&["one", "two", "three"]);
        buf.delete_at(2).unwrap();
        assert_eq!(texts(&buf), vec!["one", "three"]);
    }

    #[test]
    fn test_delete_on_empty_buffer_fails() {
        let mut buf = LineBuffer::default();
        assert!(matches!(
            buf.delete_at(1),
            Err(EditError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_delete_out_of_range_fails() {
        let mut buf = buffer_of(&["one"]);
        assert!(buf.delete_at(2).is_err());
        assert!(buf.delete_at(0).is_err());
        assert_eq!(buf.len(), 1);
    }

    #[test]
    fn test_insert_then_delete_round_trips() {
        let original = buffer_of(&["one", "two", "three"]);
        for position in 1..=original.len() + 1 {
            let mut buf = original.clone();
            buf.insert(position, "extra").unwrap();
            assert_eq!(buf.len(), original.len() + 1);
            buf.delete_at(position).unwrap();
            assert_eq!(buf, original);
        }
    }

    // --- Delete by pattern ---

    #[test]
    fn test_delete_first_matching_removes_one() {
        let mut buf = buffer_of(&["echo a", "; note", "echo b"]);
        let position = buf
            .delete_first_matching("echo *", CaseSensitivity::Sensitive)
            .unwrap();
        assert_eq!(position, 1);
        assert_eq!(texts(&buf), vec!["; note", "echo b"]);
    }

    #[test]
    fn test_delete_first_matching_not_found() {
        let mut buf = buffer_of(&["one"]);
        let err = buf
            .delete_first_matching("echo *", CaseSensitivity::Sensitive)
            .unwrap_err();
        assert!(matches!(err, EditError::NotFound { .. }));
        assert_eq!(buf.len(), 1);
    }

    #[test]
    fn test_bulk_removal_loops_until_not_found() {
        let mut buf = buffer_of(&["echo a", "keep", "echo b"]);
        let mut removed = 0;
        while buf
            .delete_first_matching("echo *", CaseSensitivity::Sensitive)
            .is_ok()
        {
            removed += 1;
        }
        assert_eq!(removed, 2);
        assert_eq!(texts(&buf), vec!["keep"]);
    }

    #[test]
    fn test_remove_scenario() {
        let mut buf = buffer_of(&["echo a", "; note", ""]);
        buf.delete_first_matching("echo *", CaseSensitivity::Sensitive)
            .unwrap();
        assert_eq!(texts(&buf), vec!["; note", ""]);
        assert_eq!(buf.len(), 2);
    }

    // --- Replace ---

    #[test]
    fn test_replace_at_swaps_in_place() {
        let mut buf = buffer_of(&["one", "two"]);
        buf.replace_at(2, "TWO").unwrap();
        assert_eq!(texts(&buf), vec!["one", "TWO"]);
        assert_eq!(buf.len(), 2);
    }

    #[test]
    fn test_replace_at_recomputes_kind_and_resets_terminator() {
        let mut buf = LineBuffer::from_bytes(b"echo hi\r\n");
        buf.replace_at(1, "; now a comment").unwrap();
        let line = buf.line_at(1).unwrap();
        assert_eq!(line.kind(), crate::classify::LineKind::Comment);
        assert_eq!(line.terminator(), Terminator::Lf);
    }

    #[test]
    fn test_replace_at_out_of_range_leaves_buffer_unchanged() {
        let mut buf = buffer_of(&["one"]);
        let before = buf.clone();
        assert!(buf.replace_at(2, "nope").is_err());
        assert_eq!(buf, before);
    }

    #[test]
    fn test_replace_first_matching_reinserts_at_head() {
        let mut buf = buffer_of(&["alpha", "echo x", "omega"]);
        buf.replace_first_matching("echo *", CaseSensitivity::Sensitive, "print y")
            .unwrap();
        assert_eq!(texts(&buf), vec!["print y", "alpha", "omega"]);
    }

    #[test]
    fn test_replace_first_matching_not_found_leaves_buffer_unchanged() {
        let mut buf = buffer_of(&["alpha"]);
        let before = buf.clone();
        assert!(buf
            .replace_first_matching("echo *", CaseSensitivity::Sensitive, "x")
            .is_err());
        assert_eq!(buf, before);
    }

    // --- Render ---

    #[test]
    fn test_render_preserves_terminators() {
        let raw = b"a\r\nb\rc\nd";
        let buf = LineBuffer::from_bytes(raw);
        assert_eq!(buf.to_bytes(), raw.to_vec());
    }

    #[test]
    fn test_render_after_mutation() {
        let mut buf = LineBuffer::from_bytes(b"a\r\nb\n");
        buf.insert(2, "mid").unwrap();
        assert_eq!(buf.to_bytes(), b"a\r\nmid\nb\n".to_vec());
    }

    #[test]
    fn test_render_pairs() {
        let buf = LineBuffer::from_bytes(b"a\nb");
        let rendered: Vec<_> = buf.render().collect();
        assert_eq!(rendered, vec![("a", Terminator::Lf), ("b", Terminator::None)]);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn insert_then_delete_restores_buffer(
                lines in proptest::collection::vec("[a-z ;]{0,12}", 0..8),
                position_seed in 0usize..64,
                text in "[a-z ]{0,12}",
            ) {
                let seed: Vec<&str> = lines.iter().map(String::as_str).collect();
                let original = buffer_of(&seed);
                let position = position_seed % (original.len() + 1) + 1;

                let mut buf = original.clone();
                buf.insert(position, &text).unwrap();
                prop_assert_eq!(buf.len(), original.len() + 1);
                buf.delete_at(position).unwrap();
                prop_assert_eq!(buf, original);
            }

            #[test]
            fn split_render_round_trips(
                chunks in proptest::collection::vec("[a-z ]{0,10}", 0..8),
                terminators in proptest::collection::vec(0u8..4, 0..8),
            ) {
                // Build raw bytes from text chunks and terminator picks; an
                // unterminated chunk can only be last, so stop there.
                let mut raw = Vec::new();
                for (chunk, pick) in chunks.iter().zip(&terminators) {
                    raw.extend_from_slice(chunk.as_bytes());
                    match pick {
                        0 => raw.extend_from_slice(b"\n"),
                        1 => raw.extend_from_slice(b"\r"),
                        2 => raw.extend_from_slice(b"\r\n"),
                        _ => break,
                    }
                }
                let buf = LineBuffer::from_bytes(&raw);
                prop_assert_eq!(buf.to_bytes(), raw);
            }
        }
    }
}
