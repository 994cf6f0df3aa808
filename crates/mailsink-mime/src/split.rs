//! Header/body section splitting.
//!
//! Messages in the wild mix `\r\n` and `\n` line endings, sometimes within
//! one header block, so the blank line separating headers from body is
//! whichever of `\r\n\r\n` or `\n\n` comes first.

/// Location of the blank line that ends a header block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlankLine {
    /// Byte offset where the terminator starts.
    pub start: usize,
    /// Terminator length: 4 for `\r\n\r\n`, 2 for `\n\n`.
    pub len: usize,
}

impl BlankLine {
    /// Offset of the first body byte.
    #[must_use]
    pub const fn body_start(self) -> usize {
        self.start + self.len
    }
}

/// Finds the earliest header/body terminator in `raw`.
#[must_use]
pub fn find_blank_line(raw: &[u8]) -> Option<BlankLine> {
    let crlf = find(raw, b"\r\n\r\n").map(|start| BlankLine { start, len: 4 });
    let lf = find(raw, b"\n\n").map(|start| BlankLine { start, len: 2 });

    match (crlf, lf) {
        (Some(a), Some(b)) => Some(if a.start <= b.start { a } else { b }),
        (a, b) => a.or(b),
    }
}

/// Splits a raw message into `(headers, body)`.
///
/// Without any blank line the whole input is treated as a headerless body.
#[must_use]
pub fn split_header_body(raw: &[u8]) -> (&[u8], &[u8]) {
    find_blank_line(raw).map_or((&raw[..0], raw), |blank| {
        (&raw[..blank.start], &raw[blank.body_start()..])
    })
}

/// Splits one multipart segment into `(headers, body)`.
///
/// A segment that opens with a line ending has no headers at all; the
/// body is everything after that line ending.
#[must_use]
pub fn split_part(segment: &[u8]) -> (&[u8], &[u8]) {
    if let Some(rest) = segment.strip_prefix(b"\r\n") {
        return (&segment[..0], rest);
    }
    if let Some(rest) = segment.strip_prefix(b"\n") {
        return (&segment[..0], rest);
    }
    split_header_body(segment)
}

/// Returns the offset of the first occurrence of `needle` in `haystack`.
pub(crate) fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Strips ASCII whitespace from both ends of a byte slice.
pub(crate) fn trim_bytes(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    &bytes[start..end]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_split_crlf() {
        let (headers, body) = split_header_body(b"Subject: hi\r\n\r\nHello\r\n");
        assert_eq!(headers, b"Subject: hi");
        assert_eq!(body, b"Hello\r\n");
    }

    #[test]
    fn test_split_lf() {
        let (headers, body) = split_header_body(b"Subject: hi\n\nHello");
        assert_eq!(headers, b"Subject: hi");
        assert_eq!(body, b"Hello");
    }

    #[test]
    fn test_split_earliest_terminator_wins() {
        // LF blank line appears before a later CRLF blank line.
        let raw = b"A: 1\n\nbody\r\n\r\nmore";
        let (headers, body) = split_header_body(raw);
        assert_eq!(headers, b"A: 1");
        assert_eq!(body, b"body\r\n\r\nmore");

        let raw = b"A: 1\r\n\r\nbody\n\nmore";
        let (headers, body) = split_header_body(raw);
        assert_eq!(headers, b"A: 1");
        assert_eq!(body, b"body\n\nmore");
    }

    #[test]
    fn test_split_mixed_endings_in_headers() {
        let raw = b"A: 1\r\nB: 2\n\nbody";
        let (headers, body) = split_header_body(raw);
        assert_eq!(headers, b"A: 1\r\nB: 2");
        assert_eq!(body, b"body");
    }

    #[test]
    fn test_split_no_blank_line_is_headerless() {
        let raw = b"just some text\r\nwithout a separator";
        let (headers, body) = split_header_body(raw);
        assert!(headers.is_empty());
        assert_eq!(body, raw);
        assert!(find_blank_line(raw).is_none());
    }

    #[test]
    fn test_split_part_without_headers() {
        let (headers, body) = split_part(b"\r\nplain body\r\n\r\nsecond paragraph");
        assert!(headers.is_empty());
        assert_eq!(body, b"plain body\r\n\r\nsecond paragraph");
    }

    #[test]
    fn test_split_part_with_headers() {
        let (headers, body) = split_part(b"Content-Type: text/plain\n\nhello");
        assert_eq!(headers, b"Content-Type: text/plain");
        assert_eq!(body, b"hello");
    }

    #[test]
    fn test_trim_bytes() {
        assert_eq!(trim_bytes(b"  \r\nabc \t\n"), b"abc");
        assert_eq!(trim_bytes(b" \r\n "), b"");
        assert_eq!(trim_bytes(b""), b"");
    }

    proptest! {
        #[test]
        fn prop_split_is_lossless(raw in proptest::collection::vec(
            prop_oneof![Just(b'\r'), Just(b'\n'), Just(b'a'), Just(b':'), Just(b' ')], 0..64)
        ) {
            let (headers, body) = split_header_body(&raw);
            match find_blank_line(&raw) {
                Some(blank) => {
                    let terminator = &raw[blank.start..blank.body_start()];
                    let mut rebuilt = headers.to_vec();
                    rebuilt.extend_from_slice(terminator);
                    rebuilt.extend_from_slice(body);
                    prop_assert_eq!(rebuilt, raw.clone());
                    // The header block never contains an earlier terminator.
                    prop_assert!(find(headers, b"\n\n").is_none());
                    prop_assert!(find(headers, b"\r\n\r\n").is_none());
                }
                None => {
                    prop_assert!(headers.is_empty());
                    prop_assert_eq!(body, &raw[..]);
                }
            }
        }

        #[test]
        fn prop_body_is_untouched_suffix(
            header in "[A-Za-z-]{1,12}: [a-z ]{0,20}",
            body in "[a-z\n]{0,40}",
        ) {
            let raw = format!("{header}\r\n\r\n{body}");
            let (h, b) = split_header_body(raw.as_bytes());
            prop_assert_eq!(h, header.as_bytes());
            prop_assert_eq!(b, body.as_bytes());
        }
    }
}
