//! MIME header block handling.

use std::borrow::Cow;

/// An ordered block of header fields.
///
/// Folded values are unfolded at parse time. Lookups are case-insensitive
/// and return the first field of a given name; repeated fields are kept but
/// never merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderBlock {
    fields: Vec<(String, String)>,
}

impl HeaderBlock {
    /// Creates a new empty header block.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a header field.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// Gets the first value for a header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Returns true if the block has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Parses a raw header block.
    ///
    /// Accepts `\r\n` and `\n` line endings. A line starting with a space
    /// or tab continues the previous field and is joined with one space.
    /// Lines that are neither a continuation nor `name: value` (with no
    /// whitespace inside the name) are skipped,
    /// and parsing stops at the first empty line.
    #[must_use]
    pub fn parse(raw: &[u8]) -> Self {
        let text = String::from_utf8_lossy(raw);
        Self::parse_str(&text)
    }

    fn parse_str(text: &str) -> Self {
        let mut headers = Self::new();
        let mut current: Option<(String, String)> = None;

        for line in text.split('\n') {
            let line = line.strip_suffix('\r').unwrap_or(line);

            if line.is_empty() {
                break;
            }

            if line.starts_with(' ') || line.starts_with('\t') {
                if let Some((_, value)) = current.as_mut() {
                    let folded = line.trim();
                    if !folded.is_empty() {
                        if !value.is_empty() {
                            value.push(' ');
                        }
                        value.push_str(folded);
                    }
                }
                continue;
            }

            if let Some((name, value)) = current.take() {
                headers.add(name, value);
            }

            if let Some((name, value)) = line.split_once(':') {
                let name = name.trim();
                if !name.is_empty() && !name.contains(char::is_whitespace) {
                    current = Some((name.to_string(), value.trim().to_string()));
                }
            }
        }

        if let Some((name, value)) = current {
            headers.add(name, value);
        }

        headers
    }
}

/// Unfolds a single header value (RFC 5322 section 2.2.3).
///
/// Each line break plus the whitespace run that follows it collapses into
/// one space.
#[must_use]
pub fn unfold(value: &str) -> Cow<'_, str> {
    if !value.contains('\n') {
        return Cow::Borrowed(value);
    }

    let mut out = String::with_capacity(value.len());
    for (i, line) in value.split('\n').enumerate() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if i == 0 {
            out.push_str(line.trim_end());
        } else {
            let folded = line.trim();
            if !folded.is_empty() {
                out.push(' ');
                out.push_str(folded);
            }
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect
)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_add_get() {
        let mut headers = HeaderBlock::new();
        headers.add("Content-Type", "text/plain");
        assert_eq!(headers.get("Content-Type"), Some("text/plain"));
        assert_eq!(headers.get("content-type"), Some("text/plain"));
        assert_eq!(headers.get("CONTENT-TYPE"), Some("text/plain"));
    }

    #[test]
    fn test_headers_first_match_wins() {
        let headers = HeaderBlock::parse(b"Subject: first\r\nSubject: second\r\n");
        assert_eq!(headers.get("subject"), Some("first"));
        assert_eq!(headers.fields.len(), 2);
        assert_eq!(headers.fields[1].1, "second");
    }

    #[test]
    fn test_headers_parse() {
        let text = concat!(
            "From: sender@example.com\r\n",
            "To: recipient@example.com\r\n",
            "Subject: Test Message\r\n",
            "Content-Type: multipart/mixed;\r\n",
            "\tboundary=\"abc\"\r\n",
        );

        let headers = HeaderBlock::parse(text.as_bytes());
        assert_eq!(headers.get("From"), Some("sender@example.com"));
        assert_eq!(headers.get("To"), Some("recipient@example.com"));
        assert_eq!(headers.get("Subject"), Some("Test Message"));
        assert_eq!(
            headers.get("Content-Type"),
            Some("multipart/mixed; boundary=\"abc\"")
        );
    }

    #[test]
    fn test_headers_parse_lf_and_garbage() {
        let text = "From somebody Tue Jan 1 00:00:00 2024\nSubject: hi\n  there\nX-Empty:\n";
        let headers = HeaderBlock::parse(text.as_bytes());
        assert_eq!(headers.get("subject"), Some("hi there"));
        assert_eq!(headers.get("x-empty"), Some(""));
        assert_eq!(headers.fields.len(), 2);
    }

    #[test]
    fn test_headers_parse_stops_at_blank_line() {
        let headers = HeaderBlock::parse(b"A: 1\n\nB: 2\n");
        assert_eq!(headers.get("a"), Some("1"));
        assert!(headers.get("b").is_none());
    }

    #[test]
    fn test_headers_iter_preserves_order() {
        let headers = HeaderBlock::parse(b"B: 2\r\nA: 1\r\n");
        let names: Vec<&str> = headers
            .fields
            .iter()
            .map(|(name, _)| name.as_str())
            .collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn test_unfold() {
        assert_eq!(unfold("plain"), "plain");
        assert_eq!(unfold("a\r\n b\r\n\tc"), "a b c");
        assert_eq!(unfold("a\n   b"), "a b");
    }
}
