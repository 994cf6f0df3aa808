//! MIME content type handling.

use crate::header::HeaderBlock;

/// Charset assumed when a content type names none.
pub const DEFAULT_CHARSET: &str = "utf-8";

/// The parts of a `Content-Type` value the decoder acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentTypeInfo {
    /// Lowercased `type/subtype`, empty when the header is absent.
    pub media_type: String,
    /// Charset parameter, [`DEFAULT_CHARSET`] when absent.
    pub charset: String,
    /// Boundary parameter; only ever set for `multipart/*` types.
    pub boundary: Option<String>,
}

impl Default for ContentTypeInfo {
    fn default() -> Self {
        Self {
            media_type: String::new(),
            charset: DEFAULT_CHARSET.to_string(),
            boundary: None,
        }
    }
}

impl ContentTypeInfo {
    /// Parses a `Content-Type` header value.
    ///
    /// Parsing never fails: unknown or malformed parameters are ignored,
    /// parameter names are matched case-insensitively, and the first
    /// occurrence of a parameter wins.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let (media_type, params) = value.split_once(';').unwrap_or((value, ""));
        let media_type = media_type.trim().to_ascii_lowercase();

        let mut charset = None;
        let mut boundary = None;
        for (name, value) in Parameters::new(params) {
            if value.is_empty() {
                continue;
            }
            match name.as_str() {
                "charset" if charset.is_none() => charset = Some(value),
                "boundary" if boundary.is_none() => boundary = Some(value),
                _ => {}
            }
        }

        if !media_type.starts_with("multipart/") {
            boundary = None;
        }

        Self {
            media_type,
            charset: charset.unwrap_or_else(|| DEFAULT_CHARSET.to_string()),
            boundary,
        }
    }

    /// Resolves the content type of a header block.
    ///
    /// An absent `Content-Type` yields the default: empty media type,
    /// `utf-8` charset.
    #[must_use]
    pub fn from_headers(headers: &HeaderBlock) -> Self {
        headers
            .get("content-type")
            .map_or_else(Self::default, Self::parse)
    }

    /// Checks if this is a multipart content type.
    #[must_use]
    pub fn is_multipart(&self) -> bool {
        self.media_type.starts_with("multipart/")
    }

    /// Checks if this is `text/plain`.
    #[must_use]
    pub fn is_text_plain(&self) -> bool {
        self.media_type == "text/plain"
    }

    /// Checks if this is `text/html`.
    #[must_use]
    pub fn is_text_html(&self) -> bool {
        self.media_type == "text/html"
    }
}

/// Tokenizer over the `; name=value` list that follows a media type.
///
/// Values are either a quoted string (backslash escapes honoured, an
/// unterminated quote runs to the end) or a token ending at `;`, `"` or
/// whitespace. Names are lowercased.
#[derive(Debug, Clone)]
pub struct Parameters<'a> {
    rest: &'a str,
}

impl<'a> Parameters<'a> {
    /// Creates a tokenizer over a parameter list.
    #[must_use]
    pub const fn new(params: &'a str) -> Self {
        Self { rest: params }
    }

    fn skip_separators(&mut self) {
        self.rest = self
            .rest
            .trim_start_matches(|c: char| c == ';' || c.is_whitespace());
    }

    fn quoted_value(&mut self) -> String {
        let mut value = String::new();
        let mut chars = self.rest.char_indices();
        let mut consumed = self.rest.len();

        while let Some((i, ch)) = chars.next() {
            match ch {
                '"' => {
                    consumed = i + 1;
                    break;
                }
                '\\' => {
                    if let Some((_, escaped)) = chars.next() {
                        value.push(escaped);
                    }
                }
                _ => value.push(ch),
            }
        }

        self.rest = &self.rest[consumed..];
        value
    }

    fn token_value(&mut self) -> String {
        let end = self
            .rest
            .find(|c: char| c == ';' || c == '"' || c.is_whitespace())
            .unwrap_or(self.rest.len());
        let value = self.rest[..end].to_string();
        self.rest = &self.rest[end..];
        value
    }
}

impl Iterator for Parameters<'_> {
    type Item = (String, String);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.skip_separators();
            if self.rest.is_empty() {
                return None;
            }

            let name_end = self.rest.find(['=', ';']).unwrap_or(self.rest.len());
            let name = self.rest[..name_end].trim().to_ascii_lowercase();
            self.rest = &self.rest[name_end..];

            // A bare attribute without '=' carries no value.
            let Some(after_eq) = self.rest.strip_prefix('=') else {
                continue;
            };
            self.rest = after_eq.trim_start();

            let value = if let Some(quoted) = self.rest.strip_prefix('"') {
                self.rest = quoted;
                self.quoted_value()
            } else {
                self.token_value()
            };

            if name.is_empty() {
                continue;
            }
            return Some((name, value));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::needless_collect)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_with_charset() {
        let ct = ContentTypeInfo::parse("text/plain; charset=utf-8");
        assert_eq!(ct.media_type, "text/plain");
        assert_eq!(ct.charset, "utf-8");
        assert!(ct.boundary.is_none());
        assert!(ct.is_text_plain());
    }

    #[test]
    fn test_parse_quoted_boundary() {
        let ct = ContentTypeInfo::parse("multipart/mixed; boundary=\"----=_Part_123\"");
        assert_eq!(ct.media_type, "multipart/mixed");
        assert_eq!(ct.boundary.as_deref(), Some("----=_Part_123"));
        assert_eq!(ct.charset, DEFAULT_CHARSET);
        assert!(ct.is_multipart());
    }

    #[test]
    fn test_parse_case_insensitive_names_and_type() {
        let ct = ContentTypeInfo::parse("Multipart/Alternative; BOUNDARY=abc; Charset=\"ISO-2022-JP\"");
        assert_eq!(ct.media_type, "multipart/alternative");
        assert_eq!(ct.boundary.as_deref(), Some("abc"));
        assert_eq!(ct.charset, "ISO-2022-JP");
    }

    #[test]
    fn test_parse_boundary_only_for_multipart() {
        let ct = ContentTypeInfo::parse("text/html; boundary=abc");
        assert!(ct.boundary.is_none());
        assert!(ct.is_text_html());
    }

    #[test]
    fn test_parse_quoted_value_with_spaces_and_escapes() {
        let ct = ContentTypeInfo::parse(r#"multipart/mixed; boundary="a b\"c""#);
        assert_eq!(ct.boundary.as_deref(), Some("a b\"c"));
    }

    #[test]
    fn test_parse_unterminated_quote() {
        let ct = ContentTypeInfo::parse("multipart/mixed; boundary=\"open");
        assert_eq!(ct.boundary.as_deref(), Some("open"));
    }

    #[test]
    fn test_parse_empty_and_missing() {
        let ct = ContentTypeInfo::parse("");
        assert_eq!(ct, ContentTypeInfo::default());

        let ct = ContentTypeInfo::from_headers(&HeaderBlock::new());
        assert_eq!(ct.media_type, "");
        assert_eq!(ct.charset, "utf-8");
    }

    #[test]
    fn test_parse_first_parameter_wins() {
        let ct = ContentTypeInfo::parse("text/plain; charset=us-ascii; charset=utf-8");
        assert_eq!(ct.charset, "us-ascii");
    }

    #[test]
    fn test_parameters_skip_junk() {
        let params: Vec<_> =
            Parameters::new("; format=flowed ;; delsp ; =x; charset = sjis").collect();
        assert_eq!(
            params,
            vec![
                ("format".to_string(), "flowed".to_string()),
                ("charset".to_string(), "sjis".to_string()),
            ]
        );
    }

    #[test]
    fn test_from_folded_header() {
        let headers = HeaderBlock::parse(
            b"Content-Type: multipart/alternative;\r\n\tboundary=\"inner\"\r\n",
        );
        let ct = ContentTypeInfo::from_headers(&headers);
        assert_eq!(ct.boundary.as_deref(), Some("inner"));
    }
}
