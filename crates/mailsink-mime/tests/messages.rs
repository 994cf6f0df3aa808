//! End-to-end decoding of complete inbound messages.

use mailsink_mime::{
    DecodeOptions, DecodedContent, Fallback, extract, extract_body, extract_with,
};

#[test]
fn test_nested_alternative_inside_mixed() {
    let raw = concat!(
        "From: sender@example.com\r\n",
        "To: alice@example.org\r\n",
        "Subject: Nested\r\n",
        "MIME-Version: 1.0\r\n",
        "Content-Type: multipart/mixed;\r\n",
        "\tboundary=\"outer-1\"\r\n",
        "\r\n",
        "This is a multi-part message in MIME format.\r\n",
        "--outer-1\r\n",
        "Content-Type: multipart/alternative; boundary=\"inner-2\"\r\n",
        "\r\n",
        "--inner-2\r\n",
        "Content-Type: text/plain; charset=\"utf-8\"\r\n",
        "Content-Transfer-Encoding: 7bit\r\n",
        "\r\n",
        "hello\r\n",
        "--inner-2\r\n",
        "Content-Type: text/html; charset=\"utf-8\"\r\n",
        "\r\n",
        "<p>hello</p>\r\n",
        "--inner-2--\r\n",
        "--outer-1\r\n",
        "Content-Type: image/png; name=\"dot.png\"\r\n",
        "Content-Transfer-Encoding: base64\r\n",
        "Content-Disposition: attachment\r\n",
        "\r\n",
        "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==\r\n",
        "--outer-1--\r\n",
    );

    let decoded = extract_with(raw.as_bytes(), &DecodeOptions::default());
    assert!(decoded.is_clean(), "{:?}", decoded.fallbacks);
    assert_eq!(decoded.value.subject, "Nested");
    assert_eq!(decoded.value.body_text.as_deref(), Some("hello"));
    assert_eq!(decoded.value.body_html.as_deref(), Some("<p>hello</p>"));
}

#[test]
fn test_shift_jis_base64_body() {
    let raw = concat!(
        "Subject: =?Shift_JIS?B?g2WDWINn?=\n",
        "Content-Type: text/plain; charset=SHIFT_JIS\n",
        "Content-Transfer-Encoding: base64\n",
        "\n",
        "grGC8YLJgr+CzYFBkKKKRQ==\n",
    );
    let message = extract(raw.as_bytes());
    assert_eq!(message.subject, "テスト");
    assert_eq!(message.body_text.as_deref(), Some("こんにちは、世界"));
}

#[test]
fn test_sjis_alias_body() {
    let raw = concat!(
        "Content-Type: text/plain; charset=sjis\n",
        "Content-Transfer-Encoding: base64\n",
        "\n",
        "grGC8YLJgr+CzYFBkKKKRQ==\n",
    );
    assert_eq!(extract(raw.as_bytes()).body_text.as_deref(), Some("こんにちは、世界"));
}

#[test]
fn test_euc_jp_inside_multipart() {
    let raw = concat!(
        "Content-Type: multipart/alternative; boundary=zz\n",
        "\n",
        "--zz\n",
        "Content-Type: text/plain; charset=x-euc-jp\n",
        "Content-Transfer-Encoding: base64\n",
        "\n",
        "pLOk86TLpMGkz6GiwKSzpg==\n",
        "--zz--\n",
    );
    assert_eq!(extract(raw.as_bytes()).body_text.as_deref(), Some("こんにちは、世界"));
}

#[test]
fn test_iso_2022_jp_7bit_body_and_subject() {
    let mut raw = b"Subject: =?ISO-2022-JP?B?GyRCN29MPiVGJTklSBsoQg==?=\r\n\
Content-Type: text/plain; charset=ISO-2022-JP\r\n\
Content-Transfer-Encoding: 7bit\r\n\r\n"
        .to_vec();
    raw.extend_from_slice(b"\x1b$B$3$s$K$A$O!\"@$3&\x1b(B\r\n");

    let decoded = extract_with(&raw, &DecodeOptions::default());
    assert!(decoded.is_clean(), "{:?}", decoded.fallbacks);
    assert_eq!(decoded.value.subject, "件名テスト");
    assert_eq!(decoded.value.body_text.as_deref(), Some("こんにちは、世界"));
}

#[test]
fn test_quoted_printable_html() {
    let raw = concat!(
        "Content-Type: text/html; charset=UTF-8\r\n",
        "Content-Transfer-Encoding: quoted-printable\r\n",
        "\r\n",
        "<p>Gr=C3=BC=C3=9Fe aus M=\r\n",
        "=C3=BCnchen</p>\r\n",
    );
    let message = extract(raw.as_bytes());
    assert_eq!(message.body_text, None);
    assert_eq!(message.body_html.as_deref(), Some("<p>Grüße aus München</p>"));
}

#[test]
fn test_latin1_8bit_body() {
    let raw = b"Content-Type: text/plain; charset=iso-8859-1\nContent-Transfer-Encoding: 8bit\n\nCaf\xe9 cr\xe8me\n";
    assert_eq!(extract(raw).body_text.as_deref(), Some("Café crème"));
}

#[test]
fn test_unknown_charset_keeps_bytes() {
    let raw = b"Content-Type: text/plain; charset=x-klingon\n\nQ\xe1pla\xff\n";
    let decoded = extract_with(raw, &DecodeOptions::default());
    assert_eq!(decoded.value.body_text.as_deref(), Some("Q\u{e1}pla\u{ff}"));
    assert_eq!(
        decoded.fallbacks,
        vec![Fallback::UnsupportedCharset {
            label: "x-klingon".to_string()
        }]
    );
}

#[test]
fn test_broken_base64_part_does_not_fail_message() {
    let raw = concat!(
        "Subject: Broken\n",
        "Content-Type: multipart/alternative; boundary=b\n",
        "\n",
        "--b\n",
        "Content-Type: text/plain\n",
        "Content-Transfer-Encoding: base64\n",
        "\n",
        "@@ not base64 @@\n",
        "--b\n",
        "Content-Type: text/html\n",
        "\n",
        "<p>fine</p>\n",
        "--b--\n",
    );
    let decoded = extract_with(raw.as_bytes(), &DecodeOptions::default());
    assert_eq!(decoded.value.body_text.as_deref(), Some("@@ not base64 @@"));
    assert_eq!(decoded.value.body_html.as_deref(), Some("<p>fine</p>"));
    assert!(matches!(
        decoded.fallbacks.as_slice(),
        [Fallback::TransferDecode { .. }]
    ));
}

#[test]
fn test_mixed_line_endings() {
    let raw = "Subject: Mixed\r\nContent-Type: text/plain\n\nline one\r\nline two\n";
    let message = extract(raw.as_bytes());
    assert_eq!(message.subject, "Mixed");
    assert_eq!(message.body_text.as_deref(), Some("line one\r\nline two"));
}

#[test]
fn test_repeated_subject_first_wins() {
    let raw = "Subject: first\nSubject: second\n\nbody";
    assert_eq!(extract(raw.as_bytes()).subject, "first");
}

#[test]
fn test_subject_with_one_bad_encoded_word() {
    let raw = "Subject: =?UTF-8?B?###?= / =?UTF-8?B?5pel5pys6Kqe?=\n\nbody";
    let decoded = extract_with(raw.as_bytes(), &DecodeOptions::default());
    assert_eq!(decoded.value.subject, "=?UTF-8?B?###?= / 日本語");
    assert_eq!(
        decoded.fallbacks,
        vec![Fallback::EncodedWord {
            token: "=?UTF-8?B?###?=".to_string()
        }]
    );
}

#[test]
fn test_headerless_message() {
    let raw = "Just a blob of text that never separates headers";
    let message = extract(raw.as_bytes());
    assert_eq!(message.body_text.as_deref(), Some(raw));
    assert_eq!(message.body_html, None);
    assert_eq!(message.subject, "(no subject)");
    assert_eq!(message.date, None);
}

#[test]
fn test_combined_body_falls_back_to_raw() {
    let raw = concat!(
        "Content-Type: multipart/mixed; boundary=only-attachments\n",
        "\n",
        "--only-attachments\n",
        "Content-Type: application/octet-stream\n",
        "\n",
        "AAAA\n",
        "--only-attachments--\n",
    );
    let body = extract_body(raw.as_bytes());
    assert!(body.starts_with("--only-attachments\n"));

    let message = extract(raw.as_bytes());
    assert_eq!(
        DecodedContent {
            text: message.body_text,
            html: message.body_html,
        },
        DecodedContent::default()
    );
}

#[test]
fn test_depth_cap_from_options() {
    let raw = concat!(
        "Content-Type: multipart/mixed; boundary=l1\n",
        "\n",
        "--l1\n",
        "Content-Type: multipart/mixed; boundary=l2\n",
        "\n",
        "--l2\n",
        "Content-Type: text/plain\n",
        "\n",
        "deep\n",
        "--l2--\n",
        "--l1--\n",
    );
    let shallow = DecodeOptions::builder().max_depth(1).build();
    let decoded = extract_with(raw.as_bytes(), &shallow);
    assert!(matches!(
        decoded.fallbacks.as_slice(),
        [Fallback::DepthLimit { depth: 1 }]
    ));

    let decoded = extract_with(raw.as_bytes(), &DecodeOptions::default());
    assert!(decoded.is_clean());
    assert_eq!(decoded.value.body_text.as_deref(), Some("deep"));
}

#[cfg(feature = "serde")]
#[test]
fn test_serialized_shape() {
    let message = extract(b"Subject: Hi\nDate: Mon, 7 Oct 2024 09:00:00 +0900\n\nbody\n");
    let json = serde_json::to_value(&message).unwrap();
    assert_eq!(json["subject"], "Hi");
    assert_eq!(json["date"], "Mon, 7 Oct 2024 09:00:00 +0900");
    assert_eq!(json["body_text"], "body");
    assert!(json["body_html"].is_null());
}
