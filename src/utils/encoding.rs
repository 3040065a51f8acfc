//! Binary detection and text decoding
//!
//! UTF-8 is tried first; anything else goes through `chardetng` detection and
//! `encoding_rs` decoding, which substitutes malformed sequences instead of failing.

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};

/// Magic numbers of common binary formats.
const BINARY_SIGNATURES: &[&[u8]] = &[
    b"\x89PNG",     // PNG
    b"GIF8",        // GIF
    b"\xff\xd8",    // JPEG
    b"PK\x03\x04",  // ZIP/JAR/DOCX
    b"%PDF",        // PDF
];

/// Bytes inspected for NUL when sniffing.
const SNIFF_LEN: usize = 8000;

/// Minimum share of printable characters for decoded text to count as text.
const MIN_PRINTABLE_RATIO: f64 = 0.95;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    Text { text: String, encoding: &'static str },
    Binary,
}

/// True when the leading bytes look like binary data.
pub fn looks_binary(bytes: &[u8]) -> bool {
    if BINARY_SIGNATURES.iter().any(|sig| bytes.starts_with(sig)) {
        return true;
    }
    let head = &bytes[..bytes.len().min(SNIFF_LEN)];
    head.contains(&0)
}

/// Decode raw file bytes into text, or classify them as binary.
pub fn decode_bytes(bytes: &[u8]) -> Decoded {
    // A BOM wins over sniffing: UTF-16 text is full of NULs.
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return finish(text.into_owned(), encoding);
    }

    if looks_binary(bytes) {
        return Decoded::Binary;
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return finish(text.to_string(), UTF_8);
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, true);
    let (text, _) = encoding.decode_without_bom_handling(bytes);
    finish(text.into_owned(), encoding)
}

fn finish(text: String, encoding: &'static Encoding) -> Decoded {
    if !is_printable_text(&text) {
        return Decoded::Binary;
    }
    Decoded::Text { text, encoding: encoding.name() }
}

/// Share of printable characters (whitespace counts as printable,
/// replacement characters do not).
pub fn is_printable_text(text: &str) -> bool {
    let mut total = 0usize;
    let mut printable = 0usize;
    for c in text.chars() {
        total += 1;
        if c.is_whitespace() || (!c.is_control() && c != char::REPLACEMENT_CHARACTER) {
            printable += 1;
        }
    }
    if total == 0 {
        return true;
    }
    (printable as f64 / total as f64) >= MIN_PRINTABLE_RATIO
}
