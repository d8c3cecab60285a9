//! Permissive decoding for text previews

use encoding_rs::Encoding;

/// Decode preview bytes with the encoding named by `label`.
///
/// Undecodable bytes are dropped rather than replaced. The preview is cut at
/// a byte cap, so a trailing partial character simply disappears. Unknown
/// labels fall back to UTF-8.
pub fn decode_preview(bytes: &[u8], label: &str) -> String {
    let encoding = Encoding::for_label(label.trim().as_bytes()).unwrap_or_else(|| {
        tracing::warn!("Unknown preview encoding {:?}, using UTF-8", label);
        encoding_rs::UTF_8
    });

    if encoding == encoding_rs::UTF_8 {
        return decode_utf8_ignoring_errors(bytes);
    }

    let (decoded, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        decoded.chars().filter(|&c| c != char::REPLACEMENT_CHARACTER).collect()
    } else {
        decoded.into_owned()
    }
}

fn decode_utf8_ignoring_errors(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_utf8_passes_through() {
        assert_eq!(decode_preview("Hello, 世界!".as_bytes(), "utf-8"), "Hello, 世界!");
    }

    #[test]
    fn test_invalid_bytes_are_dropped() {
        let bytes = b"ab\xffcd\xfe";
        assert_eq!(decode_preview(bytes, "utf-8"), "abcd");
    }

    #[test]
    fn test_truncated_trailing_character() {
        // "é" is 0xC3 0xA9; cut after the first byte
        let bytes = b"caf\xc3";
        assert_eq!(decode_preview(bytes, "utf-8"), "caf");
    }

    #[test]
    fn test_legacy_encoding_label() {
        // "テスト" in Shift_JIS
        let bytes = [0x83, 0x65, 0x83, 0x58, 0x83, 0x67];
        assert_eq!(decode_preview(&bytes, "shift_jis"), "テスト");
    }

    #[test]
    fn test_unknown_label_falls_back_to_utf8() {
        assert_eq!(decode_preview(b"plain", "no-such-encoding"), "plain");
    }
}
