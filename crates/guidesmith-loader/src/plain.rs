//! Plain-text decoding

use crate::LoadError;

const BOM: char = '\u{feff}';

/// Decode UTF-8, drop a leading BOM and normalize line endings to `\n`
pub(crate) fn decode(bytes: &[u8]) -> Result<String, LoadError> {
    let text = std::str::from_utf8(bytes).map_err(|e| {
        LoadError::CorruptDocument(format!(
            "text is not valid UTF-8 (byte {})",
            e.valid_up_to()
        ))
    })?;

    let text = text.strip_prefix(BOM).unwrap_or(text);
    Ok(text.replace("\r\n", "\n").replace('\r', "\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_bom() {
        let bytes = "\u{feff}Font: Arial".as_bytes();
        assert_eq!(decode(bytes).unwrap(), "Font: Arial");
    }

    #[test]
    fn test_normalizes_line_endings() {
        assert_eq!(decode(b"a\r\nb\rc\n").unwrap(), "a\nb\nc\n");
    }

    #[test]
    fn test_keeps_non_ascii() {
        let text = "Police : Garamond, corps 12, interligne 1,5 (marges ±2 cm)";
        assert_eq!(decode(text.as_bytes()).unwrap(), text);
    }

    #[test]
    fn test_invalid_utf8() {
        let err = decode(&[b'o', b'k', 0xFF, 0xFE]).unwrap_err();
        match err {
            LoadError::CorruptDocument(msg) => assert!(msg.contains("byte 2")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(decode(b"").unwrap(), "");
    }
}
