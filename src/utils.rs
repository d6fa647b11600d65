use std::borrow::Cow;

use encoding_rs::WINDOWS_1252;

/// Decodes tool output as UTF-8, falling back to Windows-1252 (Latin-1
/// superset) when the bytes are not valid UTF-8.
pub fn decode_best_effort(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(s) => Cow::Borrowed(s),
        Err(_) => {
            let (res, _, _) = WINDOWS_1252.decode(bytes);
            res
        }
    }
}

/// Strips a trailing `\n` or `\r\n`.
pub fn trim_newline(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_passes_through() {
        assert_eq!(decode_best_effort("Caf\u{e9}".as_bytes()), "Caf\u{e9}");
    }

    #[test]
    fn latin1_falls_back() {
        assert_eq!(decode_best_effort(&[0x43, 0x61, 0x66, 0xE9]), "Caf\u{e9}");
    }

    #[test]
    fn newline_variants() {
        assert_eq!(trim_newline("{ready}\n"), "{ready}");
        assert_eq!(trim_newline("{ready}\r\n"), "{ready}");
        assert_eq!(trim_newline("{ready}"), "{ready}");
    }
}
