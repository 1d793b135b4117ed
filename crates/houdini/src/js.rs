use crate::buffer::{Buffer, escape_grow_hint};
use crate::error::Result;
use crate::hex::{HEX_UPPER, parse_hex, utf8_encode};

const LINE_SEPARATOR: [u8; 3] = [0xE2, 0x80, 0xA8];
const PARAGRAPH_SEPARATOR: [u8; 3] = [0xE2, 0x80, 0xA9];

static JS_SPECIAL: [bool; 256] = {
    let mut t = [false; 256];
    let mut i = 0;
    while i < 0x20 {
        t[i] = true;
        i += 1;
    }
    t[0x7F] = true;
    t[b'\\' as usize] = true;
    t[b'"' as usize] = true;
    t[b'\'' as usize] = true;
    t[b'/' as usize] = true;
    t[LINE_SEPARATOR[0] as usize] = true;
    t
};

fn escape_at<'a>(
    src: &[u8],
    position: usize,
    scratch: &'a mut [u8; 6],
) -> Option<(&'a [u8], usize)> {
    let byte = src[position];
    let replacement: &'static [u8] = match byte {
        b'\\' => b"\\\\",
        b'"' => b"\\\"",
        b'\'' => b"\\'",
        b'\n' => b"\\n",
        b'\r' => b"\\r",
        b'\t' => b"\\t",
        0x08 => b"\\b",
        0x0B => b"\\v",
        0x0C => b"\\f",
        // keeps `</script>` from closing an inline script block
        b'/' if position > 0 && src[position - 1] == b'<' => b"\\/",
        0x00..=0x1F | 0x7F => {
            *scratch = *b"\\u00XX";
            scratch[4] = HEX_UPPER[(byte >> 4) as usize];
            scratch[5] = HEX_UPPER[(byte & 0x0F) as usize];
            return Some((&scratch[..], 1));
        }
        _ => {
            let sequence = src.get(position..position + 3)?;
            if sequence == LINE_SEPARATOR {
                return Some((&b"\\u2028"[..], 3));
            }
            if sequence == PARAGRAPH_SEPARATOR {
                return Some((&b"\\u2029"[..], 3));
            }
            return None;
        }
    };
    Some((replacement, 1))
}

pub fn escape_js(out: &mut Buffer, src: &[u8]) -> Result<bool> {
    out.rollback_on_error(|out| write_escaped(out, src))
}

fn write_escaped(out: &mut Buffer, src: &[u8]) -> Result<bool> {
    let mut last = 0;
    let mut position = 0;
    let mut changed = false;
    let mut scratch = [0u8; 6];

    while position < src.len() {
        if !JS_SPECIAL[src[position] as usize] {
            position += 1;
            continue;
        }

        let Some((replacement, consumed)) = escape_at(src, position, &mut scratch) else {
            position += 1;
            continue;
        };

        if !changed {
            out.grow(escape_grow_hint(src.len()))?;
            changed = true;
        }

        out.append(&src[last..position])?;
        out.append(replacement)?;
        position += consumed;
        last = position;
    }

    if !changed {
        return Ok(false);
    }

    out.append(&src[last..])?;
    Ok(true)
}

pub fn unescape_js(out: &mut Buffer, src: &[u8]) -> Result<bool> {
    out.rollback_on_error(|out| decode_escapes(out, src))
}

fn decode_escapes(out: &mut Buffer, src: &[u8]) -> Result<bool> {
    let mut last = 0;
    let mut position = 0;
    let mut changed = false;
    let mut scratch = [0u8; 4];

    while let Some(offset) = src[position..].iter().position(|&byte| byte == b'\\') {
        let backslash = position + offset;

        let Some((consumed, decoded)) = decode_escape(&src[backslash + 1..], &mut scratch) else {
            position = (backslash + 2).min(src.len());
            continue;
        };

        if !changed {
            out.grow(src.len())?;
            changed = true;
        }

        out.append(&src[last..backslash])?;
        out.append(decoded)?;
        position = backslash + 1 + consumed;
        last = position;
    }

    if !changed {
        return Ok(false);
    }

    out.append(&src[last..])?;
    Ok(true)
}

fn decode_escape<'a>(rest: &[u8], scratch: &'a mut [u8; 4]) -> Option<(usize, &'a [u8])> {
    let decoded: &'static [u8] = match *rest.first()? {
        b'n' => b"\n",
        b'r' => b"\r",
        b't' => b"\t",
        b'b' => b"\x08",
        b'v' => b"\x0B",
        b'f' => b"\x0C",
        b'0' => b"\0",
        b'\'' => b"'",
        b'"' => b"\"",
        b'\\' => b"\\",
        b'/' => b"/",
        b'x' => {
            let code_point = parse_hex(rest.get(1..3)?)?;
            return Some((3, utf8_encode(code_point, scratch)));
        }
        b'u' => {
            let (consumed, code_point) = decode_unicode_escape(&rest[1..])?;
            return Some((consumed + 1, utf8_encode(code_point, scratch)));
        }
        _ => return None,
    };
    Some((1, decoded))
}

// Lone surrogates are rejected and copied through as written.
fn decode_unicode_escape(rest: &[u8]) -> Option<(usize, u32)> {
    if rest.first() == Some(&b'{') {
        let close = rest.iter().take(8).position(|&byte| byte == b'}')?;
        let digits = &rest[1..close];
        if digits.is_empty() || digits.len() > 6 {
            return None;
        }
        let code_point = parse_hex(digits)?;
        char::from_u32(code_point)?;
        return Some((close + 1, code_point));
    }

    let high = parse_hex(rest.get(..4)?)?;
    match high {
        0xD800..=0xDBFF => {
            let tail = rest.get(4..10)?;
            if &tail[..2] != b"\\u" {
                return None;
            }
            let low = parse_hex(&tail[2..])?;
            if !(0xDC00..=0xDFFF).contains(&low) {
                return None;
            }
            let code_point = 0x1_0000 + ((high - 0xD800) << 10) + (low - 0xDC00);
            Some((10, code_point))
        }
        0xDC00..=0xDFFF => None,
        _ => Some((4, high)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn escape(input: &[u8]) -> Option<Vec<u8>> {
        let mut out = Buffer::new();
        escape_js(&mut out, input).unwrap().then(|| out.into_vec())
    }

    fn unescape(input: &[u8]) -> Option<Vec<u8>> {
        let mut out = Buffer::new();
        unescape_js(&mut out, input).unwrap().then(|| out.into_vec())
    }

    #[test]
    fn escapes_quotes_and_backslash() {
        assert_eq!(escape(b"a\"b").unwrap(), b"a\\\"b");
        assert_eq!(escape(b"it's").unwrap(), b"it\\'s");
        assert_eq!(escape(b"C:\\dir").unwrap(), b"C:\\\\dir");
    }

    #[test]
    fn escapes_line_terminators_and_controls() {
        assert_eq!(escape(b"a\nb\rc\td").unwrap(), b"a\\nb\\rc\\td");
        assert_eq!(escape(b"\x08\x0B\x0C").unwrap(), b"\\b\\v\\f");
        assert_eq!(escape(b"\0\x1B\x7F").unwrap(), b"\\u0000\\u001B\\u007F");
    }

    #[test]
    fn escapes_unicode_line_separators() {
        assert_eq!(escape("a\u{2028}b".as_bytes()).unwrap(), b"a\\u2028b");
        assert_eq!(escape("\u{2029}".as_bytes()).unwrap(), b"\\u2029");
    }

    #[test]
    fn other_three_byte_characters_pass_through() {
        assert_eq!(escape("€ ← …".as_bytes()), None);
        assert_eq!(escape(&[0xE2]), None);
        assert_eq!(escape(&[0xE2, 0x80]), None);
    }

    #[test]
    fn closing_script_tag_is_broken_up() {
        assert_eq!(
            escape(b"</script>").unwrap(),
            b"<\\/script>"
        );
        assert_eq!(escape(b"a/b"), None);
    }

    #[test]
    fn plain_text_is_unchanged() {
        assert_eq!(escape(b"hello world"), None);
        assert_eq!(unescape(b"hello world"), None);
    }

    #[test]
    fn unescapes_escaped_quote() {
        assert_eq!(unescape(b"a\\\"b").unwrap(), b"a\"b");
    }

    #[test]
    fn unescapes_single_character_escapes() {
        assert_eq!(
            unescape(b"\\n\\r\\t\\b\\v\\f\\0\\'\\\"\\\\\\/").unwrap(),
            b"\n\r\t\x08\x0B\x0C\0'\"\\/"
        );
    }

    #[test]
    fn unescapes_hex_and_unicode() {
        assert_eq!(unescape(b"\\x41\\u0042").unwrap(), b"AB");
        assert_eq!(unescape(b"\\u00e9").unwrap(), "é".as_bytes());
        assert_eq!(unescape(b"\\u{1F600}").unwrap(), "😀".as_bytes());
        assert_eq!(unescape(b"\\uD83D\\uDE00").unwrap(), "😀".as_bytes());
    }

    #[test]
    fn lone_surrogates_pass_through() {
        assert_eq!(unescape(b"\\uD83D"), None);
        assert_eq!(unescape(b"\\uDE00x"), None);
        assert_eq!(unescape(b"\\uD83Dabcdef"), None);
        assert_eq!(unescape(b"\\u{D800}"), None);
    }

    #[test]
    fn malformed_escapes_pass_through() {
        assert_eq!(unescape(b"\\q"), None);
        assert_eq!(unescape(b"\\x4"), None);
        assert_eq!(unescape(b"\\xZZ"), None);
        assert_eq!(unescape(b"\\u12"), None);
        assert_eq!(unescape(b"\\u{}"), None);
        assert_eq!(unescape(b"\\u{1234567}"), None);
        assert_eq!(unescape(b"\\u{110000}"), None);
        assert_eq!(unescape(b"trailing\\"), None);
    }

    #[test]
    fn unrecognized_escape_does_not_swallow_next_escape() {
        assert_eq!(unescape(b"\\q\\n").unwrap(), b"\\q\n");
    }

    #[test]
    fn escaped_backslash_before_letter_is_not_reinterpreted() {
        assert_eq!(unescape(b"\\\\n").unwrap(), b"\\n");
    }

    #[test]
    fn round_trip_keeps_crlf() {
        let input = b"line1\r\nline2\0";
        let escaped = escape(input).unwrap();
        assert_eq!(unescape(&escaped).unwrap(), input);
    }
}
