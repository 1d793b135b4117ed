use crate::buffer::{Buffer, escape_bytes};
use crate::entities;
use crate::error::Result;
use crate::hex::{hex_value, utf8_encode};

static HTML_ESCAPES: [&[u8]; 7] = [
    b"",
    b"&quot;",
    b"&amp;",
    b"&lt;",
    b"&gt;",
    b"&#39;",
    b"&#96;",
];

const SECURE_ONLY: u8 = 5;

static HTML_ESCAPE_TABLE: [u8; 256] = {
    let mut t = [0u8; 256];
    t[b'"' as usize] = 1;
    t[b'&' as usize] = 2;
    t[b'<' as usize] = 3;
    t[b'>' as usize] = 4;
    t[b'\'' as usize] = 5;
    t[b'`' as usize] = 6;
    t
};

const MAX_NUMERIC_DIGITS: usize = 8;

pub fn escape_html(out: &mut Buffer, src: &[u8], secure: bool) -> Result<bool> {
    let class = |byte: u8| HTML_ESCAPE_TABLE[byte as usize];
    escape_bytes(
        out,
        src,
        |byte| class(byte) != 0 && (secure || class(byte) < SECURE_ONLY),
        |out, byte| out.append(HTML_ESCAPES[class(byte) as usize]),
    )
}

pub fn unescape_html(out: &mut Buffer, src: &[u8]) -> Result<bool> {
    out.rollback_on_error(|out| decode_references(out, src))
}

fn decode_references(out: &mut Buffer, src: &[u8]) -> Result<bool> {
    let mut last = 0;
    let mut position = 0;
    let mut changed = false;
    let mut scratch = [0u8; 4];

    while let Some(offset) = src[position..].iter().position(|&byte| byte == b'&') {
        let ampersand = position + offset;
        let rest = &src[ampersand + 1..];

        let Some((consumed, decoded)) = decode_reference(rest, &mut scratch) else {
            position = ampersand + 1;
            continue;
        };

        if !changed {
            out.grow(src.len())?;
            changed = true;
        }

        out.append(&src[last..ampersand])?;
        out.append(decoded)?;
        position = ampersand + 1 + consumed;
        last = position;
    }

    if !changed {
        return Ok(false);
    }

    out.append(&src[last..])?;
    Ok(true)
}

fn decode_reference<'a>(rest: &[u8], scratch: &'a mut [u8; 4]) -> Option<(usize, &'a [u8])> {
    if rest.first() == Some(&b'#') {
        let (consumed, code_point) = parse_numeric(&rest[1..])?;
        let code_point = if code_point == 0 { 0xFFFD } else { code_point };
        return Some((consumed + 1, utf8_encode(code_point, scratch)));
    }

    let name_len = rest
        .iter()
        .take(entities::MAX_NAME_LEN + 1)
        .take_while(|byte| byte.is_ascii_alphanumeric())
        .count();

    if name_len == 0 || name_len > entities::MAX_NAME_LEN || rest.get(name_len) != Some(&b';') {
        return None;
    }

    entities::lookup(&rest[..name_len]).map(|value| (name_len + 1, value))
}

// At most eight digits, so the value always fits in a `u32`.
fn parse_numeric(digits: &[u8]) -> Option<(usize, u32)> {
    let (prefix, radix) = match digits.first() {
        Some(b'x' | b'X') => (1, 16),
        _ => (0, 10),
    };

    let body = &digits[prefix..];
    let count = body
        .iter()
        .take(MAX_NUMERIC_DIGITS + 1)
        .take_while(|&&byte| match radix {
            16 => hex_value(byte).is_some(),
            _ => byte.is_ascii_digit(),
        })
        .count();

    if count == 0 || count > MAX_NUMERIC_DIGITS || body.get(count) != Some(&b';') {
        return None;
    }

    let code_point = body[..count].iter().fold(0u32, |acc, &byte| {
        let digit = match radix {
            16 => u32::from(hex_value(byte).unwrap_or(0)),
            _ => u32::from(byte - b'0'),
        };
        acc * radix + digit
    });

    Some((prefix + count + 1, code_point))
}
