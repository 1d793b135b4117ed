use crate::buffer::{Buffer, escape_bytes};
use crate::error::Result;
use crate::hex::{hex_value, percent_encoded};

const UNRESERVED: &[u8] = b"-_.~";
const RESERVED: &[u8] = b"/:?#[]@!$&'()*+,;=";

pub(crate) const fn safe_table(sets: &[&[u8]]) -> [bool; 256] {
    let mut t = [false; 256];
    let mut i = b'A';
    while i <= b'Z' {
        t[i as usize] = true;
        t[(i + 32) as usize] = true;
        i += 1;
    }
    let mut i = b'0';
    while i <= b'9' {
        t[i as usize] = true;
        i += 1;
    }
    let mut set = 0;
    while set < sets.len() {
        let mut j = 0;
        while j < sets[set].len() {
            t[sets[set][j] as usize] = true;
            j += 1;
        }
        set += 1;
    }
    t
}

static URI_SAFE: [bool; 256] = safe_table(&[UNRESERVED, RESERVED]);
static URL_SAFE: [bool; 256] = safe_table(&[UNRESERVED]);

fn escape_with(out: &mut Buffer, src: &[u8], safe: &[bool; 256]) -> Result<bool> {
    escape_bytes(
        out,
        src,
        |byte| !safe[byte as usize],
        |out, byte| out.append(&percent_encoded(byte)),
    )
}

fn unescape_percent(out: &mut Buffer, src: &[u8]) -> Result<bool> {
    out.rollback_on_error(|out| decode_percent(out, src))
}

fn decode_percent(out: &mut Buffer, src: &[u8]) -> Result<bool> {
    let mut last = 0;
    let mut position = 0;
    let mut changed = false;

    while let Some(offset) = src[position..].iter().position(|&byte| byte == b'%') {
        let percent = position + offset;
        let decoded = match (src.get(percent + 1), src.get(percent + 2)) {
            (Some(&high), Some(&low)) => hex_value(high).zip(hex_value(low)),
            _ => None,
        };

        let Some((high, low)) = decoded else {
            position = percent + 1;
            continue;
        };

        if !changed {
            out.grow(src.len())?;
            changed = true;
        }

        out.append(&src[last..percent])?;
        out.push((high << 4) | low)?;
        position = percent + 3;
        last = position;
    }

    if !changed {
        return Ok(false);
    }

    out.append(&src[last..])?;
    Ok(true)
}

pub fn escape_uri(out: &mut Buffer, src: &[u8]) -> Result<bool> {
    escape_with(out, src, &URI_SAFE)
}

pub fn escape_url(out: &mut Buffer, src: &[u8]) -> Result<bool> {
    escape_with(out, src, &URL_SAFE)
}

pub fn unescape_uri(out: &mut Buffer, src: &[u8]) -> Result<bool> {
    unescape_percent(out, src)
}

pub fn unescape_url(out: &mut Buffer, src: &[u8]) -> Result<bool> {
    unescape_percent(out, src)
}
