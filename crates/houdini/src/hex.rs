pub(crate) static HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

const INVALID: u8 = 0xFF;

static HEX_VALUE: [u8; 256] = {
    let mut t = [INVALID; 256];
    let mut i = 0u8;
    while i < 10 {
        t[(b'0' + i) as usize] = i;
        i += 1;
    }
    let mut i = 0u8;
    while i < 6 {
        t[(b'a' + i) as usize] = 10 + i;
        t[(b'A' + i) as usize] = 10 + i;
        i += 1;
    }
    t
};

#[inline]
pub(crate) fn hex_value(byte: u8) -> Option<u8> {
    match HEX_VALUE[byte as usize] {
        INVALID => None,
        value => Some(value),
    }
}

pub(crate) fn parse_hex(digits: &[u8]) -> Option<u32> {
    digits.iter().try_fold(0u32, |acc, &byte| {
        hex_value(byte).map(|value| (acc << 4) | u32::from(value))
    })
}

#[inline]
pub(crate) fn percent_encoded(byte: u8) -> [u8; 3] {
    [
        b'%',
        HEX_UPPER[(byte >> 4) as usize],
        HEX_UPPER[(byte & 0x0F) as usize],
    ]
}

// Invalid scalar values become U+FFFD.
pub(crate) fn utf8_encode(code_point: u32, scratch: &mut [u8; 4]) -> &[u8] {
    let character = char::from_u32(code_point).unwrap_or(char::REPLACEMENT_CHARACTER);
    character.encode_utf8(scratch).as_bytes()
}
