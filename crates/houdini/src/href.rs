use crate::buffer::{Buffer, escape_bytes};
use crate::error::Result;
use crate::hex::percent_encoded;
use crate::uri::safe_table;

// `%` is safe so links that are already encoded are not encoded twice.
static HREF_SAFE: [bool; 256] = safe_table(&[b"-_.~", b"/:?#[]@!$()*+,;=%"]);

pub fn escape_href(out: &mut Buffer, src: &[u8]) -> Result<bool> {
    escape_bytes(
        out,
        src,
        |byte| !HREF_SAFE[byte as usize],
        |out, byte| match byte {
            b'&' => out.append(b"&amp;"),
            b'\'' => out.append(b"&#x27;"),
            _ => out.append(&percent_encoded(byte)),
        },
    )
}
