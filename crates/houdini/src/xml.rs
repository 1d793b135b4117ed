use crate::buffer::{Buffer, escape_bytes};
use crate::error::Result;

static XML_ESCAPES: [&[u8]; 5] = [b"", b"&amp;", b"&lt;", b"&gt;", b"&quot;"];

static XML_ESCAPE_TABLE: [u8; 256] = {
    let mut t = [0u8; 256];
    t[b'&' as usize] = 1;
    t[b'<' as usize] = 2;
    t[b'>' as usize] = 3;
    t[b'"' as usize] = 4;
    t
};

pub fn escape_xml(out: &mut Buffer, src: &[u8]) -> Result<bool> {
    escape_bytes(
        out,
        src,
        |byte| XML_ESCAPE_TABLE[byte as usize] != 0,
        |out, byte| out.append(XML_ESCAPES[XML_ESCAPE_TABLE[byte as usize] as usize]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn escape(input: &str) -> Option<String> {
        let mut out = Buffer::new();
        escape_xml(&mut out, input.as_bytes())
            .unwrap()
            .then(|| String::from_utf8(out.into_vec()).unwrap())
    }

    #[test]
    fn escapes_reserved_characters() {
        assert_eq!(
            escape("<a href=\"x\">R&D</a>").as_deref(),
            Some("&lt;a href=&quot;x&quot;&gt;R&amp;D&lt;/a&gt;")
        );
    }

    #[test]
    fn apostrophe_and_backtick_are_left_alone() {
        assert_eq!(escape("it's `fine`"), None);
    }

    #[test]
    fn plain_text_is_unchanged() {
        assert_eq!(escape("hello world"), None);
    }

    #[test]
    fn escapes_at_both_ends() {
        assert_eq!(escape("&middle&").as_deref(), Some("&amp;middle&amp;"));
    }
}
