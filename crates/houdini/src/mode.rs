use std::borrow::Cow;
use std::fmt;

use log::trace;
use rayon::prelude::*;
use serde::Serialize;

use crate::buffer::Buffer;
use crate::error::Result;
use crate::{href, html, js, uri, xml};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    EscapeHtml { secure: bool },
    UnescapeHtml,
    EscapeXml,
    EscapeUri,
    EscapeUrl,
    EscapeHref,
    UnescapeUri,
    UnescapeUrl,
    EscapeJs,
    UnescapeJs,
}

impl Mode {
    pub const ALL: [Mode; 10] = [
        Mode::EscapeHtml { secure: true },
        Mode::UnescapeHtml,
        Mode::EscapeXml,
        Mode::EscapeUri,
        Mode::EscapeUrl,
        Mode::EscapeHref,
        Mode::UnescapeUri,
        Mode::UnescapeUrl,
        Mode::EscapeJs,
        Mode::UnescapeJs,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Mode::EscapeHtml { .. } => "escape_html",
            Mode::UnescapeHtml => "unescape_html",
            Mode::EscapeXml => "escape_xml",
            Mode::EscapeUri => "escape_uri",
            Mode::EscapeUrl => "escape_url",
            Mode::EscapeHref => "escape_href",
            Mode::UnescapeUri => "unescape_uri",
            Mode::UnescapeUrl => "unescape_url",
            Mode::EscapeJs => "escape_js",
            Mode::UnescapeJs => "unescape_js",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::EscapeHtml { secure: false } => write!(formatter, "escape_html -unsecure"),
            mode => formatter.write_str(mode.name()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transformed {
    Unchanged,
    Changed(Vec<u8>),
}

impl Transformed {
    pub fn is_changed(&self) -> bool {
        matches!(self, Transformed::Changed(_))
    }

    pub fn into_cow(self, input: &[u8]) -> Cow<'_, [u8]> {
        match self {
            Transformed::Unchanged => Cow::Borrowed(input),
            Transformed::Changed(bytes) => Cow::Owned(bytes),
        }
    }
}

pub fn transform_into(mode: Mode, out: &mut Buffer, src: &[u8]) -> Result<bool> {
    let outcome = match mode {
        Mode::EscapeHtml { secure } => html::escape_html(out, src, secure),
        Mode::UnescapeHtml => html::unescape_html(out, src),
        Mode::EscapeXml => xml::escape_xml(out, src),
        Mode::EscapeUri => uri::escape_uri(out, src),
        Mode::EscapeUrl => uri::escape_url(out, src),
        Mode::EscapeHref => href::escape_href(out, src),
        Mode::UnescapeUri => uri::unescape_uri(out, src),
        Mode::UnescapeUrl => uri::unescape_url(out, src),
        Mode::EscapeJs => js::escape_js(out, src),
        Mode::UnescapeJs => js::unescape_js(out, src),
    };

    trace!(
        "{mode}: {} input bytes, changed={:?}",
        src.len(),
        outcome.as_ref().ok()
    );

    outcome
}

pub fn transform(mode: Mode, src: &[u8]) -> Result<Transformed> {
    let mut out = Buffer::new();
    if transform_into(mode, &mut out, src)? {
        Ok(Transformed::Changed(out.into_vec()))
    } else {
        Ok(Transformed::Unchanged)
    }
}

pub fn transform_batch(mode: Mode, inputs: &[&[u8]]) -> Result<Vec<Transformed>> {
    inputs
        .par_iter()
        .map(|input| transform(mode, input))
        .collect()
}
