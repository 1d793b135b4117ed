use crate::error::{HoudiniError, Result};

const MIN_CAPACITY: usize = 64;

pub(crate) fn escape_grow_hint(input_len: usize) -> usize {
    input_len.saturating_mul(12) / 10
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Buffer {
    bytes: Vec<u8>,
}

impl Buffer {
    pub fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut buffer = Self::new();
        buffer.grow(capacity)?;
        Ok(buffer)
    }

    pub fn grow(&mut self, extra: usize) -> Result<()> {
        let needed = self
            .bytes
            .len()
            .checked_add(extra)
            .ok_or(HoudiniError::OutOfMemory { requested: extra })?;

        if needed <= self.bytes.capacity() {
            return Ok(());
        }

        let target = needed
            .max(self.bytes.capacity().saturating_mul(2))
            .max(MIN_CAPACITY);

        self.bytes
            .try_reserve_exact(target - self.bytes.len())
            .or_else(|_| self.bytes.try_reserve_exact(extra))
            .map_err(|_| HoudiniError::OutOfMemory { requested: extra })
    }

    pub fn append(&mut self, data: &[u8]) -> Result<()> {
        self.grow(data.len())?;
        self.bytes.extend_from_slice(data);
        Ok(())
    }

    pub fn push(&mut self, byte: u8) -> Result<()> {
        self.grow(1)?;
        self.bytes.push(byte);
        Ok(())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.bytes.capacity()
    }

    pub fn truncate(&mut self, len: usize) {
        self.bytes.truncate(len);
    }

    pub fn free(&mut self) {
        self.bytes = Vec::new();
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }

    /// Runs `write` and truncates back to the current length if it fails.
    pub(crate) fn rollback_on_error<T>(
        &mut self,
        write: impl FnOnce(&mut Buffer) -> Result<T>,
    ) -> Result<T> {
        let mark = self.bytes.len();
        let outcome = write(self);
        if outcome.is_err() {
            self.truncate(mark);
        }
        outcome
    }
}

/// Copies `src` into `out`, handing each byte that `needs_escape` flags to
/// `escape` instead. Nothing is written when no byte is flagged.
pub(crate) fn escape_bytes(
    out: &mut Buffer,
    src: &[u8],
    needs_escape: impl Fn(u8) -> bool,
    mut escape: impl FnMut(&mut Buffer, u8) -> Result<()>,
) -> Result<bool> {
    let Some(first) = src.iter().position(|&byte| needs_escape(byte)) else {
        return Ok(false);
    };

    out.rollback_on_error(|out| {
        out.grow(escape_grow_hint(src.len()))?;

        let mut last = 0;
        for (position, &byte) in src.iter().enumerate().skip(first) {
            if !needs_escape(byte) {
                continue;
            }
            out.append(&src[last..position])?;
            escape(out, byte)?;
            last = position + 1;
        }

        out.append(&src[last..])?;
        Ok(true)
    })
}

impl AsRef<[u8]> for Buffer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<Buffer> for Vec<u8> {
    fn from(buffer: Buffer) -> Self {
        buffer.bytes
    }
}
