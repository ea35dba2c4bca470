use std::borrow::Cow;

/// Capacity of the text buffer, terminator included.
pub const MAX_TEXT_SIZE: usize = 64;

// Longest text content, the last byte is kept for the terminator.
const MAX_TEXT_LEN: usize = MAX_TEXT_SIZE - 1;

/// A fixed-size, `NUL`-terminated text buffer.
///
/// Content longer than [`MAX_TEXT_SIZE`] `- 1` bytes is truncated, which
/// may split a multi-byte character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBuffer {
    bytes: [u8; MAX_TEXT_SIZE],
    len: usize,
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextBuffer {
    /// Creates an empty [`TextBuffer`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bytes: [0; MAX_TEXT_SIZE],
            len: 0,
        }
    }

    /// Stores `value`, replacing the current content.
    ///
    /// Only the bytes preceding the first `NUL` of `value` are considered,
    /// and at most [`MAX_TEXT_SIZE`] `- 1` of them are kept.
    ///
    /// Returns the number of stored bytes.
    pub fn store(&mut self, value: &str) -> usize {
        let value = value.as_bytes();
        let len = value
            .iter()
            .position(|&byte| byte == 0)
            .unwrap_or(value.len())
            .min(MAX_TEXT_LEN);

        self.bytes[..len].copy_from_slice(&value[..len]);
        self.bytes[len] = 0;
        self.len = len;

        len
    }

    /// Returns the content bytes, terminator excluded.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Returns the content bytes followed by the terminator.
    #[must_use]
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        &self.bytes[..=self.len]
    }

    /// Returns the content as text, replacing any truncated character.
    #[must_use]
    pub fn as_str_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.as_bytes())
    }

    /// Returns the content length in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Checks whether the buffer is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}
