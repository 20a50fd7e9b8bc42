//! Cache key encoding for extraction functions.
//!
//! A cache key is the variant's reserved tag byte followed by the UTF-8 bytes
//! of its declarative configuration. There is no separator, length prefix or
//! padding, so two processes configured with the same text produce the same
//! bytes.

/// Reserved cache tag bytes, one per extraction function variant
pub mod cache_type_id {
    pub const REGEX: u8 = 0x1;
    pub const PARTIAL: u8 = 0x2;
    pub const JAVASCRIPT: u8 = 0x4;
    pub const PYTHON: u8 = 0x5;

    /// Every reserved tag; must stay pairwise distinct
    pub const ALL: &[u8] = &[REGEX, PARTIAL, JAVASCRIPT, PYTHON];
}

/// Builder for tagged cache keys
#[derive(Debug, Clone)]
pub struct CacheKeyBuilder {
    buf: Vec<u8>,
}

impl CacheKeyBuilder {
    /// Create a builder whose buffer holds the tag plus `payload_len` bytes
    pub fn with_payload_capacity(type_id: u8, payload_len: usize) -> Self {
        let mut buf = Vec::with_capacity(1 + payload_len);
        buf.push(type_id);
        Self { buf }
    }

    /// Append the UTF-8 bytes of `value`
    pub fn append_str(mut self, value: &str) -> Self {
        self.buf.extend_from_slice(value.as_bytes());
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}

/// Build the key for a variant whose identity is a single piece of text
pub fn text_cache_key(type_id: u8, text: &str) -> Vec<u8> {
    CacheKeyBuilder::with_payload_capacity(type_id, text.len())
        .append_str(text)
        .build()
}
