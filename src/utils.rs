//! Shared utility functions and constants

use sha2::{Digest, Sha256};

/// Number of bytes to use from SHA256 hash for content hashing
pub const CONTENT_HASH_BYTES: usize = 16;

/// Session ID prefix length shown in status output
pub const SHORT_SESSION_LEN: usize = 8;

/// Max characters of chunk text shown inline in summaries
pub const CHUNK_PREVIEW_LEN: usize = 40;

/// SHA-256 of the content, truncated and hex encoded
pub fn content_hash(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    hex::encode(&digest[..CONTENT_HASH_BYTES])
}

/// Truncate a string to max characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Single-line preview of chunk text with whitespace made visible
pub fn preview(text: &str, max: usize) -> String {
    let escaped: String = text
        .chars()
        .map(|c| match c {
            '\n' => "⏎".to_string(),
            '\t' => "→".to_string(),
            '\r' => String::new(),
            c => c.to_string(),
        })
        .collect();
    truncate(&escaped, max)
}

/// Shorten an id for display
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(SHORT_SESSION_LEN) {
        Some((index, _)) => &id[..index],
        None => id,
    }
}

/// Hex encoding utilities
pub mod hex {
    /// Encode bytes as hex string
    pub fn encode(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }
}
