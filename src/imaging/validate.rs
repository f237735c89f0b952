//! Candidate validity: a byte-size floor that catches truncated downloads
//! and provider error bodies saved as images.

use super::ImageCandidate;

/// Smallest byte count accepted as a plausible hero image. Anything below
/// this is treated as a failed fetch regardless of its extension.
pub const MIN_VALID_BYTES: u64 = 1000;

/// `true` when `byte_len` reaches the floor. The boundary itself is valid.
pub fn is_valid_len(byte_len: u64) -> bool {
    byte_len >= MIN_VALID_BYTES
}

pub fn is_valid(candidate: &ImageCandidate) -> bool {
    is_valid_len(candidate.byte_len)
}
