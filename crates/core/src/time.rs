//! Coarse timestamps for item records.

use chrono::{DateTime, Utc};

/// Seconds since the Unix epoch, truncated to 32 bits.
///
/// Item records store creation time this way; the precision loss is
/// acceptable until 2106. Times before the epoch clamp to 0.
pub fn epoch_secs(at: DateTime<Utc>) -> u32 {
    let secs = at.timestamp().max(0);
    // Truncation past 2106 is the documented wrap of this representation.
    secs as u32
}
