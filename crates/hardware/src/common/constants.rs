//! Small shared constants.

/// `REFRESH_RELAXING_FACTOR` from the variable-refresh and RAIDR policies:
/// rows classified as strong are still refreshed once every this many passes,
/// to bound worst-case retention for mis-classified rows.
pub const REFRESH_RELAXING_FACTOR: u32 = 4;

/// Maximum number of row scrubs a [`crate::controller::scrubber::MemoryScrubber`]
/// may have pending at once before it is considered unable to keep up.
pub const MAX_PENDING_ROW_SCRUBS: u32 = 8;
