//! Organization and speed-bin tables (JEDEC-style constants).

use crate::common::addr::NUM_LEVELS;

/// Per-level child counts: how many ranks per channel, bank groups per rank,
/// banks per bank group, subarrays per bank, rows per subarray, columns per row.
#[derive(Debug, Clone, Copy)]
pub struct OrgEntry {
    /// Count of children at each [`crate::common::addr::Level`], indexed by
    /// `Level::index()`. `count[Level::Channel]` is always `1`.
    pub count: [u32; NUM_LEVELS],
}

impl OrgEntry {
    /// Banks per bank group times bank groups per rank.
    #[must_use]
    pub fn banks_per_rank(&self) -> u32 {
        self.count[2] * self.count[3]
    }

    /// Rows per subarray times subarrays per bank.
    #[must_use]
    pub fn rows_per_bank(&self) -> u32 {
        self.count[4] * self.count[5]
    }
}

/// Speed-bin timing parameters, all expressed in clock cycles unless noted.
#[derive(Debug, Clone, Copy)]
pub struct SpeedEntry {
    /// Clock period in nanoseconds (used to convert ns-denominated config
    /// options such as `smd_refresh_period` into clocks).
    pub t_ck_ns: f64,
    /// RAS: minimum ACT-to-PRE interval.
    pub n_ras: u64,
    /// RCD: ACT-to-(RD/WR) interval.
    pub n_rcd: u64,
    /// RP: PRE-to-ACT interval.
    pub n_rp: u64,
    /// RC: ACT-to-ACT interval, same bank (`n_ras + n_rp`).
    pub n_rc: u64,
    /// CL: RD-to-data interval.
    pub n_cl: u64,
    /// CWL: WR-to-data interval.
    pub n_cwl: u64,
    /// RTP: RD-to-PRE interval.
    pub n_rtp: u64,
    /// WR: last WR data to PRE interval.
    pub n_wr: u64,
    /// CCD_S: back-to-back column command interval, different bank group.
    pub n_ccds: u64,
    /// CCD_L: back-to-back column command interval, same bank group.
    pub n_ccdl: u64,
    /// RRD_S: ACT-to-ACT interval, different bank group.
    pub n_rrds: u64,
    /// RRD_L: ACT-to-ACT interval, same bank group.
    pub n_rrdl: u64,
    /// FAW: four-activate window.
    pub n_faw: u64,
    /// WTR_S: last WR to RD interval, different bank group.
    pub n_wtrs: u64,
    /// WTR_L: last WR to RD interval, same bank group.
    pub n_wtrl: u64,
    /// RFC: REF-to-ACT interval (whole rank).
    pub n_rfc: u64,
    /// REFI: nominal refresh interval (average cycles between REFs).
    pub n_refi: u64,
    /// CKE: minimum power-down duration.
    pub n_cke: u64,
    /// XP: power-down exit to next command interval.
    pub n_xp: u64,
    /// XS: self-refresh exit to next command interval.
    pub n_xs: u64,
    /// `nNACK_RESEND`: ACT-NACK retry interval.
    pub n_nack_resend: u64,
}
