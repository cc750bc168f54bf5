//! Controller-level memory requests and their queues.

use std::collections::VecDeque;

use crate::common::addr::AddrVec;
use crate::smd::SmdOutcome;
use crate::spec::Command;

/// The kind of access a [`Request`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestType {
    /// A CPU-side read.
    Read,
    /// A CPU-side write.
    Write,
    /// An internal maintenance access (refresh, scrub, PARA) with no data
    /// returned to a caller.
    Maintenance,
}

/// One in-flight memory access.
#[derive(Debug, Clone)]
pub struct Request {
    /// Full hierarchical address.
    pub addr: AddrVec,
    /// Read, write, or maintenance.
    pub kind: RequestType,
    /// Clock at which the request arrived at the controller.
    pub arrive_clk: u64,
    /// Clock at which the request's data/ack is due back, once scheduled.
    pub depart_clk: Option<u64>,
    /// The device command this request is currently decoded to, if any.
    pub next_command: Option<Command>,
    /// Set once an ACT issued for this request has been NACK'd by SMD and
    /// must be retried rather than treated as satisfied.
    pub nacked: Option<SmdOutcome>,
    /// True once the request's last required command has completed.
    pub done: bool,
}

impl Request {
    /// Builds a new, not-yet-scheduled request.
    #[must_use]
    pub const fn new(addr: AddrVec, kind: RequestType, arrive_clk: u64) -> Self {
        Self {
            addr,
            kind,
            arrive_clk,
            depart_clk: None,
            next_command: None,
            nacked: None,
            done: false,
        }
    }

    /// True if this request's address targets the given global bank id.
    #[must_use]
    pub fn targets_bank(&self, banks_per_bg: u32, bank_id: u32) -> bool {
        self.addr.global_bank_id(banks_per_bg) == bank_id
    }
}

/// Read, write, activate, and "everything else" queues, mirroring the
/// priority order the controller schedules from: `actq` first (clearing
/// blocked banks unblocks the most future work), then `readq`/`writeq` under
/// the active read/write mode, then `otherq` for refresh and scrub traffic.
#[derive(Debug, Clone, Default)]
pub struct RequestQueues {
    /// Pending reads, not yet issued a command.
    pub readq: VecDeque<Request>,
    /// Pending writes, not yet issued a command.
    pub writeq: VecDeque<Request>,
    /// Requests whose next command is an explicit ACT (row-buffer misses
    /// that have been decoded but not yet issued).
    pub actq: VecDeque<Request>,
    /// Maintenance requests: refresh, scrub, PARA preventive refresh.
    pub otherq: VecDeque<Request>,
}

impl RequestQueues {
    /// Total number of requests across every queue.
    #[must_use]
    pub fn len(&self) -> usize {
        self.readq.len() + self.writeq.len() + self.actq.len() + self.otherq.len()
    }

    /// True if every queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Enqueues a request onto the queue matching its [`RequestType`].
    pub fn push(&mut self, req: Request) {
        match req.kind {
            RequestType::Read => self.readq.push_back(req),
            RequestType::Write => self.writeq.push_back(req),
            RequestType::Maintenance => self.otherq.push_back(req),
        }
    }
}
