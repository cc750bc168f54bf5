//! The memory controller: request scheduling, command issue, and the
//! maintenance/SMD bookkeeping that rides alongside it.

mod controller;
mod graphene;
mod raidr;
mod scrubber;

pub use controller::{Controller, ControllerConfig};
pub use graphene::GrapheneTable;
pub use raidr::RaidrRefresh;
pub use scrubber::MemoryScrubber;
