//! `PhaseTimings` (spec.md §3): recorded by the coordinator, rendered at end
//! when `-metrics` is set.

use std::time::Duration;

#[derive(Debug, Clone, Copy, Default)]
pub struct PhaseTimings {
    pub walk: Duration,
    pub scan: Duration,
    pub print: Duration,
    pub total: Duration,
}
