//! Wall-clock source used for authorization time windows.

use std::time::{SystemTime, UNIX_EPOCH};

pub trait Clock: Send + Sync {
	/// Current unix time in seconds.
	fn now(&self) -> u64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now(&self) -> u64 {
		SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.map(|d| d.as_secs())
			.unwrap_or(0)
	}
}

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
	fn now(&self) -> u64 {
		self.0
	}
}
