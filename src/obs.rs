//! Optional observability helpers for service calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to run every unary call inside an `admiral_sdk.rpc` span carrying the
//!   `service` and `method` fields, and to log transport assembly at `debug`.
//! - Enable `metrics` to increment the `admiral_sdk_rpc_total` counter for every
//!   attempt/success/failure, labeled by `service` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for each call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RpcOutcome {
	/// A call was dispatched.
	Attempt,
	/// The call returned a decoded response.
	Success,
	/// The call surfaced an error to the caller.
	Failure,
}
impl RpcOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RpcOutcome::Attempt => "attempt",
			RpcOutcome::Success => "success",
			RpcOutcome::Failure => "failure",
		}
	}

	/// Maps a call result onto its terminal outcome.
	pub fn of<T, E>(result: &Result<T, E>) -> Self {
		if result.is_ok() { RpcOutcome::Success } else { RpcOutcome::Failure }
	}
}
impl Display for RpcOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
