//! Optional observability helpers for the strategy's phases.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `timberlake_sso.stage` with the `stage`
//!   (phase or verification call) field.
//! - Enable `metrics` to increment the `timberlake_sso_stage_total` counter for every
//!   attempt/success/failure, labeled by `stage` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Phases and verification calls observed by the strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageKind {
	/// Login redirect construction.
	RequestPhase,
	/// Callback handling end to end.
	Callback,
	/// Token-validation call.
	ValidateToken,
	/// Member-info call.
	MemberInfo,
}
impl StageKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			StageKind::RequestPhase => "request_phase",
			StageKind::Callback => "callback",
			StageKind::ValidateToken => "validate_token",
			StageKind::MemberInfo => "member_info",
		}
	}
}
impl Display for StageKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageOutcome {
	/// Entry to a strategy phase.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl StageOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			StageOutcome::Attempt => "attempt",
			StageOutcome::Success => "success",
			StageOutcome::Failure => "failure",
		}
	}
}
impl Display for StageOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
