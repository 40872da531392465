// self
use crate::{_prelude::*, obs::StageKind};

/// Future wrapper produced by [`InstrumentStage::in_stage`] when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedStage<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedStage<F> = F;

#[cfg(feature = "tracing")]
fn stage_span(kind: StageKind) -> tracing::Span {
	tracing::info_span!("timberlake_sso.stage", stage = kind.as_str())
}

/// Opens a stage span for a synchronous section; the span closes with the guard.
pub fn enter_stage(kind: StageKind) -> StageGuard {
	#[cfg(feature = "tracing")]
	{
		StageGuard { _entered: stage_span(kind).entered() }
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = kind;

		StageGuard {}
	}
}

/// RAII guard returned by [`enter_stage`].
pub struct StageGuard {
	#[cfg(feature = "tracing")]
	_entered: tracing::span::EnteredSpan,
}
impl Debug for StageGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("StageGuard(..)")
	}
}

/// Attaches a stage span to a future.
///
/// Entered guards must not be held across `.await` points, so async sections
/// instrument the whole future instead.
pub trait InstrumentStage
where
	Self: Sized + Future,
{
	/// Wraps the future in a span tagged with the stage kind.
	fn in_stage(self, kind: StageKind) -> InstrumentedStage<Self>;
}
impl<F> InstrumentStage for F
where
	F: Future,
{
	fn in_stage(self, kind: StageKind) -> InstrumentedStage<Self> {
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			self.instrument(stage_span(kind))
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = kind;

			self
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn stage_guard_scopes_synchronous_sections() {
		let guard = enter_stage(StageKind::RequestPhase);

		assert_eq!(format!("{guard:?}"), "StageGuard(..)");
	}

	#[cfg(feature = "tracing")]
	#[tokio::test]
	async fn in_stage_preserves_the_future_output() {
		let value = async { "contact" }.in_stage(StageKind::ValidateToken).await;

		assert_eq!(value, "contact");
	}
}
