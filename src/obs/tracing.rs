// self
use crate::{_prelude::*, obs::Operation};

/// Span covering one client operation; inert without the `tracing` feature.
#[derive(Debug)]
pub struct OpSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OpSpan {
	/// Creates a new span tagged with the provided operation + stage.
	pub fn new(op: Operation, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("oauth2_api_client.op", op = op.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (op, stage);

			Self {}
		}
	}

	/// Runs `fut` inside the span, entering it on every poll.
	pub fn instrument<Fut>(self, fut: Fut) -> impl Future<Output = Fut::Output>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span)
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a debug event describing a token cache decision.
pub(crate) fn debug_cache(hit: bool) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(hit, "token cache lookup");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = hit;
	}
}

/// Emits a warn event for a failed operation. The error display never includes secrets.
pub(crate) fn warn_failure(op: Operation, stage: &'static str, err: &dyn Display) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(op = op.as_str(), stage, error = %err, "operation failed");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (op, stage, err);
	}
}
