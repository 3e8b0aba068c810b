// self
use crate::{_prelude::*, service::ServiceKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedRpc<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedRpc<F> = F;

/// Span wrapping a single service call.
#[derive(Clone, Debug)]
pub struct RpcSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl RpcSpan {
	/// Creates a new span tagged with the service label + method being called.
	pub fn new(kind: ServiceKind, method: &str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("admiral_sdk.rpc", service = kind.as_str(), method);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, method);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedRpc<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = RpcSpan::new(ServiceKind::State, "GetState");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
