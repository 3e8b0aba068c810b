// self
use crate::{obs::RpcOutcome, service::ServiceKind};

/// Records a call outcome via the global metrics recorder (when enabled).
pub fn record_rpc_outcome(kind: ServiceKind, outcome: RpcOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"admiral_sdk_rpc_total",
			"service" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_rpc_outcome_noop_without_recorder() {
		record_rpc_outcome(ServiceKind::Healthcheck, RpcOutcome::Failure);
	}

	#[cfg(feature = "metrics")]
	#[test]
	fn counter_is_labeled_with_service_kind() {
		// crates.io
		use metrics::{
			Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit,
		};
		use parking_lot::Mutex;

		type Labels = Vec<(String, String)>;

		#[derive(Default)]
		struct LabelCapture(Mutex<Vec<(String, Labels)>>);
		impl Recorder for LabelCapture {
			fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

			fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

			fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

			fn register_counter(&self, key: &Key, _: &Metadata<'_>) -> Counter {
				let labels = key
					.labels()
					.map(|label| (label.key().to_owned(), label.value().to_owned()))
					.collect();

				self.0.lock().push((key.name().to_owned(), labels));

				Counter::noop()
			}

			fn register_gauge(&self, _: &Key, _: &Metadata<'_>) -> Gauge {
				Gauge::noop()
			}

			fn register_histogram(&self, _: &Key, _: &Metadata<'_>) -> Histogram {
				Histogram::noop()
			}
		}

		let recorder = LabelCapture::default();

		metrics::with_local_recorder(&recorder, || {
			record_rpc_outcome(ServiceKind::Deployment, RpcOutcome::Success);
		});

		let captured = recorder.0.lock();

		assert_eq!(captured.len(), 1);
		assert_eq!(captured[0].0, "admiral_sdk_rpc_total");
		assert!(captured[0].1.contains(&("service".to_owned(), "deployment".to_owned())));
		assert!(captured[0].1.contains(&("outcome".to_owned(), "success".to_owned())));
	}
}
