// self
use crate::obs::{AuthOperation, AuthOutcome};

/// Records an outcome via the global metrics recorder (when enabled).
pub fn record_outcome(operation: AuthOperation, outcome: AuthOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"oauth2_client_auth_total",
			"operation" => operation.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (operation, outcome);
	}
}
