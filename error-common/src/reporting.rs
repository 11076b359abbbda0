// Error reporting to the operator log

use crate::types::RotationError;

/// Log an error the way the CLI surfaces it: aggregated validation failures
/// are expanded so that every diagnostic gets its own log line.
pub fn log_error(context: &str, error: &RotationError) {
    match error {
        RotationError::Validation(failure) => {
            for message in failure.messages() {
                tracing::error!(context = context, "{}", message);
            }
            tracing::error!(
                context = context,
                errors = failure.len(),
                "Validation failed"
            );
        }
        other => {
            tracing::error!(context = context, error = %other, "ClusterCerts error occurred");
        }
    }
}
