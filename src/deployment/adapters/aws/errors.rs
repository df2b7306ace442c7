//! Classification of SDK failures into control plane faults.

use crate::deployment::ports::{ControlPlaneError, Operation};
use aws_sdk_ecs::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use std::error::Error;
use std::fmt;

/// Maps an SDK failure onto the fault taxonomy by its error code.
pub(super) fn classify<E, R>(operation: Operation, err: SdkError<E, R>) -> ControlPlaneError
where
    E: ProvideErrorMetadata + Error + 'static,
    R: fmt::Debug,
{
    let message = DisplayErrorContext(&err).to_string();
    match &err {
        SdkError::ServiceError(service) => match service.err().code() {
            Some("ThrottlingException" | "TooManyRequestsException" | "RequestLimitExceeded") => {
                ControlPlaneError::Throttled { operation, message }
            }
            Some(
                "ClusterNotFoundException"
                | "ServiceNotFoundException"
                | "ServiceNotActiveException",
            ) => ControlPlaneError::NotFound { operation, message },
            Some("ServerException" | "ServiceUnavailableException") => {
                ControlPlaneError::Unavailable { operation, message }
            }
            _ => ControlPlaneError::Rejected { operation, message },
        },
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
            ControlPlaneError::Unavailable { operation, message }
        }
        _ => ControlPlaneError::Rejected { operation, message },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_ecs::error::ErrorMetadata;
    use aws_sdk_ecs::operation::update_service::UpdateServiceError;
    use rstest::rstest;

    fn service_error(code: &str) -> SdkError<UpdateServiceError, ()> {
        let err = UpdateServiceError::generic(ErrorMetadata::builder().code(code).message("denied").build());
        SdkError::service_error(err, ())
    }

    #[rstest]
    #[case("ThrottlingException", true)]
    #[case("ServerException", true)]
    #[case("ServiceNotFoundException", false)]
    #[case("InvalidParameterException", false)]
    fn service_errors_are_classified_by_code(#[case] code: &str, #[case] retryable: bool) {
        let fault = classify(Operation::UpdateService, service_error(code));

        assert_eq!(fault.operation(), Operation::UpdateService);
        assert_eq!(fault.is_retryable(), retryable);
        match code {
            "ThrottlingException" => assert!(matches!(fault, ControlPlaneError::Throttled { .. })),
            "ServerException" => assert!(matches!(fault, ControlPlaneError::Unavailable { .. })),
            "ServiceNotFoundException" => {
                assert!(matches!(fault, ControlPlaneError::NotFound { .. }));
            }
            _ => assert!(matches!(fault, ControlPlaneError::Rejected { .. })),
        }
    }

    #[rstest]
    fn timeouts_are_unavailable() {
        let err: SdkError<UpdateServiceError, ()> = SdkError::timeout_error("no response");

        let fault = classify(Operation::UpdateService, err);

        assert!(matches!(fault, ControlPlaneError::Unavailable { .. }));
        assert!(fault.is_retryable());
    }
}
