use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use std::error::Error;
use std::fmt::Debug;

/// Message for a failed SDK call. Service errors report `code: message` as sent
/// by the service; transport, timeout and other failures fall back to the full
/// error chain.
pub fn sdk_error_message<E, R>(err: &SdkError<E, R>) -> String
where
    E: ProvideErrorMetadata + Error + 'static,
    R: Debug + 'static,
{
    let service_error = err.as_service_error();
    let code = service_error.and_then(|e| e.code());
    let message = service_error.and_then(|e| e.message());

    match (code, message) {
        (Some(code), Some(message)) => format!("{}: {}", code, message),
        (None, Some(message)) => message.to_string(),
        (Some(code), None) => code.to_string(),
        (None, None) => DisplayErrorContext(err).to_string(),
    }
}
