//! The normalized result of a single request.
//!
//! An `Outcome` is returned for every call, success or not; callers check
//! `error` instead of matching on a `Result`.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::error::RequestError;

/// The normalized result of one request.
///
/// When `error` is `None` the request succeeded and `data` holds the parsed
/// body, or `None` for a 204. When `error` is set, `data` is `None`.
#[derive(Debug)]
pub struct Outcome {
    pub data: Option<Value>,
    pub error: Option<RequestError>,
    /// Cancels the request this outcome belongs to. Triggering it after
    /// completion has no effect.
    pub abort: CancellationToken,
}

impl Outcome {
    pub(crate) fn new(abort: CancellationToken) -> Self {
        Self {
            data: None,
            error: None,
            abort,
        }
    }

    pub(crate) fn failed(abort: CancellationToken, error: RequestError) -> Self {
        Self {
            data: None,
            error: Some(error),
            abort,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> Result<Option<Value>, RequestError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.data),
        }
    }

    /// Like `into_result`, with the data deserialized into `T`.
    pub fn into_data<T: DeserializeOwned>(self) -> Result<Option<T>, RequestError> {
        self.into_result()?
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| RequestError::Deserialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Page {
        total: u32,
    }

    #[test]
    fn into_data_deserializes_payload() {
        let mut outcome = Outcome::new(CancellationToken::new());
        outcome.data = Some(json!({"total": 3}));
        assert_eq!(outcome.into_data::<Page>().unwrap(), Some(Page { total: 3 }));
    }

    #[test]
    fn into_data_on_empty_success_is_none() {
        let outcome = Outcome::new(CancellationToken::new());
        assert!(outcome.is_ok());
        assert_eq!(outcome.into_data::<Page>().unwrap(), None);
    }

    #[test]
    fn failed_outcome_into_result_is_err() {
        let outcome = Outcome::failed(CancellationToken::new(), RequestError::Cancelled);
        assert!(!outcome.is_ok());
        assert!(matches!(outcome.into_result(), Err(RequestError::Cancelled)));
    }

    #[test]
    fn into_data_reports_shape_mismatch() {
        let mut outcome = Outcome::new(CancellationToken::new());
        outcome.data = Some(json!({"total": "many"}));
        assert!(matches!(
            outcome.into_data::<Page>(),
            Err(RequestError::Deserialization(_))
        ));
    }
}
