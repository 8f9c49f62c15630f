//! Remote assessment backend over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;

use assess_core::model::TestTypeId;
use assess_core::submission::SubmissionRecord;
use storage::raw::RawQuestion;
use storage::repository::{QuestionSource, StorageError, SubmissionReceipt, SubmissionSink};

use crate::config::BackendConfig;

const REQUEST_TIMEOUT_SECS: u64 = 15;

/// `GET {base}/tests/{id}/questions` and `POST {base}/tests/{id}/submissions`.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: Client,
    config: BackendConfig,
}

impl HttpBackend {
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the HTTP client cannot be built.
    pub fn new(config: BackendConfig) -> Result<Self, StorageError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

fn transport_error(err: &reqwest::Error) -> StorageError {
    if err.is_timeout() {
        StorageError::Timeout
    } else if err.is_decode() {
        StorageError::Serialization(err.to_string())
    } else {
        StorageError::Connection(err.to_string())
    }
}

async fn check_status(response: Response) -> Result<Response, StorageError> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(StorageError::NotFound);
    }
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(StorageError::Rejected {
            status: status.as_u16(),
            message,
        });
    }
    Ok(response)
}

/// Build a receipt from a 2xx body. The status alone means the payload was taken, so an
/// empty or unexpected body falls back to counting what was sent.
fn receipt_from_body(body: &str, sent: usize) -> SubmissionReceipt {
    let value = match serde_json::from_str::<Value>(body) {
        Ok(value) => value,
        Err(err) => {
            if !body.trim().is_empty() {
                tracing::debug!(error = %err, "submission receipt is not JSON");
            }
            Value::Null
        }
    };
    let accepted = value
        .get("accepted")
        .and_then(Value::as_u64)
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(sent);
    let reference = match value.get("reference") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };
    SubmissionReceipt {
        accepted,
        reference,
    }
}

#[async_trait]
impl QuestionSource for HttpBackend {
    async fn fetch_questions(
        &self,
        test_type: &TestTypeId,
    ) -> Result<Vec<RawQuestion>, StorageError> {
        let url = self.config.endpoint(test_type.as_str(), "questions");
        tracing::debug!(%url, "fetching questions");
        let response = self
            .authorize(self.client.get(url))
            .send()
            .await
            .map_err(|e| transport_error(&e))?;
        let response = check_status(response).await?;
        response.json().await.map_err(|e| transport_error(&e))
    }
}

#[async_trait]
impl SubmissionSink for HttpBackend {
    async fn submit(
        &self,
        test_type: &TestTypeId,
        records: &[SubmissionRecord],
    ) -> Result<SubmissionReceipt, StorageError> {
        let url = self.config.endpoint(test_type.as_str(), "submissions");
        tracing::debug!(%url, records = records.len(), "posting submission");
        let response = self
            .authorize(self.client.post(url))
            .json(records)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;
        let response = check_status(response).await?;
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!(error = %err, "submission accepted but its body could not be read");
                String::new()
            }
        };
        Ok(receipt_from_body(&body, records.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assess_core::model::{QuestionId, QuestionKind};
    use assess_core::submission::SubmissionValue;
    use storage::normalize::{MalformedQuestion, normalize_all};
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(token: Option<&str>) -> BackendConfig {
        BackendConfig {
            base_url: Url::parse("http://127.0.0.1:9/").unwrap(),
            token: token.map(str::to_string),
        }
    }

    #[test]
    fn builds_with_config() {
        let backend = HttpBackend::new(config(Some("t"))).unwrap();
        assert_eq!(backend.config().token.as_deref(), Some("t"));
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_error() {
        let backend = HttpBackend::new(config(None)).unwrap();
        let id = TestTypeId::new("memory").unwrap();
        let err = backend.fetch_questions(&id).await.unwrap_err();
        assert!(matches!(
            err,
            StorageError::Connection(_) | StorageError::Timeout
        ));
    }

    fn backend_for(server: &MockServer) -> HttpBackend {
        HttpBackend::new(BackendConfig {
            base_url: Url::parse(&server.uri()).unwrap(),
            token: None,
        })
        .unwrap()
    }

    fn records() -> Vec<SubmissionRecord> {
        vec![SubmissionRecord {
            question_id: QuestionId::new(1),
            kind: QuestionKind::FillInGap,
            value: Some(SubmissionValue::Text("eating".into())),
        }]
    }

    #[test]
    fn receipt_tolerates_odd_bodies() {
        assert_eq!(
            receipt_from_body("", 3),
            SubmissionReceipt {
                accepted: 3,
                reference: None
            }
        );
        assert_eq!(receipt_from_body("OK", 2).accepted, 2);
        assert_eq!(
            receipt_from_body(r#"{"accepted":1,"reference":"r-9"}"#, 4),
            SubmissionReceipt {
                accepted: 1,
                reference: Some("r-9".into())
            }
        );
        assert_eq!(
            receipt_from_body(r#"{"reference":42}"#, 4).reference.as_deref(),
            Some("42")
        );
    }

    #[tokio::test]
    async fn one_bad_question_does_not_fail_the_fetch() {
        let server = MockServer::start().await;
        let body = serde_json::json!([
            { "id": 1, "type": "mcq", "prompt": "Next in 1, 2, 4?", "options": [2, 4, 8] },
            { "id": 2, "questionId": "2", "type": "gap", "prompt": "I ___ home" },
            { "id": 3, "type": "memory", "pairs": "sun-moon" }
        ]);
        Mock::given(method("GET"))
            .and(path("/tests/mixed/questions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let backend = backend_for(&server);
        let raws = backend
            .fetch_questions(&TestTypeId::new("mixed").unwrap())
            .await
            .unwrap();
        assert_eq!(raws.len(), 3);

        let out = normalize_all(raws, 30);
        let ids: Vec<_> = out.questions.iter().map(|q| q.id().value()).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(matches!(
            out.dropped[..],
            [MalformedQuestion::Unreadable { position: 2, .. }]
        ));
    }

    #[tokio::test]
    async fn empty_success_body_counts_as_delivered() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tests/word-logic/submissions"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let backend = backend_for(&server);
        let receipt = backend
            .submit(&TestTypeId::new("word-logic").unwrap(), &records())
            .await
            .unwrap();
        assert_eq!(receipt.accepted, 1);
        assert_eq!(receipt.reference, None);
    }

    #[tokio::test]
    async fn rejected_submission_keeps_status_and_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tests/word-logic/submissions"))
            .respond_with(ResponseTemplate::new(422).set_body_string("bad payload"))
            .mount(&server)
            .await;

        let err = backend_for(&server)
            .submit(&TestTypeId::new("word-logic").unwrap(), &records())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StorageError::Rejected { status: 422, ref message } if message == "bad payload"
        ));
    }
}
