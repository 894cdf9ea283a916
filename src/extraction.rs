//! Turning a conversation transcript into structured family data
//!
//! Each step can fail independently; none of them fails the session. A
//! failure yields empty family data plus a status the caller can surface.

mod payload;
pub mod prompt;

pub use payload::{isolate, parse, PayloadError};

use crate::family::FamilyData;
use crate::llm::{LlmRequest, LlmService};
use crate::transcript::{Role, Transcript};
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

const EXTRACTION_MAX_TOKENS: u32 = 1000;
const EXTRACTION_TEMPERATURE: f32 = 0.2;

/// Why an extraction produced nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionFailure {
    /// The text-generation call errored
    CollaboratorFailed,
    /// The call succeeded but returned no text
    EmptyResponse,
    NoPayloadFound,
    MalformedPayload,
}

impl ExtractionFailure {
    pub fn as_str(self) -> &'static str {
        match self {
            ExtractionFailure::CollaboratorFailed => "collaborator_failed",
            ExtractionFailure::EmptyResponse => "empty_response",
            ExtractionFailure::NoPayloadFound => "no_payload_found",
            ExtractionFailure::MalformedPayload => "malformed_payload",
        }
    }
}

impl From<&PayloadError> for ExtractionFailure {
    fn from(err: &PayloadError) -> Self {
        match err {
            PayloadError::NoPayloadFound => ExtractionFailure::NoPayloadFound,
            PayloadError::Malformed(_) => ExtractionFailure::MalformedPayload,
        }
    }
}

/// Outcome reported to the caller alongside the extracted data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStatus {
    /// At least one category is non-empty
    Complete,
    NoDataFound,
    Failed(ExtractionFailure),
}

impl ExtractionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ExtractionStatus::Complete => "complete",
            ExtractionStatus::NoDataFound => "no_data_found",
            ExtractionStatus::Failed(_) => "extraction_failed",
        }
    }

    pub fn failure(self) -> Option<ExtractionFailure> {
        match self {
            ExtractionStatus::Failed(reason) => Some(reason),
            ExtractionStatus::Complete | ExtractionStatus::NoDataFound => None,
        }
    }

    fn for_data(data: &FamilyData) -> Self {
        if data.is_empty() {
            ExtractionStatus::NoDataFound
        } else {
            ExtractionStatus::Complete
        }
    }
}

impl fmt::Display for ExtractionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionStatus::Failed(reason) => write!(f, "{} ({})", self.as_str(), reason.as_str()),
            _ => f.write_str(self.as_str()),
        }
    }
}

impl Serialize for ExtractionStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Extracted data and how the extraction went
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub data: FamilyData,
    pub status: ExtractionStatus,
}

impl Extraction {
    fn failed(reason: ExtractionFailure) -> Self {
        Self {
            data: FamilyData::default(),
            status: ExtractionStatus::Failed(reason),
        }
    }
}

/// Runs extraction requests against the text-generation service
#[derive(Clone)]
pub struct ExtractionPipeline {
    llm: Arc<dyn LlmService>,
}

impl ExtractionPipeline {
    pub fn new(llm: Arc<dyn LlmService>) -> Self {
        Self { llm }
    }

    /// Extract family data from the full transcript. Never fails.
    pub async fn extract(&self, transcript: &Transcript) -> Extraction {
        if transcript.count_role(Role::User) == 0 {
            return Extraction {
                data: FamilyData::default(),
                status: ExtractionStatus::NoDataFound,
            };
        }

        let request = LlmRequest::single(prompt::EXTRACTION_GUIDANCE, prompt::build(transcript))
            .with_max_tokens(EXTRACTION_MAX_TOKENS)
            .with_temperature(EXTRACTION_TEMPERATURE);

        let response = match self.llm.complete(&request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Extraction call failed");
                return Extraction::failed(ExtractionFailure::CollaboratorFailed);
            }
        };

        if response.is_blank() {
            tracing::warn!("Extraction returned an empty response");
            return Extraction::failed(ExtractionFailure::EmptyResponse);
        }

        match parse(&response.text) {
            Ok(data) => {
                let status = ExtractionStatus::for_data(&data);
                tracing::info!(
                    status = %status,
                    members = data.family_members.len(),
                    relationships = data.relationships.len(),
                    dynamics = data.dynamics.len(),
                    events = data.events.len(),
                    "Extraction finished"
                );
                Extraction { data, status }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Extraction payload rejected");
                Extraction::failed(ExtractionFailure::from(&e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::family::FamilyMember;
    use crate::llm::testing::MockLlmService;
    use crate::llm::LlmError;
    use crate::transcript::Message;

    fn transcript() -> Transcript {
        let mut t = Transcript::new();
        t.push(Message::system("base"));
        t.push(Message::greeting("Hello!"));
        t.push(Message::user("My brother Lee is 12."));
        t
    }

    fn pipeline(mock: &Arc<MockLlmService>) -> ExtractionPipeline {
        ExtractionPipeline::new(mock.clone())
    }

    #[tokio::test]
    async fn test_prose_wrapped_payload_is_complete() {
        let mock = Arc::new(MockLlmService::new());
        mock.queue_text(r#"Sure! {"family_members":[{"name":"Lee"}]} Hope that helps!"#);

        let extraction = pipeline(&mock).extract(&transcript()).await;
        assert_eq!(extraction.status, ExtractionStatus::Complete);
        assert_eq!(
            extraction.data,
            FamilyData {
                family_members: vec![FamilyMember::named("Lee")],
                ..FamilyData::default()
            }
        );

        let request = mock.last_request().unwrap();
        assert_eq!(request.system.as_deref(), Some(prompt::EXTRACTION_GUIDANCE));
        assert_eq!(request.messages.len(), 1);
        assert!(request.messages[0].content.contains("USER: My brother Lee is 12."));
        assert_eq!(request.temperature, Some(EXTRACTION_TEMPERATURE));
    }

    #[tokio::test]
    async fn test_prose_without_braces_fails() {
        let mock = Arc::new(MockLlmService::new());
        mock.queue_text("I could not find any family information.");

        let extraction = pipeline(&mock).extract(&transcript()).await;
        assert!(extraction.data.is_empty());
        assert_eq!(
            extraction.status,
            ExtractionStatus::Failed(ExtractionFailure::NoPayloadFound)
        );
        assert_eq!(extraction.status.as_str(), "extraction_failed");
    }

    #[tokio::test]
    async fn test_malformed_payload_fails() {
        let mock = Arc::new(MockLlmService::new());
        mock.queue_text(r#"{"family_members": [oops]}"#);

        let extraction = pipeline(&mock).extract(&transcript()).await;
        assert_eq!(
            extraction.status.failure(),
            Some(ExtractionFailure::MalformedPayload)
        );
    }

    #[tokio::test]
    async fn test_empty_object_is_no_data_found() {
        let mock = Arc::new(MockLlmService::new());
        mock.queue_text("{}");

        let extraction = pipeline(&mock).extract(&transcript()).await;
        assert_eq!(extraction.status, ExtractionStatus::NoDataFound);
        assert!(extraction.data.is_empty());
    }

    #[tokio::test]
    async fn test_collaborator_error_and_empty_response() {
        let mock = Arc::new(MockLlmService::new());
        mock.queue_error(LlmError::server_error("overloaded"));
        mock.queue_text("   ");

        let p = pipeline(&mock);
        let first = p.extract(&transcript()).await;
        assert_eq!(
            first.status.failure(),
            Some(ExtractionFailure::CollaboratorFailed)
        );
        let second = p.extract(&transcript()).await;
        assert_eq!(second.status.failure(), Some(ExtractionFailure::EmptyResponse));
    }

    #[tokio::test]
    async fn test_no_user_messages_skips_call() {
        let mock = Arc::new(MockLlmService::new());
        let mut t = Transcript::new();
        t.push(Message::greeting("Hello!"));

        let extraction = pipeline(&mock).extract(&t).await;
        assert_eq!(extraction.status, ExtractionStatus::NoDataFound);
        assert!(mock.recorded_requests().is_empty());
    }

    #[test]
    fn test_status_serializes_as_flat_string() {
        let json = serde_json::to_value(ExtractionStatus::Failed(
            ExtractionFailure::NoPayloadFound,
        ))
        .unwrap();
        assert_eq!(json, "extraction_failed");
        assert_eq!(
            serde_json::to_value(ExtractionStatus::Complete).unwrap(),
            "complete"
        );
    }
}
