//! One conversation: transcript, family record, and phase

use super::{prompts, summary, SessionConfig, SessionError, SessionSnapshot};
use crate::extraction::{ExtractionPipeline, ExtractionStatus};
use crate::family::{EntityStore, FamilyData};
use crate::llm::{LlmConfig, LlmMessage, LlmRequest, LlmService};
use crate::state_machine::{Phase, PhaseController};
use crate::transcript::{Message, Transcript};
use serde::Serialize;
use std::sync::Arc;

/// Reply to one user turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub response: String,
    pub phase: Phase,
}

/// Result of saving a session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveOutcome {
    pub snapshot: SessionSnapshot,
    pub extraction_status: ExtractionStatus,
    pub summary: String,
}

pub struct SessionContext {
    transcript: Transcript,
    store: EntityStore,
    phases: PhaseController,
    llm: Arc<dyn LlmService>,
    extractor: ExtractionPipeline,
    config: SessionConfig,
}

impl SessionContext {
    /// Fresh session. The transcript starts with the base guidance.
    pub fn new(llm: Arc<dyn LlmService>, config: SessionConfig) -> Self {
        let mut transcript = Transcript::new();
        transcript.push(Message::system(prompts::BASE_GUIDANCE));
        Self {
            transcript,
            store: EntityStore::new(),
            phases: PhaseController::new(config.counting),
            extractor: ExtractionPipeline::new(Arc::clone(&llm)),
            llm,
            config,
        }
    }

    /// Fresh session backed by the configured provider.
    ///
    /// Fails when no credentials are available; that failure is never
    /// deferred to the first turn.
    pub fn connect(llm_config: &LlmConfig, config: SessionConfig) -> Result<Self, SessionError> {
        let llm = llm_config
            .build_service()
            .map_err(SessionError::CollaboratorUnavailable)?;
        Ok(Self::new(llm, config))
    }

    pub fn phase(&self) -> Phase {
        self.phases.phase()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn family_data(&self) -> &FamilyData {
        self.store.data()
    }

    /// Append the fixed greeting and return it. Calling again returns the
    /// existing greeting without appending.
    pub fn initialize(&mut self) -> String {
        if let Some(existing) = self.transcript.greeting() {
            return existing.to_string();
        }
        self.transcript.push(Message::greeting(prompts::GREETING));
        prompts::GREETING.to_string()
    }

    /// Process one user message and produce the assistant reply.
    ///
    /// Collaborator failures become an apology reply; the turn itself
    /// always succeeds and the transcript stays well-formed.
    pub async fn advance(&mut self, user_text: &str) -> Turn {
        self.transcript.push(Message::user(user_text));

        let step = self.phases.advance(&self.transcript);
        if let Some(directive) = step.directive {
            self.transcript.push(directive);
        }

        let request = LlmRequest::from_transcript(&self.transcript)
            .with_max_tokens(self.config.reply_max_tokens)
            .with_temperature(self.config.reply_temperature);

        let response = match self.llm.complete(&request).await {
            Ok(resp) if !resp.is_blank() => resp.text,
            Ok(_) => {
                tracing::warn!("Assistant returned an empty reply");
                prompts::EMPTY_REPLY.to_string()
            }
            Err(e) => {
                tracing::error!(error = %e, "Reply generation failed");
                prompts::APOLOGY.to_string()
            }
        };

        self.transcript.push(Message::assistant(response.clone()));

        Turn {
            response,
            phase: step.phase,
        }
    }

    /// Extract from the transcript, merge into the accumulated record, and
    /// snapshot it. Extraction failures are reported, never raised.
    pub async fn save_snapshot(&mut self) -> SaveOutcome {
        let extraction = self.extractor.extract(&self.transcript).await;
        self.store.merge(extraction.data);

        let snapshot = SessionSnapshot::new(self.store.snapshot(), self.phase());
        let summary = summary::render_save_summary(self.store.data());

        tracing::info!(
            phase = %snapshot.phase,
            records = snapshot.family_data.record_count(),
            extraction_status = %extraction.status,
            "Session saved"
        );

        SaveOutcome {
            snapshot,
            extraction_status: extraction.status,
            summary,
        }
    }

    /// Load a snapshot, inject context guidance, and greet the returning
    /// user. Prior messages are kept; the new guidance supersedes the old.
    pub async fn restore(&mut self, snapshot: SessionSnapshot) -> String {
        self.phases.restore(snapshot.phase);
        self.store.restore(snapshot.family_data);

        let context = summary::render_context(self.store.data());
        self.transcript.push(Message::system(prompts::restore_guidance(
            self.phase(),
            &context,
        )));

        let mut request = LlmRequest::from_transcript(&self.transcript)
            .with_max_tokens(self.config.reply_max_tokens)
            .with_temperature(self.config.reply_temperature);
        request
            .messages
            .push(LlmMessage::user(prompts::RETURNING_USER_NUDGE));

        let greeting = match self.llm.complete(&request).await {
            Ok(resp) if !resp.is_blank() => resp.text,
            Ok(_) => {
                tracing::warn!("Restore greeting was empty, using fallback");
                prompts::welcome_back(summary::follow_up_area(self.store.data()))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Restore greeting failed, using fallback");
                prompts::welcome_back(summary::follow_up_area(self.store.data()))
            }
        };

        tracing::info!(
            phase = %self.phase(),
            records = self.store.data().record_count(),
            "Session restored"
        );

        self.transcript.push(Message::greeting(greeting.clone()));
        greeting
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::ExtractionFailure;
    use crate::family::FamilyMember;
    use crate::llm::testing::MockLlmService;
    use crate::llm::{LlmError, MessageRole};
    use crate::state_machine::Directive;
    use crate::transcript::Role;

    fn session(mock: &Arc<MockLlmService>) -> SessionContext {
        SessionContext::new(mock.clone(), SessionConfig::default())
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let mock = Arc::new(MockLlmService::new());
        let mut s = session(&mock);

        assert_eq!(s.initialize(), prompts::GREETING);
        assert_eq!(s.initialize(), prompts::GREETING);
        assert_eq!(s.transcript().len(), 2);
        assert!(mock.recorded_requests().is_empty());
    }

    #[tokio::test]
    async fn test_first_turn_stays_in_initial_phase() {
        let mock = Arc::new(MockLlmService::new());
        mock.queue_text("Tell me more about your mother.");
        let mut s = session(&mock);
        s.initialize();

        let turn = s.advance("My mom Ana and I are close.").await;
        assert_eq!(turn.response, "Tell me more about your mother.");
        assert_eq!(turn.phase, Phase::InitialDataCollection);

        let request = mock.last_request().unwrap();
        assert_eq!(request.system.as_deref(), Some(prompts::BASE_GUIDANCE));
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, MessageRole::Assistant);
        assert_eq!(request.messages[1].content, "My mom Ana and I are close.");
        assert_eq!(request.max_tokens, Some(1000));
    }

    #[tokio::test]
    async fn test_directive_injected_on_fourth_user_message() {
        let mock = Arc::new(MockLlmService::new());
        let mut s = session(&mock);
        s.initialize();

        for i in 0..3 {
            mock.queue_text(format!("reply {i}"));
            let turn = s.advance(&format!("message {i}")).await;
            assert_eq!(turn.phase, Phase::InitialDataCollection);
        }

        // 3 exchanges = 6 counted, the 4th user message makes 7
        mock.queue_text("reply 3");
        let turn = s.advance("message 3").await;
        assert_eq!(turn.phase, Phase::DeepDive);

        let request = mock.last_request().unwrap();
        assert_eq!(
            request.system.as_deref(),
            Some(Directive::ExploreDynamics.text())
        );
        assert_eq!(s.transcript().count_role(Role::System), 2);
    }

    #[tokio::test]
    async fn test_collaborator_error_becomes_apology() {
        let mock = Arc::new(MockLlmService::new());
        mock.queue_error(LlmError::auth("invalid x-api-key"));
        let mut s = session(&mock);
        s.initialize();

        let turn = s.advance("Hi").await;
        assert_eq!(turn.response, prompts::APOLOGY);

        let last = s.transcript().messages().last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(last.content, prompts::APOLOGY);
    }

    #[tokio::test]
    async fn test_blank_reply_becomes_empty_notice() {
        let mock = Arc::new(MockLlmService::new());
        mock.queue_text("  \n");
        let mut s = session(&mock);

        let turn = s.advance("Hi").await;
        assert_eq!(turn.response, prompts::EMPTY_REPLY);
    }

    #[tokio::test]
    async fn test_save_merges_across_saves() {
        let mock = Arc::new(MockLlmService::new());
        let mut s = session(&mock);
        s.initialize();
        mock.queue_text("Nice.");
        s.advance("My dad John is 45.").await;

        mock.queue_text(r#"{"family_members":[{"name":"John","role":"father","age":45}]}"#);
        let first = s.save_snapshot().await;
        assert_eq!(first.extraction_status, ExtractionStatus::Complete);
        assert_eq!(first.snapshot.family_data.family_members.len(), 1);

        mock.queue_text(r#"{"family_members":[{"name":"John","attributes":["quiet"]}]}"#);
        let second = s.save_snapshot().await;
        assert_eq!(
            second.snapshot.family_data.family_members,
            vec![FamilyMember::named("John")
                .role("father")
                .age(45)
                .attribute("quiet")]
        );
        assert!(second.summary.contains("John (father)"));
    }

    #[tokio::test]
    async fn test_failed_extraction_keeps_prior_record() {
        let mock = Arc::new(MockLlmService::new());
        let mut s = session(&mock);
        mock.queue_text("ok");
        s.advance("My sister is Mia.").await;

        mock.queue_text(r#"{"family_members":[{"name":"Mia","role":"sister"}]}"#);
        s.save_snapshot().await;

        mock.queue_text("no json here");
        let outcome = s.save_snapshot().await;
        assert_eq!(
            outcome.extraction_status,
            ExtractionStatus::Failed(ExtractionFailure::NoPayloadFound)
        );
        assert_eq!(outcome.snapshot.family_data.family_members.len(), 1);
    }

    #[tokio::test]
    async fn test_restore_sets_phase_and_greets() {
        let mock = Arc::new(MockLlmService::new());
        mock.queue_text("Welcome back! How is Ana?");
        let mut s = session(&mock);

        let snapshot = SessionSnapshot::new(
            FamilyData {
                family_members: vec![FamilyMember::named("Ana").role("mother")],
                ..FamilyData::default()
            },
            Phase::DeepDive,
        );
        let greeting = s.restore(snapshot).await;
        assert_eq!(greeting, "Welcome back! How is Ana?");
        assert_eq!(s.phase(), Phase::DeepDive);

        let request = mock.last_request().unwrap();
        let system = request.system.unwrap();
        assert!(system.contains("Ana (mother)"));
        assert_eq!(
            request.messages.last().unwrap().content,
            prompts::RETURNING_USER_NUDGE
        );

        // Greeting is initialization, the directive for deep_dive is not re-emitted
        let last = s.transcript().messages().last().unwrap();
        assert!(last.is_initialization());
        assert!(!s
            .transcript()
            .messages()
            .iter()
            .any(|m| m.content == Directive::ExploreDynamics.text()));
    }

    #[tokio::test]
    async fn test_restore_falls_back_when_collaborator_fails() {
        let mock = Arc::new(MockLlmService::new());
        mock.queue_error(LlmError::network("connection refused"));
        let mut s = session(&mock);

        let snapshot = SessionSnapshot::new(
            FamilyData {
                family_members: vec![FamilyMember::named("Ana")],
                ..FamilyData::default()
            },
            Phase::Analysis,
        );
        let greeting = s.restore(snapshot).await;
        assert!(greeting.starts_with("Welcome back!"));
        assert!(greeting.contains("family members"));
        assert_eq!(s.phase(), Phase::Analysis);
    }

    #[tokio::test]
    async fn test_restored_phase_does_not_regress() {
        let mock = Arc::new(MockLlmService::new());
        mock.queue_text("Welcome back!");
        let mut s = session(&mock);
        s.restore(SessionSnapshot::new(FamilyData::default(), Phase::Analysis))
            .await;

        mock.queue_text("Interesting.");
        let turn = s.advance("Things are better now.").await;
        assert_eq!(turn.phase, Phase::Analysis);
    }

    #[test]
    fn test_connect_without_credentials_fails() {
        let config = LlmConfig {
            anthropic_api_key: None,
            gateway: None,
            model: None,
        };
        let result = SessionContext::connect(&config, SessionConfig::default());
        assert!(matches!(
            result,
            Err(SessionError::CollaboratorUnavailable(_))
        ));
    }
}
