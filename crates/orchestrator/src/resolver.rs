//! The resolution state machine.
//!
//! Per user message: scan → retrieval → (local) → (remote) → settled.
//! Each tier is gated by the budget ledger; each tier failure is caught
//! at its boundary and converted into a guardrail signal plus a
//! fallthrough decision. Tiers never run concurrently, and chunks from
//! a stream are applied to the answer and the ledger in strict arrival
//! order.

use std::sync::Arc;

use palisade_budget::{approx_cost, BudgetState, LOCAL_TIER_RESERVE, REMOTE_TIER_RESERVE};
use palisade_core::capability::{
    GenerateRequest, LoadRequest, LocalAccelerator, RemoteChatRequest, RemoteInferenceClient,
    WireMessage,
};
use palisade_core::error::LocalError;
use palisade_core::event::StreamEvent;
use palisade_core::guardrail::{GuardrailReport, GuardrailSignal, GuardrailSink};
use palisade_core::message::Message;
use palisade_retrieval::{DraftOptions, Drafter, SharedIndex};
use palisade_shield::{scan, ScanOptions, ScanOutcome};
use palisade_stream::StreamDecoder;
use tracing::{debug, info, warn};

use crate::session::{Mode, Session};

/// Which tier produced the settled answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerSource {
    /// Verbatim passages plus citations from the retrieval tier.
    Extractive,
    /// The on-device generative model.
    Local,
    /// The remote inference service.
    Remote,
    /// No tier produced an answer.
    None,
}

/// The outcome of one resolution call.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub source: AnswerSource,
    pub answer: Option<String>,
    pub guardrails: GuardrailReport,
    /// Verdict of the first scan pass over the raw input.
    pub scan: ScanOutcome,
}

/// Composes the scanner, the retrieval index, the budget policy, and
/// the two capability providers into the tiered fallback.
pub struct ResolutionOrchestrator {
    index: SharedIndex,
    scan_options: ScanOptions,
    draft_options: DraftOptions,
    local: Option<Arc<dyn LocalAccelerator>>,
    remote: Option<Arc<dyn RemoteInferenceClient>>,
    model_identifier: String,
}

impl ResolutionOrchestrator {
    pub fn new(index: SharedIndex) -> Self {
        Self {
            index,
            scan_options: ScanOptions::default(),
            draft_options: DraftOptions::default(),
            local: None,
            remote: None,
            model_identifier: "Llama-3.1-8B-Instruct-q4f16_1".into(),
        }
    }

    pub fn with_scan_options(mut self, options: ScanOptions) -> Self {
        self.scan_options = options;
        self
    }

    pub fn with_draft_options(mut self, options: DraftOptions) -> Self {
        self.draft_options = options;
        self
    }

    /// Attach the on-device accelerator capability.
    pub fn with_local(mut self, local: Arc<dyn LocalAccelerator>) -> Self {
        self.local = Some(local);
        self
    }

    /// Attach the remote inference client.
    pub fn with_remote(mut self, remote: Arc<dyn RemoteInferenceClient>) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn with_model_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.model_identifier = identifier.into();
        self
    }

    /// Resolve one user message. The caller serializes calls per
    /// session; there is no reentrancy guard here.
    pub async fn resolve(&self, session: &mut Session, raw_input: &str) -> Resolution {
        let mut guardrails = GuardrailReport::new();

        // Scan twice: once on the raw input, once on its own sanitized
        // output to catch mutation-reintroduced risk.
        let first = scan(raw_input, &self.scan_options);
        if !first.accepted {
            guardrails.raise(GuardrailSignal::error(
                "shield.rejected",
                format!("input rejected: {}", first.triggered_rules.join(", ")),
            ));
            return Resolution {
                source: AnswerSource::None,
                answer: None,
                guardrails,
                scan: first,
            };
        }
        let second = scan(&first.sanitized, &self.scan_options);
        if !second.accepted {
            guardrails.raise(GuardrailSignal::error(
                "shield.rejected",
                format!(
                    "sanitized input rejected: {}",
                    second.triggered_rules.join(", ")
                ),
            ));
            return Resolution {
                source: AnswerSource::None,
                answer: None,
                guardrails,
                scan: first,
            };
        }

        let query = first.sanitized.clone();
        session
            .conversation
            .push(Message::user(query.clone(), &session.language));

        if !session.budget.can_spend(1) {
            guardrails.raise(GuardrailSignal::error(
                "budget.hard_cap",
                "session generation budget exhausted",
            ));
            return Resolution {
                source: AnswerSource::None,
                answer: None,
                guardrails,
                scan: first,
            };
        }

        // Tier 1: extractive retrieval.
        match self.index.get().await {
            Ok(index) => {
                if let Some(answer) =
                    Drafter::new(index).draft(&query, &session.language, &self.draft_options)
                {
                    info!(source = "extractive", "resolution settled");
                    // clean extractive success: nothing from earlier
                    // calls carries over into the report
                    guardrails.clear();
                    return self.settle(
                        session,
                        AnswerSource::Extractive,
                        answer,
                        guardrails,
                        first,
                    );
                }
            }
            Err(e) => {
                guardrails.raise(GuardrailSignal::warn("retrieval.unavailable", e.to_string()));
            }
        }

        // Tier 2: on-device generative model.
        if session.mode != Mode::External {
            match &self.local {
                Some(local) if local.available() => {
                    if session.budget.headroom() >= LOCAL_TIER_RESERVE {
                        match self
                            .local_tier(local.as_ref(), session, &query, &mut guardrails)
                            .await
                        {
                            Ok(Some(answer)) => {
                                info!(source = "local", "resolution settled");
                                return self.settle(
                                    session,
                                    AnswerSource::Local,
                                    answer,
                                    guardrails,
                                    first,
                                );
                            }
                            Ok(None) => {
                                debug!("local tier produced no output");
                            }
                            Err(e) => {
                                warn!(error = %e, "local tier failed, falling through");
                                guardrails
                                    .raise(GuardrailSignal::warn("local.failed", e.to_string()));
                            }
                        }
                    } else {
                        guardrails.raise(GuardrailSignal::warn(
                            "budget.reserve",
                            "not enough budget headroom for the local tier",
                        ));
                    }
                }
                _ => {
                    guardrails.raise(GuardrailSignal::warn(
                        "local.unavailable",
                        "no local accelerator capability",
                    ));
                }
            }
        }

        // Tier 3: remote inference service.
        if session.mode != Mode::Local {
            if session.budget.headroom() < REMOTE_TIER_RESERVE {
                guardrails.raise(GuardrailSignal::warn(
                    "budget.reserve",
                    "not enough budget headroom for the remote tier",
                ));
            } else if let Some(remote) = &self.remote {
                if let Some(answer) = self
                    .remote_tier(remote.as_ref(), session, &mut guardrails)
                    .await
                {
                    info!(source = "remote", "resolution settled");
                    return self.settle(session, AnswerSource::Remote, answer, guardrails, first);
                }
            } else {
                guardrails.raise(GuardrailSignal::warn(
                    "remote.unconfigured",
                    "no remote inference endpoint configured",
                ));
            }
        } else {
            guardrails.raise(GuardrailSignal::warn(
                "local.no_answer",
                "no local answer and the remote tier is disabled",
            ));
        }

        Resolution {
            source: AnswerSource::None,
            answer: None,
            guardrails,
            scan: first,
        }
    }

    fn settle(
        &self,
        session: &mut Session,
        source: AnswerSource,
        answer: String,
        mut guardrails: GuardrailReport,
        scan: ScanOutcome,
    ) -> Resolution {
        session
            .conversation
            .push(Message::assistant(answer.clone(), &session.language));
        if session.budget.soft_reached() {
            guardrails.raise(GuardrailSignal::warn(
                "budget.soft_cap",
                "session generation budget is nearly exhausted",
            ));
        }
        Resolution {
            source,
            answer: Some(answer),
            guardrails,
            scan,
        }
    }

    async fn local_tier(
        &self,
        local: &dyn LocalAccelerator,
        session: &mut Session,
        query: &str,
        guardrails: &mut GuardrailReport,
    ) -> Result<Option<String>, LocalError> {
        local
            .load(&LoadRequest {
                model_identifier: self.model_identifier.clone(),
            })
            .await?;

        // Ground the model with the cheap overlap ranking; corpus
        // trouble just means an empty context here.
        let context = match self.index.get().await {
            Ok(index) => Drafter::new(index)
                .strong_passages(query, &session.language)
                .iter()
                .map(|s| format!("[#{}] {}", s.passage.id, s.passage.text))
                .collect::<Vec<_>>()
                .join("\n"),
            Err(_) => String::new(),
        };

        let mut rx = local
            .generate(GenerateRequest {
                prompt: query.to_string(),
                system_instruction: grounding_instruction(&session.language, &context),
            })
            .await?;

        let mut answer = String::new();
        let mut hard_capped = false;
        while let Some(token) = rx.recv().await {
            let token = token?;
            admit_chunk(
                &mut session.budget,
                guardrails,
                &mut answer,
                &token,
                &mut hard_capped,
            );
        }
        Ok((!answer.is_empty()).then_some(answer))
    }

    async fn remote_tier(
        &self,
        remote: &dyn RemoteInferenceClient,
        session: &mut Session,
        guardrails: &mut GuardrailReport,
    ) -> Option<String> {
        let request = RemoteChatRequest {
            messages: session
                .conversation
                .trailing_window()
                .iter()
                .map(WireMessage::from)
                .collect(),
            lang: session.language.clone(),
            csrf: session.csrf.clone(),
            hp: session.honeypot.clone(),
        };

        let mut rx = match remote.stream(request).await {
            Ok(rx) => rx,
            Err(e) => {
                warn!(error = %e, "remote request failed");
                guardrails.raise(GuardrailSignal::error("remote.failed", e.to_string()));
                return None;
            }
        };

        let mut decoder = StreamDecoder::new();
        let mut answer = String::new();
        let mut hard_capped = false;
        let mut interrupted = false;

        while let Some(item) = rx.recv().await {
            match item {
                Ok(chunk) => {
                    for event in decoder.push(&chunk) {
                        apply_event(event, session, guardrails, &mut answer, &mut hard_capped);
                    }
                    if decoder.ended() {
                        break;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "remote stream interrupted");
                    guardrails.raise(GuardrailSignal::error("remote.interrupted", e.to_string()));
                    interrupted = true;
                    break;
                }
            }
        }
        if !interrupted && !decoder.ended() {
            for event in decoder.finish() {
                apply_event(event, session, guardrails, &mut answer, &mut hard_capped);
            }
        }

        let usage = decoder.usage();
        debug!(?usage, accepted_chars = answer.chars().count(), "remote stream done");

        (!answer.is_empty()).then_some(answer)
    }
}

fn apply_event(
    event: StreamEvent,
    session: &mut Session,
    guardrails: &mut GuardrailReport,
    answer: &mut String,
    hard_capped: &mut bool,
) {
    match event {
        StreamEvent::Content { payload } => {
            admit_chunk(&mut session.budget, guardrails, answer, &payload, hard_capped);
        }
        StreamEvent::Control { payload } => {
            let is_error = payload.is_error();
            let code = payload.code.unwrap_or_else(|| "remote.control".into());
            let signal = if is_error {
                GuardrailSignal::error(code, payload.message)
            } else {
                GuardrailSignal::warn(code, payload.message)
            };
            guardrails.raise(signal);
        }
        StreamEvent::End => {}
    }
}

/// Apply one incremental chunk against the budget: the cost is checked
/// BEFORE the chunk is surfaced or counted. Chunks over the hard cap
/// are dropped from the visible answer (the transport keeps running),
/// and the hard-cap error is raised at most once per resolution call.
fn admit_chunk(
    budget: &mut BudgetState,
    sink: &mut dyn GuardrailSink,
    answer: &mut String,
    chunk: &str,
    hard_capped: &mut bool,
) {
    let cost = approx_cost(chunk);
    if budget.can_spend(cost) {
        budget.note(cost);
        answer.push_str(chunk);
    } else if !*hard_capped {
        sink.raise(GuardrailSignal::error(
            "budget.hard_cap",
            "hard budget cap reached; further content suppressed",
        ));
        *hard_capped = true;
    }
}

fn grounding_instruction(language: &str, context: &str) -> String {
    match language {
        "es" => format!(
            "Responde usando únicamente los pasajes de contexto siguientes. \
             Cita los identificadores de pasaje que uses con la forma [#id]. \
             Si el contexto no contiene la respuesta, dilo.\n\nContexto:\n{context}"
        ),
        _ => format!(
            "Answer using only the context passages below. \
             Cite the passage ids you used in the form [#id]. \
             If the context does not contain the answer, say so.\n\nContext:\n{context}"
        ),
    }
}
