//! `palisade ask` — resolve one question and print the answer.

use palisade_config::AppConfig;
use palisade_orchestrator::AnswerSource;

pub async fn run(config: &AppConfig, question: &str) -> anyhow::Result<()> {
    let (orchestrator, mut session) = super::build(config)?;

    let resolution = orchestrator.resolve(&mut session, question).await;

    super::print_guardrails(&resolution.guardrails);

    match resolution.answer {
        Some(answer) => {
            println!("{answer}");
            tracing::debug!(
                source = ?resolution.source,
                spent = session.budget.spent(),
                "resolution settled"
            );
            Ok(())
        }
        None => {
            debug_assert_eq!(resolution.source, AnswerSource::None);
            if !resolution.scan.accepted {
                anyhow::bail!("input rejected (risk score {})", resolution.scan.risk_score);
            }
            anyhow::bail!("no tier produced an answer");
        }
    }
}
