//! `palisade chat` — interactive session on stdin.
//!
//! One resolution in flight at a time: the loop awaits each answer
//! before reading the next line, which is the serialization the
//! orchestrator relies on.

use palisade_config::AppConfig;
use palisade_orchestrator::AnswerSource;
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn run(config: &AppConfig) -> anyhow::Result<()> {
    let (orchestrator, mut session) = super::build(config)?;

    println!();
    println!("  Palisade — mode: {}, language: {}", config.mode, config.language);
    println!("  Type your message and press Enter. Type 'exit' or Ctrl+D to quit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    prompt()?;
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input.is_empty() {
            prompt()?;
            continue;
        }
        if input == "exit" {
            break;
        }

        let resolution = orchestrator.resolve(&mut session, input).await;

        super::print_guardrails(&resolution.guardrails);
        match &resolution.answer {
            Some(answer) => {
                println!();
                for line in answer.lines() {
                    println!("  > {line}");
                }
                println!();
            }
            None => {
                let why = if !resolution.scan.accepted {
                    "input rejected"
                } else {
                    debug_assert_eq!(resolution.source, AnswerSource::None);
                    "no answer available"
                };
                eprintln!("  ({why})");
                println!();
            }
        }

        prompt()?;
    }

    println!();
    println!(
        "  Session over: {} messages, {} budget units spent.",
        session.conversation.len(),
        session.budget.spent()
    );
    Ok(())
}

fn prompt() -> std::io::Result<()> {
    use std::io::Write;
    print!("  You > ");
    std::io::stdout().flush()
}
