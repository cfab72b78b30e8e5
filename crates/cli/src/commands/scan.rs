//! `palisade scan` — run the content-safety scanner and print the
//! verdict as JSON.

use palisade_config::AppConfig;
use palisade_shield::ScanOptions;

pub fn run(config: &AppConfig, text: &str) -> anyhow::Result<()> {
    let outcome = palisade_shield::scan(
        text,
        &ScanOptions {
            max_len: config.shield.max_len,
            risk_threshold: config.shield.risk_threshold,
        },
    );

    println!("{}", serde_json::to_string_pretty(&outcome)?);

    if !outcome.accepted {
        anyhow::bail!("input rejected (risk score {})", outcome.risk_score);
    }
    Ok(())
}
