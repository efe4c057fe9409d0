//! The `history` command.

use super::commands::OutputFormat;
use kizashi::{KizashiConfig, KizashiResult, StorageError, StorageErrorKind, build_store};

/// Print ledger records from the last `hours`, oldest first.
pub async fn show_history(
    config: &KizashiConfig,
    hours: i64,
    format: OutputFormat,
) -> KizashiResult<()> {
    let store = build_store(config).await?;
    let records = store.recent(chrono::Duration::hours(hours)).await?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&records)
                .map_err(|e| StorageError::new(StorageErrorKind::Serialization(e.to_string())))?;
            println!("{}", json);
        }
        OutputFormat::Human => {
            if records.is_empty() {
                println!("No posts in the last {} hours", hours);
            }
            for record in &records {
                println!(
                    "{}  {:<8}  {}  {}",
                    record.published_at().format("%Y-%m-%d %H:%M"),
                    record.platform(),
                    record.post_id(),
                    record.key()
                );
            }
        }
    }
    Ok(())
}
