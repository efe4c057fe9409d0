//! The `parse` command.

use kizashi::{CandidateParser, KizashiResult, StorageError, StorageErrorKind};
use std::path::Path;

/// Print the candidates found in a research answer as JSON.
///
/// Rejected records are reported on stderr.
pub async fn parse_research(path: &Path) -> KizashiResult<()> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| StorageError::new(StorageErrorKind::Io(format!("{}: {}", path.display(), e))))?;

    let report = CandidateParser::new().parse_report(&text);
    for rejected in &report.rejected {
        eprintln!("rejected: {}", rejected);
    }

    let json = serde_json::to_string_pretty(&report.candidates)
        .map_err(|e| StorageError::new(StorageErrorKind::Serialization(e.to_string())))?;
    println!("{}", json);
    Ok(())
}
