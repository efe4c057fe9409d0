//! The `compose` command.

use kizashi::{
    Candidate, KizashiConfig, KizashiResult, PostShape, StorageError, StorageErrorKind, TextBudget,
    validate_candidate,
};
use std::path::Path;

/// Print the post a candidate file would produce, and its length.
pub async fn compose_candidate(
    config: &KizashiConfig,
    path: &Path,
    shape: Option<PostShape>,
    max_length: Option<usize>,
    rank: usize,
) -> KizashiResult<()> {
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| StorageError::new(StorageErrorKind::Io(format!("{}: {}", path.display(), e))))?;
    let candidate: Candidate = serde_json::from_str(&json)
        .map_err(|e| StorageError::new(StorageErrorKind::Serialization(e.to_string())))?;
    let candidate = validate_candidate(candidate)?;

    let shape = shape.unwrap_or(config.compose.shape);
    let budget = TextBudget::new(max_length.or(config.compose.max_length).unwrap_or(280))
        .with_ellipsis(config.compose.ellipsis.clone());
    let text = shape
        .compose(&candidate, rank, chrono::Local::now().date_naive())
        .render(&budget);

    println!("{}", text);
    println!("---");
    println!("{} / {} characters", text.chars().count(), budget.max_length());
    Ok(())
}
