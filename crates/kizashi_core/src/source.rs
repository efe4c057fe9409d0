//! Content source descriptors.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Which source or category a tick should query.
///
/// # Examples
///
/// ```
/// use kizashi_core::SourceDescriptor;
///
/// let source = SourceDescriptor::new("ai", ["AI", "生成AI"]);
/// assert_eq!(source.themes().len(), 2);
/// assert_eq!(source.theme_list(), "AI, 生成AI");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct SourceDescriptor {
    /// Short name used in logs and rotation.
    name: String,
    /// Themes to search within.
    #[serde(default)]
    themes: Vec<String>,
}

impl SourceDescriptor {
    /// Create a descriptor.
    pub fn new<I, S>(name: impl Into<String>, themes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            themes: themes.into_iter().map(Into::into).collect(),
        }
    }

    /// Themes joined for prompts.
    pub fn theme_list(&self) -> String {
        self.themes.join(", ")
    }
}
