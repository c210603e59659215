// Résumé text extraction: DOCX paragraphs (primary) and PDF text lines.

pub mod extractor;

use std::fmt;

use serde::Serialize;

/// Non-empty résumé paragraphs in document order. Displays joined by `\n`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResumeText {
    paragraphs: Vec<String>,
}

impl ResumeText {
    /// Keeps paragraphs whose trimmed text is non-empty; order is preserved and
    /// the surviving paragraphs are stored untrimmed.
    pub fn from_paragraphs<I, S>(paragraphs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paragraphs: paragraphs
                .into_iter()
                .map(Into::into)
                .filter(|p: &String| !p.trim().is_empty())
                .collect(),
        }
    }

    pub fn paragraphs(&self) -> &[String] {
        &self.paragraphs
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }
}

impl fmt::Display for ResumeText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.paragraphs.join("\n"))
    }
}
