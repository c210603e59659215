//! Résumé Extractor: turns an uploaded document into `ResumeText`.
//!
//! DOCX: body-level `w:p` paragraphs from `word/document.xml`, in document order.
//! Table cells, text boxes and paragraph properties do not contribute text.
//! PDF: one paragraph per extracted text line.
//!
//! Parsing is CPU-bound; async callers should run it inside `spawn_blocking`.

use std::io::{Cursor, Read};

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

use crate::errors::AppError;
use crate::resume::ResumeText;

const DOCUMENT_PART: &str = "word/document.xml";

#[derive(Debug, Clone, Copy, PartialEq)]
enum DocumentKind {
    Docx,
    Pdf,
}

impl DocumentKind {
    fn detect(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"PK\x03\x04") {
            Some(DocumentKind::Docx)
        } else if bytes.starts_with(b"%PDF") {
            Some(DocumentKind::Pdf)
        } else {
            None
        }
    }
}

/// Extracts résumé text from DOCX or PDF bytes.
pub fn extract_resume(bytes: &[u8]) -> Result<ResumeText, AppError> {
    let kind = DocumentKind::detect(bytes).ok_or_else(|| {
        AppError::DocumentFormat("expected a .docx or .pdf document".to_string())
    })?;

    let paragraphs = match kind {
        DocumentKind::Docx => docx_paragraphs(bytes)?,
        DocumentKind::Pdf => pdf_paragraphs(bytes)?,
    };

    let resume = ResumeText::from_paragraphs(paragraphs);
    if resume.is_empty() {
        return Err(AppError::DocumentFormat(
            "resume contains no readable text".to_string(),
        ));
    }

    debug!(
        "Extracted {} resume paragraphs from {:?}",
        resume.paragraphs().len(),
        kind
    );
    Ok(resume)
}

fn docx_paragraphs(bytes: &[u8]) -> Result<Vec<String>, AppError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| AppError::DocumentFormat(format!("not a valid .docx container: {e}")))?;

    let mut part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| AppError::DocumentFormat(format!("missing {DOCUMENT_PART}: {e}")))?;

    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|e| AppError::DocumentFormat(format!("unreadable {DOCUMENT_PART}: {e}")))?;

    document_paragraphs(&xml)
}

fn pdf_paragraphs(bytes: &[u8]) -> Result<Vec<String>, AppError> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| AppError::DocumentFormat(format!("unreadable PDF: {e}")))?;
    Ok(text.lines().map(str::to_string).collect())
}

/// Walks `document.xml` and returns the text of each body paragraph, blanks included.
fn document_paragraphs(xml: &str) -> Result<Vec<String>, AppError> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut state = WalkState::default();

    loop {
        let event = reader.read_event().map_err(|e| {
            AppError::DocumentFormat(format!(
                "malformed {DOCUMENT_PART} at byte {}: {e}",
                reader.buffer_position()
            ))
        })?;

        match event {
            Event::Start(e) => match e.local_name().as_ref() {
                b"tbl" => state.table_depth += 1,
                b"p" => {
                    state.paragraph_depth += 1;
                    if state.at_body_paragraph() {
                        state.current = Some(String::new());
                    }
                }
                b"r" => state.run_depth += 1,
                b"t" => state.in_text = true,
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"p" if state.table_depth == 0 && state.paragraph_depth == 0 => {
                    paragraphs.push(String::new());
                }
                b"tab" => state.push_run_char('\t'),
                b"br" | b"cr" => state.push_run_char('\n'),
                _ => {}
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"tbl" => state.table_depth = state.table_depth.saturating_sub(1),
                b"p" => {
                    if state.at_body_paragraph() {
                        if let Some(text) = state.current.take() {
                            paragraphs.push(text);
                        }
                    }
                    state.paragraph_depth = state.paragraph_depth.saturating_sub(1);
                }
                b"r" => state.run_depth = state.run_depth.saturating_sub(1),
                b"t" => state.in_text = false,
                _ => {}
            },
            Event::Text(e) if state.collecting_text() => {
                let text = e
                    .decode()
                    .map_err(|e| AppError::DocumentFormat(format!("bad text encoding: {e}")))?;
                state.push_text(&text);
            }
            Event::GeneralRef(e) if state.collecting_text() => {
                if let Some(ch) = e
                    .resolve_char_ref()
                    .map_err(|e| AppError::DocumentFormat(format!("bad character reference: {e}")))?
                {
                    state.push_text(ch.encode_utf8(&mut [0; 4]));
                } else {
                    let name = e
                        .decode()
                        .map_err(|e| AppError::DocumentFormat(format!("bad entity: {e}")))?;
                    let resolved = resolve_predefined_entity(&name).ok_or_else(|| {
                        AppError::DocumentFormat(format!("unknown entity &{name};"))
                    })?;
                    state.push_text(resolved);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

#[derive(Debug, Default)]
struct WalkState {
    table_depth: usize,
    paragraph_depth: usize,
    run_depth: usize,
    in_text: bool,
    current: Option<String>,
}

impl WalkState {
    /// Outermost paragraph, outside any table. Nested paragraphs live in text boxes.
    fn at_body_paragraph(&self) -> bool {
        self.table_depth == 0 && self.paragraph_depth == 1
    }

    fn collecting_text(&self) -> bool {
        self.in_text && self.run_depth > 0 && self.at_body_paragraph()
    }

    fn push_text(&mut self, text: &str) {
        if let Some(current) = self.current.as_mut() {
            current.push_str(text);
        }
    }

    fn push_run_char(&mut self, ch: char) {
        if self.run_depth > 0 && self.at_body_paragraph() {
            if let Some(current) = self.current.as_mut() {
                current.push(ch);
            }
        }
    }
}
