use crate::error::{PipelineError, PipelineResult};
use regex::Regex;
use std::path::Path;
use std::process::Command;

/// Capability that turns a source document into raw text
pub trait TextExtractor {
    fn extract(&self, path: &Path) -> PipelineResult<String>;
}

/// Extracts text from a PDF using the external `pdftotext` tool
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    /// Check if pdftotext is available
    pub fn is_available() -> bool {
        Command::new("pdftotext").arg("-v").output().is_ok()
    }
}

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, path: &Path) -> PipelineResult<String> {
        if !path.exists() {
            return Err(PipelineError::input(format!(
                "document not found: {}",
                path.display()
            )));
        }

        // "-" sends the extracted text to stdout
        let output = Command::new("pdftotext")
            .arg(path)
            .arg("-")
            .output()
            .map_err(|e| {
                PipelineError::input(format!(
                    "failed to run pdftotext on {}: {}",
                    path.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            return Err(PipelineError::input(format!(
                "pdftotext failed on {}: {}",
                path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Reads an already-plain-text document as-is
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, path: &Path) -> PipelineResult<String> {
        std::fs::read_to_string(path).map_err(|e| {
            PipelineError::input(format!("failed to read {}: {}", path.display(), e))
        })
    }
}

/// Pick an extractor by file extension
pub fn extractor_for(path: &Path) -> Box<dyn TextExtractor> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("pdf") => Box::new(PdfTextExtractor),
        _ => Box::new(PlainTextExtractor),
    }
}

/// The condensed narration produced from the document text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Short lead for the title slide
    pub lead: String,
    /// The narration script, source of truth for segmentation
    pub script: String,
}

/// Capability that condenses raw document text into a narration script
pub trait Summarizer {
    fn summarize(&self, text: &str) -> PipelineResult<Summary>;
}

/// Deterministic extractive baseline: the script is a sentence-greedy prefix
/// of the document, the lead its first few words. A generative model can be
/// substituted behind the same trait.
pub struct ExtractiveSummarizer {
    pub lead_words: usize,
    pub script_chars: usize,
}

impl ExtractiveSummarizer {
    pub fn new(lead_words: usize, script_chars: usize) -> Self {
        Self {
            lead_words,
            script_chars,
        }
    }

    fn sentences(text: &str) -> Vec<&str> {
        let re = Regex::new(r"(?s)([^.!?]+[.!?]+)|([^.!?]+$)").unwrap();
        re.find_iter(text)
            .map(|m| m.as_str().trim())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

impl Summarizer for ExtractiveSummarizer {
    fn summarize(&self, text: &str) -> PipelineResult<Summary> {
        let mut script = String::new();

        for sentence in Self::sentences(text) {
            let extra = if script.is_empty() {
                sentence.chars().count()
            } else {
                sentence.chars().count() + 1
            };
            if !script.is_empty() && script.chars().count() + extra > self.script_chars {
                break;
            }
            if !script.is_empty() {
                script.push(' ');
            }
            script.push_str(sentence);
        }

        // A leading sentence longer than the budget gets cut at a word boundary
        if script.chars().count() > self.script_chars {
            let words: Vec<&str> = script.split_whitespace().collect();
            let mut cut = String::new();
            for word in words {
                let extra = if cut.is_empty() {
                    word.chars().count()
                } else {
                    word.chars().count() + 1
                };
                if !cut.is_empty() && cut.chars().count() + extra > self.script_chars {
                    break;
                }
                if !cut.is_empty() {
                    cut.push(' ');
                }
                cut.push_str(word);
            }
            script = cut;
        }

        let lead = script
            .split_whitespace()
            .take(self.lead_words)
            .collect::<Vec<_>>()
            .join(" ");

        Ok(Summary { lead, script })
    }
}
