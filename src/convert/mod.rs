//! Format conversion
//!
//! HTML documents are turned into markdown by `htmd`; every other format
//! passes through unchanged. Conversion never aborts a run: callers fall back
//! to the raw text on [`ConversionError`].

use htmd::options::{CodeBlockStyle, HeadingStyle, Options};
use htmd::HtmlToMarkdown;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::DocumentFormat;
use crate::error::ConversionError;

/// Elements whose content never reaches the markdown.
const SKIPPED_TAGS: [&str; 6] = ["script", "style", "head", "noscript", "template", "svg"];

/// Tag-shaped markup, used to reject results that still carry raw HTML.
static RAW_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"</?[a-zA-Z][a-zA-Z0-9-]*(?:\s[^<>]*)?/?>|<!--")
        .unwrap_or_else(|e| panic!("invalid built-in pattern: {e}"))
});

/// Convert `text` of the given format to markdown.
pub fn convert(text: &str, format: DocumentFormat) -> Result<String, ConversionError> {
    match format {
        DocumentFormat::Plain => Ok(text.to_string()),
        DocumentFormat::Html => html_to_markdown(text),
    }
}

/// Rewrite an HTML document as markdown.
///
/// Fails when the converter errors, when a non-empty document yields no text,
/// or when tag markup survives anywhere in the result (code blocks included).
pub fn html_to_markdown(html: &str) -> Result<String, ConversionError> {
    let converter = HtmlToMarkdown::builder()
        .skip_tags(SKIPPED_TAGS.to_vec())
        .options(Options {
            heading_style: HeadingStyle::Atx,
            code_block_style: CodeBlockStyle::Fenced,
            ..Default::default()
        })
        .build();
    let markdown = converter
        .convert(html)
        .map_err(|e| ConversionError::Backend(e.to_string()))?;
    let markdown = markdown.trim();

    if markdown.is_empty() && !html.trim().is_empty() {
        return Err(ConversionError::Empty);
    }
    if RAW_TAG.is_match(markdown) {
        return Err(ConversionError::LeftoverMarkup);
    }
    Ok(markdown.to_string())
}
