//! Carrier identifier capture.
//!
//! Only the first `<transporta><CNPJ>…</CNPJ>` occurrence of a document is
//! considered. Whitespace and line breaks between the tags are tolerated.

use regex::Regex;

use nfesel_config::normalize_identifier;

use crate::error::{FsOpsError, FsOpsResult};

const CARRIER_PATTERN: &str = r"(?s)<transporta>\s*<CNPJ>\s*(.+?)\s*</CNPJ>";

/// Extracts and compares the carrier identifier of NF-e documents.
#[derive(Debug, Clone)]
pub struct CarrierMatcher {
    pattern: Regex,
}

impl CarrierMatcher {
    /// Compile the carrier pattern.
    ///
    /// # Errors
    ///
    /// Returns [`FsOpsError::Pattern`] if the pattern fails to compile.
    pub fn new() -> FsOpsResult<Self> {
        let pattern = Regex::new(CARRIER_PATTERN).map_err(|source| FsOpsError::Pattern {
            pattern: CARRIER_PATTERN,
            source,
        })?;
        Ok(Self { pattern })
    }

    /// Raw identifier declared in the first carrier section, if any.
    #[must_use]
    pub fn capture<'t>(&self, content: &'t str) -> Option<&'t str> {
        self.pattern
            .captures(content)
            .and_then(|captures| captures.get(1))
            .map(|capture| capture.as_str())
    }

    /// Whether the first carrier section declares `target` once separators are stripped.
    #[must_use]
    pub fn declares(&self, content: &str, target: &str) -> bool {
        self.capture(content)
            .is_some_and(|captured| normalize_identifier(captured) == target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nfesel_test_support::documents::{
        CARRIER_CNPJ, OTHER_CNPJ, compact_nfe_document, nfe_document, nfe_without_carrier,
    };

    fn matcher() -> CarrierMatcher {
        CarrierMatcher::new().expect("carrier pattern compiles")
    }

    #[test]
    fn matches_compact_and_pretty_documents() {
        let matcher = matcher();
        assert!(matcher.declares(&compact_nfe_document(CARRIER_CNPJ), CARRIER_CNPJ));
        assert!(matcher.declares(&nfe_document(CARRIER_CNPJ), CARRIER_CNPJ));
        assert!(!matcher.declares(&compact_nfe_document(OTHER_CNPJ), CARRIER_CNPJ));
    }

    #[test]
    fn ignores_documents_without_carrier_section() {
        let matcher = matcher();
        assert!(matcher.capture(&nfe_without_carrier()).is_none());
        assert!(!matcher.declares("", CARRIER_CNPJ));
    }

    #[test]
    fn captured_identifier_is_normalised_before_comparison() {
        let matcher = matcher();
        let formatted = "<transporta><CNPJ>12.345.678/0001-99</CNPJ></transporta>";
        assert_eq!(matcher.capture(formatted), Some("12.345.678/0001-99"));
        assert!(matcher.declares(formatted, CARRIER_CNPJ));
    }

    #[test]
    fn only_the_first_carrier_section_counts() {
        let matcher = matcher();
        let content = format!(
            "{}{}",
            compact_nfe_document(OTHER_CNPJ),
            compact_nfe_document(CARRIER_CNPJ)
        );
        assert_eq!(matcher.capture(&content), Some(OTHER_CNPJ));
        assert!(!matcher.declares(&content, CARRIER_CNPJ));
    }

    #[test]
    fn capture_is_non_greedy() {
        let matcher = matcher();
        let content = "<transporta><CNPJ>1</CNPJ><CNPJ>2</CNPJ>";
        assert_eq!(matcher.capture(content), Some("1"));
    }
}
