use serde_json::Value;

/// Inbound `POST /similarity` body.
///
/// Parsed leniently: a body that is not JSON, or a field that is absent or not a
/// string, leaves that sequence as `None` so validation can answer it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimilarityRequest {
    pub first_protein_sequence: Option<String>,
    pub second_protein_sequence: Option<String>,
}

impl SimilarityRequest {
    pub const FIRST_FIELD: &'static str = "firstProteinSequence";
    pub const SECOND_FIELD: &'static str = "secondProteinSequence";

    pub fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(value) => Self::from_value(&value),
            Err(e) => {
                tracing::debug!(error = %e, "Request body is not JSON");
                Self::default()
            }
        }
    }

    pub fn from_value(value: &Value) -> Self {
        let field = |name: &str| value.get(name).and_then(Value::as_str).map(str::to_string);
        Self {
            first_protein_sequence: field(Self::FIRST_FIELD),
            second_protein_sequence: field(Self::SECOND_FIELD),
        }
    }

    pub fn first(&self) -> Option<&str> {
        self.first_protein_sequence.as_deref()
    }

    pub fn second(&self) -> Option<&str> {
        self.second_protein_sequence.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_body_reads_both_fields() {
        let body = br#"{"firstProteinSequence":"ACDE","secondProteinSequence":"fghi"}"#;
        let request = SimilarityRequest::from_body(body);
        assert_eq!(request.first(), Some("ACDE"));
        assert_eq!(request.second(), Some("fghi"));
    }

    #[test]
    fn test_non_string_fields_are_missing() {
        let body = br#"{"firstProteinSequence":42,"secondProteinSequence":null}"#;
        let request = SimilarityRequest::from_body(body);
        assert_eq!(request, SimilarityRequest::default());
    }

    #[test]
    fn test_malformed_body_is_empty_request() {
        assert_eq!(
            SimilarityRequest::from_body(b"{not json"),
            SimilarityRequest::default()
        );
        assert_eq!(SimilarityRequest::from_body(b""), SimilarityRequest::default());
    }

    #[test]
    fn test_empty_string_is_kept() {
        let body = br#"{"firstProteinSequence":"","secondProteinSequence":"ACDE"}"#;
        let request = SimilarityRequest::from_body(body);
        assert_eq!(request.first(), Some(""));
    }
}
