use std::borrow::Cow;

use genome_core::control::ControlError;
use rmcp::ErrorData;
use rmcp::model::ErrorCode;
use tracing::warn;

pub(crate) fn mcp_err(code: ErrorCode, message: impl Into<Cow<'static, str>>) -> ErrorData {
    ErrorData {
        code,
        message: message.into(),
        data: None,
    }
}

/// Maps control-plane failures onto MCP error codes.
pub(crate) fn map_err(err: ControlError) -> ErrorData {
    let code = if err.is_not_found() {
        ErrorCode::RESOURCE_NOT_FOUND
    } else if matches!(err, ControlError::InvalidInput(_)) {
        ErrorCode::INVALID_PARAMS
    } else {
        warn!(error = %err, "tool call failed");
        ErrorCode::INTERNAL_ERROR
    };
    mcp_err(code, err.to_string())
}

#[cfg(test)]
mod tests {
    use genome_core::sources::SourceError;

    use super::*;

    #[test]
    fn maps_not_found_and_invalid_input() {
        let missing = map_err(ControlError::Source(SourceError::NotFound(
            "gene NOTAGENE".to_string(),
        )));
        assert_eq!(missing.code, ErrorCode::RESOURCE_NOT_FOUND);
        assert!(missing.message.contains("NOTAGENE"));

        let invalid = map_err(ControlError::InvalidInput("position must be at least 1".to_string()));
        assert_eq!(invalid.code, ErrorCode::INVALID_PARAMS);
    }

    #[test]
    fn everything_else_is_internal() {
        let err = map_err(ControlError::NoCandidateGenes {
            phenotype: "unheard-of syndrome".to_string(),
        });
        assert_eq!(err.code, ErrorCode::INTERNAL_ERROR);
        assert!(err.message.contains("no candidate genes"));
    }
}
