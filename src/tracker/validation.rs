use compact_str::CompactString;
use thiserror::Error;

/// A reason a tracker configuration cannot be used.
///
/// Validation reports these as data; the `Display` text is what the host
/// shows next to its setup form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{label} must be present")]
    MissingField { label: &'static str },

    #[error("You must specify your Gitlab URL, API token, Project ID and Project Name")]
    LegacyIncomplete,

    #[error("Gitlab URL '{endpoint}' does not point to a reachable Gitlab API")]
    EndpointUnreachable { endpoint: CompactString },

    #[error("API Token was rejected by Gitlab")]
    AuthenticationFailure,

    #[error("Project '{path}' could not be found with the given API Token")]
    ProjectNotFound { path: CompactString },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        let err = ValidationError::MissingField { label: "API Token" };
        assert_eq!(err.to_string(), "API Token must be present");

        let err = ValidationError::ProjectNotFound { path: "group/missing-project".into() };
        assert!(err.to_string().contains("group/missing-project"));
    }
}
