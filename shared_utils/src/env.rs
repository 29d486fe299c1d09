use thiserror::Error;

/// An environment variable required by the application is not set.
#[derive(Debug, Error)]
#[error("Missing environment variable: {0}")]
pub struct MissingEnvVarError(pub String);

/// Reads an environment variable, returning a structured error if it's missing.
///
/// This is a thin wrapper around `std::env::var` that provides a more
/// ergonomic and specific error type for missing variables.
///
/// # Arguments
/// * `name` - The name of the environment variable to read.
pub fn get_env_var(name: &str) -> Result<String, MissingEnvVarError> {
    std::env::var(name).map_err(|_| MissingEnvVarError(name.to_string()))
}

/// Reads an optional environment variable.
///
/// Unset and blank values both come back as `None`, so callers can treat
/// `FOO=` the same as an absent `FOO`.
pub fn get_env_var_opt(name: &str) -> Option<String> {
    get_env_var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_var_reports_its_name() {
        let err = get_env_var("SHARED_UTILS_SURELY_UNSET_VAR").unwrap_err();
        assert_eq!(err.0, "SHARED_UTILS_SURELY_UNSET_VAR");
        assert!(err.to_string().contains("SHARED_UTILS_SURELY_UNSET_VAR"));
    }

    #[test]
    fn optional_var_is_none_when_unset() {
        assert!(get_env_var_opt("SHARED_UTILS_SURELY_UNSET_VAR").is_none());
    }

    #[test]
    fn optional_var_reads_path() {
        // PATH is set in every test environment we run in.
        if std::env::var("PATH").is_ok() {
            assert!(get_env_var_opt("PATH").is_some());
        }
    }
}
