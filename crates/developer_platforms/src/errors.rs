#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Error types for developer platform operations.
///
/// This enum represents the failures that can occur when reading pull request,
/// check and review data from a developer platform like GitHub. Each variant
/// provides enough context to decide whether the failure is specific to one
/// repository or whether the platform itself is unavailable.
///
/// # Examples
///
/// ```rust
/// use pr_dashboard_developer_platforms::errors::Error;
///
/// let not_found = Error::RepositoryNotFound("octo/missing".to_string());
/// assert_eq!(not_found.to_string(), "Repository not found: octo/missing");
///
/// let rate_limit = Error::RateLimitExceeded;
/// assert_eq!(rate_limit.to_string(), "Rate limit exceeded");
/// ```
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// API request failure.
    ///
    /// An API call to the developer platform failed. The string carries the
    /// message reported by the platform or the transport.
    #[error("API request failed: {0}")]
    ApiError(String),

    /// Authentication failed with the platform.
    ///
    /// The provided token is invalid, expired, or lacks the permissions needed
    /// to read the repository.
    #[error("Authentication failed: {0}")]
    AuthError(String),

    /// Invalid response format from platform API.
    ///
    /// The response did not have the expected shape, e.g. missing required
    /// fields or a payload that could not be deserialized.
    #[error("Invalid response format")]
    InvalidResponse,

    /// Platform rate limit exceeded.
    ///
    /// GitHub allows 5000 requests per hour for authenticated requests. The
    /// dashboard does not retry; the repository is shown as failed and picked
    /// up again on the next refresh.
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// The repository could not be resolved.
    ///
    /// Either the repository does not exist or the token cannot see it.
    #[error("Repository not found: {0}")]
    RepositoryNotFound(String),
}
