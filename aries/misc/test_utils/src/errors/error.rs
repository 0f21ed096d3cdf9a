use thiserror::Error as ThisError;

pub type TestUtilsResult<T> = Result<T, TestUtilsError>;

#[derive(Debug, ThisError)]
pub enum TestUtilsError {
    #[error("Logging error: {0}")]
    LoggingError(String),
    #[error("Fixture {name} is not valid: {source}")]
    FixtureError {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}
