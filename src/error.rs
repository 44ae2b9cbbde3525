use thiserror::Error;

/// Exit status reported for every failed run.
pub const FAILURE_EXIT_CODE: u8 = 255;

#[derive(Error, Debug)]
pub enum TemplateToolError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("API error {code}: {message} {data}")]
    Api {
        code: i64,
        message: String,
        data: String,
    },

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("Export date field not found in document")]
    MissingDateField,

    #[error("no templates found")]
    NoTemplatesFound,

    #[error("Invalid import rules: {0}")]
    InvalidRules(String),

    #[error("No input file given (use --file)")]
    MissingInputFile,

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

impl TemplateToolError {
    /// Process exit code for this error.
    ///
    /// All categories share one code so existing wrappers that only check
    /// for 255 keep working.
    pub fn exit_code(&self) -> u8 {
        FAILURE_EXIT_CODE
    }
}

impl From<ureq::Error> for TemplateToolError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, response) => {
                let body = response.into_string().unwrap_or_default();
                TemplateToolError::Http(format!("HTTP {}: {}", code, body.trim()))
            }
            ureq::Error::Transport(transport) => TemplateToolError::Http(transport.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, TemplateToolError>;
