//! Domain error types.

/// A parse error with position information for condition text.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("parse error at position {position}: {message}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    /// Format the error with a caret pointing at the error position in the input.
    /// `position` is a byte offset; the caret is indented by characters.
    pub fn display_with_context(&self, input: &str) -> String {
        let column = input
            .get(..self.position)
            .map_or(self.position, |prefix| prefix.chars().count());
        let caret = " ".repeat(column) + "^";
        format!(
            "{input}\n{caret}\n{err}",
            input = input,
            caret = caret,
            err = self
        )
    }
}

/// Top-level error type for stratsim.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("failed to parse {rule_set} rules: {source}")]
    ConditionParse {
        rule_set: String,
        #[source]
        source: ParseError,
    },

    #[error("price provider failed for {symbol}: {reason}")]
    Provider { symbol: String, reason: String },

    #[error("failed to write results: {reason}")]
    Report { reason: String },

    #[error("simulation aborted: {reason}")]
    Aborted { reason: String },

    #[error("simulation cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SimError {
    /// True for failures raised before the simulation loop starts.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SimError::ConfigParse { .. }
                | SimError::ConfigMissing { .. }
                | SimError::ConfigInvalid { .. }
                | SimError::ConditionParse { .. }
        )
    }
}

impl From<&SimError> for std::process::ExitCode {
    fn from(err: &SimError) -> Self {
        let code: u8 = match err {
            SimError::Io(_)
            | SimError::Report { .. }
            | SimError::Aborted { .. }
            | SimError::Cancelled => 1,
            SimError::ConfigParse { .. }
            | SimError::ConfigMissing { .. }
            | SimError::ConfigInvalid { .. } => 2,
            SimError::Provider { .. } => 3,
            SimError::ConditionParse { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
