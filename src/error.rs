use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum RuleError {
    /// No daily bars were supplied to build an evaluation context
    #[error("No bars available")]
    NoBars,

    /// Expression text could not be tokenized or parsed
    #[error("Expression parse error: {context}")]
    Parse {
        /// Error context
        context: String,
    },

    /// Expression referenced a function that is not in the function table
    #[error("Unknown function: {name}")]
    UnknownFunction {
        /// The function name that was not found
        name: String,
    },

    /// Division by zero inside an expression
    ///
    /// Intentionally fatal: a zero divisor in a rule plan is a programmer
    /// error, unlike data-driven missing values which propagate silently.
    #[error("Division by zero")]
    DivisionByZero,

    /// The receiver of an `[index]` read did not evaluate to a series
    #[error("Indexing requires a series")]
    IndexRequiresSeries,

    /// An expression operand had an unusable type for the operation
    #[error("Invalid expression operand: {context}")]
    InvalidOperand {
        /// Error context
        context: String,
    },

    /// A structured condition used an operator outside the supported set
    #[error("Unsupported operator: {op}")]
    UnsupportedOperator {
        /// The rejected operator
        op: String,
    },

    /// Indicator computation error
    #[error("Indicator error: {0}")]
    Indicator(#[from] crate::indicators::IndicatorError),

    /// Rule plan document error (malformed JSON or invalid shape)
    #[error("Invalid rule plan: {context}")]
    Plan {
        /// Error context
        context: String,
    },

    /// Position state string was neither `flat` nor `holding`
    #[error("position_state must be flat or holding")]
    InvalidPositionState,
}

/// Error category for logging and metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Caller supplied unusable inputs (bars, position state, plan document)
    Input,
    /// Expression text failed to tokenize or parse
    Parsing,
    /// Expression evaluated but hit a fatal runtime condition
    Evaluation,
    /// Indicator computation errors
    Indicator,
}

/// Result type alias for library operations
pub type Result<T> = std::result::Result<T, RuleError>;

impl RuleError {
    /// Create a parse error from a message
    pub fn parse(context: impl Into<String>) -> Self {
        Self::Parse {
            context: context.into(),
        }
    }

    /// Create an invalid-operand error from a message
    pub fn operand(context: impl Into<String>) -> Self {
        Self::InvalidOperand {
            context: context.into(),
        }
    }

    /// Create a rule plan error from a message
    pub fn plan(context: impl Into<String>) -> Self {
        Self::Plan {
            context: context.into(),
        }
    }

    /// Create an unknown-function error
    pub fn unknown_function(name: impl Into<String>) -> Self {
        Self::UnknownFunction { name: name.into() }
    }

    /// Create an unsupported-operator error
    pub fn unsupported_operator(op: impl Into<String>) -> Self {
        Self::UnsupportedOperator { op: op.into() }
    }

    /// Categorize errors for logging/metrics
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NoBars | Self::Plan { .. } | Self::InvalidPositionState => ErrorCategory::Input,
            Self::Parse { .. } => ErrorCategory::Parsing,
            Self::Indicator(_) => ErrorCategory::Indicator,
            Self::UnknownFunction { .. }
            | Self::DivisionByZero
            | Self::IndexRequiresSeries
            | Self::InvalidOperand { .. }
            | Self::UnsupportedOperator { .. } => ErrorCategory::Evaluation,
        }
    }
}
