//! Error types for the controllability search.
//!
//! Input problems are reported as [`ValidationError`]s before any matrix is
//! built. Failures that surface mid-run are [`ControlError`]s. Cancellation is
//! not an error: a cancelled run still returns its best solution.

/// Primary error type for a controllability run.
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    /// The caller supplied an invalid problem; nothing was computed.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    /// A rank computation encountered a non-finite value.
    ///
    /// Well-formed inputs never produce this; it means a matrix construction
    /// invariant was broken and the run is abandoned.
    #[error("numerical instability: {detail}")]
    NumericalInstability {
        /// Human-readable explanation.
        detail: String,
    },

    /// The worker pool for the parallel search could not be created.
    #[error("thread pool error: {0}")]
    ThreadPool(String),
}

/// Validation errors for controllability inputs.
///
/// These are raised eagerly so that callers get one clear reason per violated
/// precondition rather than a failure deep inside the search.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A required list is empty.
    #[error("the list of {0} is empty")]
    EmptyInput(String),

    /// A parameter is outside its valid range.
    #[error("parameter out of range: {name} = {value} (expected {expected})")]
    ParameterOutOfRange {
        /// Name of the parameter.
        name: String,
        /// The invalid value (as a string for flexibility).
        value: String,
        /// Human-readable description of the valid range.
        expected: String,
    },

    /// A label referenced by an edge, target or source is not a network node.
    #[error("{role} node '{label}' is not part of the network")]
    UnknownNode {
        /// Where the label was referenced ("edge", "target" or "source").
        role: String,
        /// The offending label.
        label: String,
    },

    /// The node list contains the same label twice.
    #[error("node '{0}' appears more than once in the node list")]
    DuplicateNode(String),

    /// A target or source label is listed more than once.
    #[error("{role} node '{label}' is listed more than once")]
    DuplicateLabel { role: String, label: String },

    /// The source set is too large to enumerate with a 64-bit subset mask.
    #[error("{count} source nodes exceed the supported maximum of {max}")]
    TooManySourceNodes {
        /// Number of source nodes supplied.
        count: usize,
        /// Largest supported source count.
        max: usize,
    },
}

impl ValidationError {
    pub(crate) fn out_of_range(
        name: &str,
        value: impl std::fmt::Display,
        expected: &str,
    ) -> Self {
        Self::ParameterOutOfRange {
            name: name.to_string(),
            value: value.to_string(),
            expected: expected.to_string(),
        }
    }
}
