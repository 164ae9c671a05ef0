use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Could not parse input \"{0}\"")]
    Syntax(String),

    #[error("Could not parse remaining input \"{0}\"")]
    Incomplete(String),

    #[error("Invalid value \"{value}\" for attribute {name}")]
    InvalidAttribute { name: String, value: String },

    #[error("Transition from {from} to {to} refers to an undefined location")]
    UndefinedLocation { from: String, to: String },
}
