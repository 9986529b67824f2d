//! Configuration errors.
//!
//! Everything here is a programmer mistake in the declared options (or an
//! error raised by user-supplied code). End-user mistakes such as a missing
//! required parameter never surface as an [`Error`]; they take the
//! print-and-exit path instead (see [`crate::Exit`]).

use thiserror::Error;

/// Errors returned by the dispatcher.
#[derive(Debug, Error)]
pub enum Error {
    /// `name` was set but empty or containing whitespace.
    #[error("Invalid script name: {0:?}")]
    InvalidScriptName(String),

    /// A command was declared with an empty or multi-word name.
    #[error("Invalid command name {0:?}. Command names must be one word.")]
    InvalidCommandName(String),

    /// Two commands share a name or alias.
    #[error("Duplicate command name found: {0:?}")]
    DuplicateCommand(String),

    /// A parameter pattern list could not be compiled.
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    /// Two parameters map to the same camel-cased key.
    #[error("Invalid parameter: {0:?} is used more than once.")]
    DuplicateParameter(String),

    /// The help document could not be rendered.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// A custom flag type rejected its input.
    #[error(transparent)]
    Flag(anyhow::Error),

    /// The callback failed before returning.
    #[error(transparent)]
    Callback(anyhow::Error),
}

/// Invalid parameter grammar. Parsing stops at the first problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error(
        "Invalid parameter: {0:?}. Must be wrapped in <> (required parameter) or [] (optional parameter)"
    )]
    NotWrapped(String),

    #[error(
        "Invalid parameter: Required parameter {required:?} cannot come after optional parameter {optional:?}"
    )]
    RequiredAfterOptional { required: String, optional: String },

    #[error("Invalid parameter: Spread parameter {0:?} must be last")]
    SpreadNotLast(String),

    #[error("Invalid parameter: {parameter:?}. Invalid character found {character:?}")]
    InvalidCharacter { parameter: String, character: String },
}

/// A help node could not be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// A custom node named a renderer that is not registered.
    #[error("Invalid node type: {0:?}")]
    UnknownNode(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_quote_names() {
        assert_eq!(
            Error::InvalidScriptName("a b".into()).to_string(),
            r#"Invalid script name: "a b""#
        );
        assert_eq!(
            Error::DuplicateCommand("duplicate".into()).to_string(),
            r#"Duplicate command name found: "duplicate""#
        );
        assert_eq!(
            Error::DuplicateParameter("value-a".into()).to_string(),
            r#"Invalid parameter: "value-a" is used more than once."#
        );
    }

    #[test]
    fn grammar_messages() {
        let err = GrammarError::RequiredAfterOptional {
            required: "<value-b>".into(),
            optional: "[value-a]".into(),
        };
        assert_eq!(
            err.to_string(),
            r#"Invalid parameter: Required parameter "<value-b>" cannot come after optional parameter "[value-a]""#
        );
        let err = GrammarError::InvalidCharacter {
            parameter: "[value.a]".into(),
            character: ".".into(),
        };
        assert_eq!(
            err.to_string(),
            r#"Invalid parameter: "[value.a]". Invalid character found ".""#
        );
    }
}
