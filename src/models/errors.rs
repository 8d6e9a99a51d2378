use alloy_primitives::B256;
use serde_json::Value;
use thiserror::Error;

/// Broad classification of a [`FormatError`], mirroring the error codes JSON-RPC
/// client libraries attach to data validation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    NumericFault,
    BadData,
}

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("{reason} (value={value})")]
    InvalidArgument { reason: String, value: Value },
    #[error("overflow (value={value})")]
    Overflow { value: Value },
    #[error("not an array")]
    NotAnArray { value: Value },
    #[error("not an object")]
    NotAnObject { value: Value },
    /// Raised by the object mapper when one of its fields fails. `value` is the whole raw
    /// record the field was read from.
    #[error("invalid value for value.{field} ({source})")]
    BadData {
        field: String,
        source: Box<FormatError>,
        value: Box<Value>,
    },
}

impl FormatError {
    pub fn invalid_argument(reason: impl Into<String>, value: &Value) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
            value: value.clone(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Overflow { .. } => ErrorKind::NumericFault,
            Self::BadData { .. } => ErrorKind::BadData,
            Self::InvalidArgument { .. } | Self::NotAnArray { .. } | Self::NotAnObject { .. } => {
                ErrorKind::InvalidArgument
            }
        }
    }

    /// Dotted path of the fields that led to the innermost failure, e.g. `logs.topics`.
    /// Empty for errors raised outside an object mapper.
    pub fn field_path(&self) -> String {
        let mut path = Vec::new();
        let mut current = self;
        while let Self::BadData { field, source, .. } = current {
            path.push(field.as_str());
            current = source;
        }
        path.join(".")
    }

    /// The innermost error, below every `BadData` layer.
    pub fn root_cause(&self) -> &FormatError {
        match self {
            Self::BadData { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// The raw value the error was raised for. For `BadData` this is the whole record.
    pub fn value(&self) -> &Value {
        match self {
            Self::InvalidArgument { value, .. }
            | Self::Overflow { value }
            | Self::NotAnArray { value }
            | Self::NotAnObject { value } => value,
            Self::BadData { value, .. } => value.as_ref(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Invalid receipt for transaction {hash}: {source}")]
    InvalidReceipt {
        hash: B256,
        #[source]
        source: FormatError,
    },
    /// The node answered with a JSON-RPC error. Sending the same request again gives the
    /// same answer.
    #[error("{method} rejected by node (code {code}): {message}")]
    Rpc {
        method: &'static str,
        code: i64,
        message: String,
    },
}
