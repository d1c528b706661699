use thiserror::Error;

/// Fatal errors for a single transcode call. None of these are retried
/// internally; the caller surfaces the message and aborts the operation.
/// Unknown property names, hidden elements and resource/theme references are
/// skipped silently and never reach this enum.
#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("malformed XML in element '{tag}': {detail}")]
    MalformedXml { tag: String, detail: String },

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("there must be at least one visible path")]
    NoVisiblePath,

    #[error("only solid colors can be animated, element: {element} property: '{property}'")]
    UnsupportedColorAnimation { element: String, property: String },

    #[error("fractions are not allowed for repeatCount: {0}")]
    InvalidRepeatCount(String),

    #[error("required attribute missing: {0}")]
    MissingRequiredAttribute(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TranscodeError {
    pub fn malformed_xml(tag: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::MalformedXml {
            tag: tag.into(),
            detail: detail.into(),
        }
    }

    pub fn invalid(detail: impl Into<String>) -> Self {
        Self::InvalidDocument(detail.into())
    }
}

pub type Result<T> = std::result::Result<T, TranscodeError>;
