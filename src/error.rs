use crate::c_ast::SourceLoc;
use thiserror::Error;

/// A recoverable translation failure.
///
/// Both kinds are caught at declaration boundaries: the failing decl is
/// replaced by a `@compileError` stub and translation continues with the
/// next declaration.
#[derive(Error, Debug, Clone)]
pub enum TranslationError {
    /// The type translator could not express a C type in Zig.
    #[error("unsupported type: {reason}")]
    UnsupportedType {
        reason: String,
        loc: Option<SourceLoc>,
    },
    /// The lowerer encountered a construct it cannot express.
    #[error("unsupported translation: {reason}")]
    UnsupportedTranslation {
        reason: String,
        loc: Option<SourceLoc>,
    },
}

impl TranslationError {
    pub fn unsupported_type(reason: impl Into<String>, loc: Option<SourceLoc>) -> Self {
        TranslationError::UnsupportedType {
            reason: reason.into(),
            loc,
        }
    }

    pub fn unsupported(reason: impl Into<String>, loc: Option<SourceLoc>) -> Self {
        TranslationError::UnsupportedTranslation {
            reason: reason.into(),
            loc,
        }
    }

    pub fn loc(&self) -> Option<&SourceLoc> {
        match self {
            TranslationError::UnsupportedType { loc, .. }
            | TranslationError::UnsupportedTranslation { loc, .. } => loc.as_ref(),
        }
    }
}

/// The main error type for the application.
#[derive(Error, Debug)]
pub enum Error {
    /// A failure while reading or writing files.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The front-end dump could not be decoded.
    #[error("invalid translation unit dump: {0}")]
    Decode(#[from] serde_json::Error),
    /// A translation failure that escaped decl-boundary recovery.
    #[error("{0}")]
    Translation(#[from] TranslationError),
}
