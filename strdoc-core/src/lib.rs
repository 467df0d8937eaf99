//! Document model and consistency validator for KoFIU suspicious transaction
//! reports (STR 5.0).
//!
//! The crate covers the structural side of the report format: closed code
//! tables, a typed document tree, a fail-fast builder, an exhaustive
//! validator with path-qualified diagnostics, and the XML exchange layer
//! (EUC-KR on the wire).
//!
//! # Examples
//! ```rust
//! use strdoc_core::codes::CodeRegistry;
//! use strdoc_core::document::validate;
//!
//! let codes = CodeRegistry::bundled();
//! let doc = strdoc_core::samples::personal(&codes).unwrap().into_inner();
//! assert!(validate::validate(&doc, &codes).is_empty());
//! ```
pub mod codes;
pub mod document;
pub mod samples;

use thiserror::Error;

/// Top-level error wrapper for core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Document(#[from] document::DocumentError),
    #[error(transparent)]
    Parse(#[from] document::xml::ParseError),
    #[error(transparent)]
    XmlWrite(#[from] document::xml::XmlWriteError),
}

#[cfg(test)]
mod tests {
    use super::Error;
    use crate::document::xml::{ParseError, XmlWriteError};
    use crate::document::DocumentError;
    use quick_xml::se::SeError;

    #[test]
    fn error_conversions_cover_variants() {
        let err: Error = DocumentError::MissingRequiredField { field: "Detail" }.into();
        assert!(matches!(err, Error::Document(_)));

        let err: Error = ParseError::MissingElement("Master").into();
        assert!(matches!(err, Error::Parse(_)));

        let err: Error = XmlWriteError::Serialize {
            source: SeError::Custom("xml".into()),
        }
        .into();
        assert!(matches!(err, Error::XmlWrite(_)));
    }
}
