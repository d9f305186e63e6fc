//! Compiled CIP-36 grammars.
//!
//! Grammars are loaded once at startup and never mutated. A [`SchemaSet`]
//! is `Send + Sync` and is meant to be shared by reference across every
//! record that needs validation.
//!
//! Validation fails closed. Bytes are first checked for well-formedness with
//! the strict core decoder, then matched against the grammar, then read
//! through the typed payload view for constraints the grammar engine does
//! not enforce.

use std::fs;

use cddl::ast::CDDL;
use cddl::validator::cbor::{self, CBORValidator};
use cddl::validator::Validator;
use cip36_core::{codec, metadata_body, MetadataKind, Registration, Value};

use crate::config::SchemaConfig;
use crate::error::{SchemaError, SchemaLoadError};

/// The compiled grammar for one metadata kind.
///
/// The text is parsed once in [`Schema::load`] and the syntax tree is kept
/// for every later validation. The tree borrows the text, so the text is
/// leaked: grammars are loaded at startup and live for the process.
#[derive(Debug, Clone)]
pub struct Schema {
    kind: MetadataKind,
    source: &'static str,
    grammar: CDDL<'static>,
}

impl Schema {
    /// Compile grammar text for `kind`.
    pub fn load(grammar: impl Into<String>, kind: MetadataKind) -> Result<Self, SchemaLoadError> {
        let source: &'static str = Box::leak(grammar.into().into_boxed_str());
        let grammar = cddl::cddl_from_str(source, false)
            .map_err(|reason| SchemaLoadError::InvalidGrammar { kind, reason })?;
        Ok(Self {
            kind,
            source,
            grammar,
        })
    }

    pub fn kind(&self) -> MetadataKind {
        self.kind
    }

    /// The grammar text.
    pub fn source(&self) -> &str {
        self.source
    }

    /// The compiled rules.
    pub fn grammar(&self) -> &CDDL<'static> {
        &self.grammar
    }

    /// Check payload bytes against this grammar.
    pub fn validate(&self, bytes: &[u8]) -> Result<(), SchemaError> {
        let value = codec::decode(bytes).map_err(|source| SchemaError::Malformed {
            kind: self.kind,
            source,
        })?;

        self.match_grammar(value.clone())?;
        self.check_fields(&value)
    }

    fn match_grammar(&self, value: Value) -> Result<(), SchemaError> {
        let mut validator = CBORValidator::new(&self.grammar, value, None);
        let outcome: Result<(), cbor::Error<std::io::Error>> = validator.validate();
        outcome.map_err(|e| self.violation(e.to_string()))
    }

    /// `uint .size 4` is not enforced by the grammar engine, so delegation
    /// weights are range-checked by reading the registration.
    fn check_fields(&self, value: &Value) -> Result<(), SchemaError> {
        if !matches!(self.kind, MetadataKind::Registration) {
            return Ok(());
        }
        let body = metadata_body(value, self.kind)
            .ok_or_else(|| self.violation(format!("missing label {}", self.kind.label())))?;
        Registration::from_body(body)
            .map(|_| ())
            .map_err(|e| self.violation(e.to_string()))
    }

    fn violation(&self, reason: String) -> SchemaError {
        SchemaError::Violation {
            kind: self.kind,
            reason,
        }
    }
}

/// Grammars for all three metadata kinds.
#[derive(Debug, Clone)]
pub struct SchemaSet {
    registration: Schema,
    witness: Schema,
    deregistration: Schema,
}

impl SchemaSet {
    /// Read and compile the three grammar files named by `config`.
    ///
    /// Any missing or unparseable file is an error.
    pub fn load(config: &SchemaConfig) -> Result<Self, SchemaLoadError> {
        let read = |kind: MetadataKind| {
            let path = config.path(kind);
            let text = fs::read_to_string(&path)
                .map_err(|source| SchemaLoadError::Io { kind, path: path.clone(), source })?;
            tracing::debug!(%kind, path = %path.display(), "loaded grammar");
            Schema::load(text, kind)
        };

        Ok(Self {
            registration: read(MetadataKind::Registration)?,
            witness: read(MetadataKind::Witness)?,
            deregistration: read(MetadataKind::Deregistration)?,
        })
    }

    /// Compile grammars from in-memory text.
    pub fn from_sources(
        registration: &str,
        witness: &str,
        deregistration: &str,
    ) -> Result<Self, SchemaLoadError> {
        Ok(Self {
            registration: Schema::load(registration, MetadataKind::Registration)?,
            witness: Schema::load(witness, MetadataKind::Witness)?,
            deregistration: Schema::load(deregistration, MetadataKind::Deregistration)?,
        })
    }

    pub fn schema(&self, kind: MetadataKind) -> &Schema {
        match kind {
            MetadataKind::Registration => &self.registration,
            MetadataKind::Witness => &self.witness,
            MetadataKind::Deregistration => &self.deregistration,
        }
    }

    /// Validate payload bytes against the grammar for `kind`.
    pub fn validate(&self, kind: MetadataKind, bytes: &[u8]) -> Result<(), SchemaError> {
        self.schema(kind).validate(bytes)
    }
}
