//! # Compliance Data Snapshot
//!
//! The per-loan, per-regulation record of disclosures, notices, dates, and
//! flags that the compliance engine evaluates. Owned by the loan; mutated
//! only through explicit per-regulation updates and never deleted.
//!
//! `BTreeMap` throughout — iteration order must be deterministic so that
//! two evaluation runs over unchanged data produce value-identical
//! violation lists.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::RegulationCode;

/// Field name → recorded value, for one regulation.
pub type RegulationFields = BTreeMap<String, Value>;

/// The compliance data snapshot for a loan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComplianceData {
    regulations: BTreeMap<RegulationCode, RegulationFields>,
}

impl ComplianceData {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded fields for a regulation. Absent regulations read as
    /// empty — a loan with no TRID data has simply recorded nothing yet.
    pub fn regulation(&self, code: RegulationCode) -> Option<&RegulationFields> {
        self.regulations.get(&code)
    }

    /// A single recorded field value.
    pub fn field(&self, code: RegulationCode, field: &str) -> Option<&Value> {
        self.regulations.get(&code).and_then(|m| m.get(field))
    }

    /// Whether a field is present, regardless of value. Prohibited-basis
    /// checks use presence, not truthiness: recording `marital_status:
    /// false` is still collection of a prohibited field.
    pub fn has_field(&self, code: RegulationCode, field: &str) -> bool {
        self.field(code, field).is_some()
    }

    /// Whether a field is present and truthy.
    ///
    /// Truthiness follows the conventions of the upstream intake forms:
    /// `null`, `false`, `0`, `""`, `"0"`, and empty arrays/objects are
    /// falsy; everything else is truthy.
    pub fn is_truthy(&self, code: RegulationCode, field: &str) -> bool {
        self.field(code, field).is_some_and(value_is_truthy)
    }

    /// Replace the full field set for one regulation. This is the only
    /// mutation path: compliance data is overwritten per-regulation, never
    /// partially edited in place and never deleted.
    pub fn set_regulation(&mut self, code: RegulationCode, fields: RegulationFields) {
        self.regulations.insert(code, fields);
    }

    /// Record a single field for a regulation.
    pub fn set_field(&mut self, code: RegulationCode, field: impl Into<String>, value: Value) {
        self.regulations
            .entry(code)
            .or_default()
            .insert(field.into(), value);
    }

    /// Regulations with any recorded data, in code order.
    pub fn recorded_regulations(&self) -> impl Iterator<Item = RegulationCode> + '_ {
        self.regulations.keys().copied()
    }
}

/// Truthiness for recorded snapshot values.
fn value_is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
