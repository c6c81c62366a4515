//! Tag rule evaluation.
//!
//! Walks a record type's field list, derives a [`FieldTagInfo`] per field,
//! and reports fields whose omit marker disagrees with their type shape.
//! Evaluation is a pure pass: no state is kept between calls, so the same
//! field list and policy always produce the same diagnostic sequence, and
//! independent record types can be checked concurrently.

use tracing::{debug, trace};

use crate::ast::{Field, SourceFile, TypeExpr};
use crate::classify::{ExcludedTypes, TypeShape, classify};
use crate::diagnostic::Diagnostic;
use crate::policy::Policy;
use crate::tag::JsonTag;

/// Everything the rule needs to know about one field, derived in a single
/// look at its tag and type. Ephemeral; recomputed per evaluation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTagInfo {
    /// Diagnostic label: the field name, or the type's base name for an
    /// embedded field.
    pub field_name: String,
    /// Tag present, names a serialization key, and the key is neither empty
    /// nor the `-` skip sentinel.
    pub has_serialization_key: bool,
    /// The omit marker appears anywhere in the serialization key's value.
    pub has_omit_marker: bool,
    pub shape: TypeShape,
}

impl FieldTagInfo {
    /// Derives the per-field facts the policy step consumes.
    pub fn examine(field: &Field) -> FieldTagInfo {
        let json_tag = field.tag.as_deref().and_then(JsonTag::from_tag);
        let (has_serialization_key, has_omit_marker) = match &json_tag {
            Some(tag) if !tag.is_empty() && !tag.is_skip() => (true, tag.has_omitempty()),
            _ => (false, false),
        };
        FieldTagInfo {
            field_name: field.label().to_string(),
            has_serialization_key,
            has_omit_marker,
            shape: classify(&field.ty),
        }
    }
}

/// Checks one record type's field list in declaration order.
///
/// Returns a lazy iterator; each call starts a fresh pass, so the sequence
/// is restartable by calling again with the same inputs.
pub fn check_struct_fields<'a>(
    fields: &'a [Field],
    policy: Policy,
    excluded: &'a ExcludedTypes,
) -> impl Iterator<Item = Diagnostic> + 'a {
    fields
        .iter()
        .filter_map(move |field| check_field(field, policy, excluded))
}

/// Checks every struct declaration in a file, in tree order.
pub fn check_file(file: &SourceFile, policy: Policy, excluded: &ExcludedTypes) -> Vec<Diagnostic> {
    debug!(decls = file.decls.len(), "checking file");
    let mut diagnostics = Vec::new();
    for decl in &file.decls {
        if let TypeExpr::Struct(fields) = &decl.ty {
            trace!(type_name = %decl.name, fields = fields.len(), "checking struct declaration");
            diagnostics.extend(check_struct_fields(fields, policy, excluded));
        }
    }
    diagnostics
}

fn check_field(field: &Field, policy: Policy, excluded: &ExcludedTypes) -> Option<Diagnostic> {
    let info = FieldTagInfo::examine(field);
    if !info.has_serialization_key {
        return None;
    }
    // The exclusion is independent of shape: an excluded type is never
    // checked, whatever its tag says.
    if excluded.contains(&field.ty) {
        trace!(field = %info.field_name, "skipping excluded type");
        return None;
    }
    match info.shape {
        TypeShape::Value if info.has_omit_marker && policy.unnecessary => Some(Diagnostic::new(
            field.pos,
            unnecessary_message(&info.field_name),
        )),
        TypeShape::Nullable if !info.has_omit_marker && policy.missing => {
            Some(Diagnostic::new(field.pos, missing_message(&info.field_name)))
        }
        _ => None,
    }
}

fn unnecessary_message(name: &str) -> String {
    format!("field {name}: value type should not use omitempty")
}

fn missing_message(name: &str) -> String {
    format!("field {name}: pointer type should use omitempty")
}
