//! Type-shape classification
//!
//! Maps every type-expression form to one of three shapes, which is all the
//! tag rule needs to know about a field's type:
//!
//! - **Value**: the zero value is indistinguishable from "absent" (scalars,
//!   named types, by-value aggregates like `time.Time`, inline structs).
//! - **Nullable**: a pointer, which can represent explicit absence.
//! - **Composite**: slices, maps, interfaces, and channels, whose empty
//!   state already serializes as absent.
//!
//! Classification is total and pure: it never fails, never caches, and the
//! raw-bytes exclusion (`json.RawMessage`) is deliberately not part of it.
//! The evaluator applies [`ExcludedTypes`] as an independent skip before
//! classifying, so the mapping stays exactly three-way.

use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;

use crate::ast::TypeExpr;

/// Three-way shape of a field's declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeShape {
    /// Zero value and "absent" coincide; an omit marker is meaningless.
    Value,
    /// Single-level pointer; absence is representable and should be omitted.
    Nullable,
    /// Inherently absent-capable; the rule imposes no constraint.
    Composite,
}

/// Classifies a type-expression. Total and deterministic; unrecognized
/// syntactic forms fall back to [`TypeShape::Value`] so the rule fails
/// closed instead of crashing.
pub fn classify(ty: &TypeExpr) -> TypeShape {
    match ty {
        TypeExpr::Pointer(_) => TypeShape::Nullable,
        TypeExpr::Array { .. } => TypeShape::Composite,
        TypeExpr::Map { .. } => TypeShape::Composite,
        TypeExpr::Interface => TypeShape::Composite,
        TypeExpr::Chan { .. } => TypeShape::Composite,
        // Qualified references are by-value aggregates; the raw-bytes
        // exclusion is the evaluator's pre-check, not a fourth shape.
        TypeExpr::Selector { .. } => TypeShape::Value,
        TypeExpr::Ident(_) => TypeShape::Value,
        TypeExpr::Struct(_) => TypeShape::Value,
        TypeExpr::Other => TypeShape::Value,
    }
}

/// Fully-qualified type names excluded from checking altogether.
///
/// These are pre-serialized opaque payload types whose omit behavior is the
/// caller's responsibility. Matching is purely syntactic against the
/// qualified selector form, so only `pkg.Name` references can be excluded.
#[derive(Debug, Clone)]
pub struct ExcludedTypes {
    names: FxHashSet<String>,
}

impl ExcludedTypes {
    /// Builds a set from fully-qualified names like `"json.RawMessage"`.
    pub fn new<I, S>(names: I) -> ExcludedTypes
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ExcludedTypes {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// An empty set: nothing is excluded.
    pub fn none() -> ExcludedTypes {
        ExcludedTypes {
            names: FxHashSet::default(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    /// Whether this type-expression is an excluded qualified reference.
    pub fn contains(&self, ty: &TypeExpr) -> bool {
        match ty.qualified_name() {
            Some(qualified) => self.names.contains(&qualified),
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for ExcludedTypes {
    fn default() -> Self {
        ExcludedTypes::new(["json.RawMessage"])
    }
}

static DEFAULT_EXCLUSIONS: Lazy<ExcludedTypes> = Lazy::new(ExcludedTypes::default);

/// Shared default exclusion set (`json.RawMessage` only).
pub fn default_exclusions() -> &'static ExcludedTypes {
    &DEFAULT_EXCLUSIONS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_is_nullable() {
        assert_eq!(
            classify(&TypeExpr::pointer(TypeExpr::ident("string"))),
            TypeShape::Nullable
        );
    }

    #[test]
    fn test_outer_pointer_wins_over_inner_shape() {
        // The rule only looks at the outermost level of indirection.
        assert_eq!(
            classify(&TypeExpr::pointer(TypeExpr::pointer(TypeExpr::ident("int")))),
            TypeShape::Nullable
        );
        assert_eq!(
            classify(&TypeExpr::pointer(TypeExpr::slice(TypeExpr::ident("int")))),
            TypeShape::Nullable
        );
    }

    #[test]
    fn test_sequences_and_maps_are_composite() {
        assert_eq!(
            classify(&TypeExpr::slice(TypeExpr::ident("string"))),
            TypeShape::Composite
        );
        assert_eq!(
            classify(&TypeExpr::array(16, TypeExpr::ident("byte"))),
            TypeShape::Composite
        );
        assert_eq!(
            classify(&TypeExpr::map(TypeExpr::ident("string"), TypeExpr::ident("int"))),
            TypeShape::Composite
        );
    }

    #[test]
    fn test_interface_and_chan_are_composite() {
        assert_eq!(classify(&TypeExpr::Interface), TypeShape::Composite);
        assert_eq!(
            classify(&TypeExpr::chan(TypeExpr::ident("int"))),
            TypeShape::Composite
        );
    }

    #[test]
    fn test_identifiers_are_value() {
        for name in ["int", "string", "bool", "float64", "CustomType", "any", "error"] {
            assert_eq!(classify(&TypeExpr::ident(name)), TypeShape::Value, "{}", name);
        }
    }

    #[test]
    fn test_qualified_references_are_value() {
        assert_eq!(
            classify(&TypeExpr::selector("time", "Time")),
            TypeShape::Value
        );
        // Exclusion is not classification: the raw-bytes type still has a
        // shape even though the evaluator never checks it.
        assert_eq!(
            classify(&TypeExpr::selector("json", "RawMessage")),
            TypeShape::Value
        );
    }

    #[test]
    fn test_inline_struct_is_value() {
        assert_eq!(classify(&TypeExpr::Struct(Vec::new())), TypeShape::Value);
    }

    #[test]
    fn test_unrecognized_forms_fail_closed_to_value() {
        assert_eq!(classify(&TypeExpr::Other), TypeShape::Value);
    }

    #[test]
    fn test_default_exclusions_cover_raw_message() {
        let exclusions = default_exclusions();
        assert!(exclusions.contains(&TypeExpr::selector("json", "RawMessage")));
        assert!(!exclusions.contains(&TypeExpr::selector("time", "Time")));
        assert_eq!(exclusions.len(), 1);
    }

    #[test]
    fn test_exclusions_only_match_selector_forms() {
        let exclusions = ExcludedTypes::new(["json.RawMessage", "RawMessage"]);
        // A plain identifier never matches, even with a same-named entry.
        assert!(!exclusions.contains(&TypeExpr::ident("RawMessage")));
        // Neither does a pointer to an excluded type; the pointer is checked
        // as a pointer.
        assert!(!exclusions.contains(&TypeExpr::pointer(TypeExpr::selector(
            "json",
            "RawMessage"
        ))));
    }

    #[test]
    fn test_custom_exclusion_set() {
        let mut exclusions = ExcludedTypes::none();
        assert!(exclusions.is_empty());
        exclusions.insert("pb.Any");
        assert!(exclusions.contains(&TypeExpr::selector("pb", "Any")));
        assert!(!exclusions.contains(&TypeExpr::selector("json", "RawMessage")));
    }
}
