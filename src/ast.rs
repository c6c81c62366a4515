//! Syntax-tree model for record declarations
//!
//! The minimal slice of a Go-style syntax tree the rule needs: type
//! declarations, struct field lists, and the closed set of type-expression
//! forms a struct field can carry. The tree is produced by an external
//! collaborator (or by the fixture parser in `test_utils`); this crate never
//! parses source text itself.

use std::fmt;

/// Source position of a declaration, 1-based like compiler output.
///
/// The zero value means "position unknown".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: u32,   // 1-based line number
    pub column: u32, // 1-based column number
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Position { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Channel direction as written in the source (`chan T`, `chan<- T`, `<-chan T`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

/// The closed set of type-expression forms a struct field can carry.
///
/// Mirrors the host grammar's field-type productions. Forms the rule has no
/// special handling for (function types, generic instantiations,
/// parenthesized types) are represented by [`TypeExpr::Other`] so that
/// classification stays total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// Plain identifier: a builtin scalar (`int`, `string`, `bool`) or any
    /// named type in the same package, including `any` and `error`.
    Ident(String),
    /// Single-level pointer: `*T`.
    Pointer(Box<TypeExpr>),
    /// Array or slice: `[N]T` when `len` is present, `[]T` otherwise.
    Array {
        len: Option<u64>,
        elem: Box<TypeExpr>,
    },
    /// Associative map: `map[K]V`.
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
    },
    /// Interface type, including the empty interface literal.
    Interface,
    /// Channel type with its declared direction.
    Chan {
        dir: ChanDir,
        elem: Box<TypeExpr>,
    },
    /// Qualified reference to a type in another package: `pkg.Name`.
    Selector { package: String, name: String },
    /// Inline anonymous struct with its own field list.
    Struct(Vec<Field>),
    /// Any other syntactic form (function types, generic instantiations,
    /// parenthesized types).
    Other,
}

impl TypeExpr {
    pub fn ident(name: impl Into<String>) -> TypeExpr {
        TypeExpr::Ident(name.into())
    }

    pub fn pointer(inner: TypeExpr) -> TypeExpr {
        TypeExpr::Pointer(Box::new(inner))
    }

    pub fn slice(elem: TypeExpr) -> TypeExpr {
        TypeExpr::Array {
            len: None,
            elem: Box::new(elem),
        }
    }

    pub fn array(len: u64, elem: TypeExpr) -> TypeExpr {
        TypeExpr::Array {
            len: Some(len),
            elem: Box::new(elem),
        }
    }

    pub fn map(key: TypeExpr, value: TypeExpr) -> TypeExpr {
        TypeExpr::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn chan(elem: TypeExpr) -> TypeExpr {
        TypeExpr::Chan {
            dir: ChanDir::Both,
            elem: Box::new(elem),
        }
    }

    pub fn selector(package: impl Into<String>, name: impl Into<String>) -> TypeExpr {
        TypeExpr::Selector {
            package: package.into(),
            name: name.into(),
        }
    }

    /// Fully-qualified name of a selector form (`time.Time`), `None` for
    /// every other form.
    pub fn qualified_name(&self) -> Option<String> {
        match self {
            TypeExpr::Selector { package, name } => Some(format!("{}.{}", package, name)),
            _ => None,
        }
    }

    /// Base identifier an embedded field of this type would be known by:
    /// the identifier itself, the selector's member name, or the base of the
    /// pointed-to type. Forms that cannot appear as embedded fields yield
    /// `None`.
    pub fn base_name(&self) -> Option<&str> {
        match self {
            TypeExpr::Ident(name) => Some(name),
            TypeExpr::Selector { name, .. } => Some(name),
            TypeExpr::Pointer(inner) => inner.base_name(),
            _ => None,
        }
    }
}

/// One entry of a struct's field list.
///
/// `name` is `None` for embedded (anonymous) fields. A declaration naming
/// several fields at once (`A, B int`) is represented by the collaborator as
/// one entry per name, sharing the tag and position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: Option<String>,
    pub ty: TypeExpr,
    /// Raw tag string as written between the backquotes, if any.
    pub tag: Option<String>,
    pub pos: Position,
}

impl Field {
    pub fn named(name: impl Into<String>, ty: TypeExpr) -> Field {
        Field {
            name: Some(name.into()),
            ty,
            tag: None,
            pos: Position::default(),
        }
    }

    pub fn embedded(ty: TypeExpr) -> Field {
        Field {
            name: None,
            ty,
            tag: None,
            pos: Position::default(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Field {
        self.tag = Some(tag.into());
        self
    }

    pub fn at(mut self, line: u32, column: u32) -> Field {
        self.pos = Position::new(line, column);
        self
    }

    /// Label used in diagnostics: the field name, or for embedded fields the
    /// base name of the declared type with any leading `*` stripped.
    pub fn label(&self) -> &str {
        match &self.name {
            Some(name) => name,
            // Embedded forms other than a (possibly pointered) identifier or
            // selector are not valid syntax; "_" is unreachable on
            // well-formed input.
            None => self.ty.base_name().unwrap_or("_"),
        }
    }
}

/// A single `type Name = ...` / `type Name ...` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub name: String,
    pub ty: TypeExpr,
    pub pos: Position,
}

impl TypeDecl {
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> TypeDecl {
        TypeDecl {
            name: name.into(),
            ty,
            pos: Position::default(),
        }
    }

    pub fn at(mut self, line: u32, column: u32) -> TypeDecl {
        self.pos = Position::new(line, column);
        self
    }
}

/// All type declarations of one parsed source file, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFile {
    pub decls: Vec<TypeDecl>,
}

impl SourceFile {
    pub fn new(decls: Vec<TypeDecl>) -> SourceFile {
        SourceFile { decls }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_display() {
        assert_eq!(Position::new(12, 3).to_string(), "12:3");
    }

    #[test]
    fn test_qualified_name() {
        assert_eq!(
            TypeExpr::selector("time", "Time").qualified_name(),
            Some("time.Time".to_string())
        );
        assert_eq!(TypeExpr::ident("int").qualified_name(), None);
    }

    #[test]
    fn test_label_named_field() {
        let field = Field::named("ID", TypeExpr::ident("int"));
        assert_eq!(field.label(), "ID");
    }

    #[test]
    fn test_label_embedded_ident() {
        let field = Field::embedded(TypeExpr::ident("Base"));
        assert_eq!(field.label(), "Base");
    }

    #[test]
    fn test_label_embedded_pointer_to_selector() {
        let field = Field::embedded(TypeExpr::pointer(TypeExpr::selector("pkg", "Base")));
        assert_eq!(field.label(), "Base");
    }

    #[test]
    fn test_label_unnameable_embedded_falls_back() {
        let field = Field::embedded(TypeExpr::slice(TypeExpr::ident("int")));
        assert_eq!(field.label(), "_");
    }

    #[test]
    fn test_constructors_build_expected_shapes() {
        assert_eq!(
            TypeExpr::slice(TypeExpr::ident("string")),
            TypeExpr::Array {
                len: None,
                elem: Box::new(TypeExpr::Ident("string".to_string())),
            }
        );
        assert_eq!(
            TypeExpr::array(4, TypeExpr::ident("byte")),
            TypeExpr::Array {
                len: Some(4),
                elem: Box::new(TypeExpr::Ident("byte".to_string())),
            }
        );
        assert_eq!(
            TypeExpr::chan(TypeExpr::ident("int")),
            TypeExpr::Chan {
                dir: ChanDir::Both,
                elem: Box::new(TypeExpr::Ident("int".to_string())),
            }
        );
    }
}
