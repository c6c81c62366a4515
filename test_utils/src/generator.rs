//! Random struct-field generation for property-based tests.
//!
//! Produces type expressions covering every syntactic form the classifier
//! dispatches over, JSON tags in all their edge-case spellings, and whole
//! field lists. A renderer turns generated fields back into fixture source
//! so the fixture parser can be exercised against the same inputs.

use omitempty_lint::ast::{ChanDir, Field, TypeExpr};
use quickcheck::{Arbitrary, Gen};

/// Maximum nesting depth for generated type expressions.
const MAX_DEPTH: usize = 3;

const FIELD_NAMES: &[&str] = &[
    "ID", "Name", "Title", "Count", "Score", "Data", "Meta", "Tags", "Value", "Extra",
];

const SCALAR_NAMES: &[&str] = &[
    "int", "int64", "string", "bool", "float64", "byte", "CustomType", "any", "error",
];

const SELECTOR_NAMES: &[(&str, &str)] = &[
    ("time", "Time"),
    ("url", "URL"),
    ("json", "RawMessage"),
    ("pb", "Timestamp"),
];

const TAG_NAMES: &[&str] = &["id", "name", "title", "count", "data", "meta", "tags", "score"];

/// Generates a random number in the range [min, max] inclusive.
fn gen_range(g: &mut Gen, min: u32, max: u32) -> u32 {
    min + (u32::arbitrary(g) % (max - min + 1))
}

/// Generates a leaf type: a plain identifier or a qualified name.
fn gen_leaf_type(g: &mut Gen) -> TypeExpr {
    if bool::arbitrary(g) {
        TypeExpr::ident(*g.choose(SCALAR_NAMES).unwrap())
    } else {
        let (package, name) = *g.choose(SELECTOR_NAMES).unwrap();
        TypeExpr::selector(package, name)
    }
}

/// Generates a type expression with the given maximum depth.
pub fn gen_type_expr(g: &mut Gen, depth: usize) -> TypeExpr {
    if depth == 0 {
        return gen_leaf_type(g);
    }

    const CHOICES: &[&str] = &[
        "leaf", "leaf", "pointer", "pointer", "slice", "array", "map", "chan", "interface",
        "struct", "func",
    ];
    match *g.choose(CHOICES).unwrap() {
        "leaf" => gen_leaf_type(g),
        "pointer" => TypeExpr::pointer(gen_type_expr(g, depth - 1)),
        "slice" => TypeExpr::slice(gen_type_expr(g, depth - 1)),
        "array" => {
            TypeExpr::array(gen_range(g, 1, 16) as u64, gen_type_expr(g, depth - 1))
        }
        "map" => TypeExpr::map(TypeExpr::ident("string"), gen_type_expr(g, depth - 1)),
        "chan" => {
            const DIRS: &[ChanDir] = &[ChanDir::Both, ChanDir::Send, ChanDir::Recv];
            TypeExpr::Chan {
                dir: *g.choose(DIRS).unwrap(),
                elem: Box::new(gen_type_expr(g, depth - 1)),
            }
        }
        "interface" => TypeExpr::Interface,
        "func" => TypeExpr::Other,
        "struct" => {
            let members = (0..gen_range(g, 0, 2))
                .map(|_| {
                    Field::named(*g.choose(FIELD_NAMES).unwrap(), gen_type_expr(g, depth - 1))
                })
                .collect();
            TypeExpr::Struct(members)
        }
        _ => unreachable!(),
    }
}

/// Generates a raw tag literal, or `None` for an untagged field.
pub fn gen_json_tag(g: &mut Gen) -> Option<String> {
    const CHOICES: &[&str] = &[
        "plain", "plain", "omitempty", "omitempty", "skip", "empty", "none", "other_key",
    ];
    let name = *g.choose(TAG_NAMES).unwrap();
    match *g.choose(CHOICES).unwrap() {
        "plain" => Some(format!("`json:\"{name}\"`")),
        "omitempty" => Some(format!("`json:\"{name},omitempty\"`")),
        "skip" => Some("`json:\"-\"`".to_string()),
        "empty" => Some("`json:\"\"`".to_string()),
        "none" => None,
        "other_key" => Some(format!("`yaml:\"{name}\"`")),
        _ => unreachable!(),
    }
}

/// Generates one struct field: usually named, occasionally embedded.
pub fn gen_field(g: &mut Gen, depth: usize) -> Field {
    let field = if gen_range(g, 0, 9) == 0 {
        let base = if bool::arbitrary(g) {
            TypeExpr::ident(*g.choose(&["Meta", "Base", "Header"]).unwrap())
        } else {
            let (package, name) = *g.choose(SELECTOR_NAMES).unwrap();
            TypeExpr::selector(package, name)
        };
        let ty = if bool::arbitrary(g) { TypeExpr::pointer(base) } else { base };
        Field::embedded(ty)
    } else {
        Field::named(*g.choose(FIELD_NAMES).unwrap(), gen_type_expr(g, depth))
    };
    match gen_json_tag(g) {
        Some(tag) => field.with_tag(tag),
        None => field,
    }
}

pub fn gen_field_list(g: &mut Gen, depth: usize) -> Vec<Field> {
    (0..gen_range(g, 0, 8)).map(|_| gen_field(g, depth)).collect()
}

/// `TypeExpr` with an `Arbitrary` instance.
#[derive(Debug, Clone)]
pub struct ArbitraryTypeExpr(pub TypeExpr);

impl Arbitrary for ArbitraryTypeExpr {
    fn arbitrary(g: &mut Gen) -> Self {
        ArbitraryTypeExpr(gen_type_expr(g, g.size().min(MAX_DEPTH)))
    }
}

/// A single struct field with an `Arbitrary` instance.
#[derive(Debug, Clone)]
pub struct ArbitraryField(pub Field);

impl Arbitrary for ArbitraryField {
    fn arbitrary(g: &mut Gen) -> Self {
        ArbitraryField(gen_field(g, g.size().min(MAX_DEPTH)))
    }
}

/// A whole field list with an `Arbitrary` instance.
#[derive(Debug, Clone)]
pub struct ArbitraryFieldList(pub Vec<Field>);

impl Arbitrary for ArbitraryFieldList {
    fn arbitrary(g: &mut Gen) -> Self {
        ArbitraryFieldList(gen_field_list(g, g.size().min(MAX_DEPTH)))
    }
}

/// Renders a type expression back to Go syntax.
///
/// A channel element that is itself a channel is parenthesized, otherwise
/// the `<-` would bind to the outer `chan` when reparsed.
pub fn render_type(ty: &TypeExpr) -> String {
    match ty {
        TypeExpr::Ident(name) => name.clone(),
        TypeExpr::Pointer(inner) => format!("*{}", render_type(inner)),
        TypeExpr::Array { len: None, elem } => format!("[]{}", render_type(elem)),
        TypeExpr::Array { len: Some(len), elem } => {
            format!("[{len}]{}", render_type(elem))
        }
        TypeExpr::Map { key, value } => {
            format!("map[{}]{}", render_type(key), render_type(value))
        }
        TypeExpr::Interface => "interface{}".to_string(),
        TypeExpr::Chan { dir, elem } => {
            let elem_src = if matches!(**elem, TypeExpr::Chan { .. }) {
                format!("({})", render_type(elem))
            } else {
                render_type(elem)
            };
            match dir {
                ChanDir::Both => format!("chan {elem_src}"),
                ChanDir::Send => format!("chan<- {elem_src}"),
                ChanDir::Recv => format!("<-chan {elem_src}"),
            }
        }
        TypeExpr::Selector { package, name } => format!("{package}.{name}"),
        TypeExpr::Struct(members) => {
            if members.is_empty() {
                return "struct{}".to_string();
            }
            let rendered: Vec<String> = members.iter().map(render_member).collect();
            format!("struct{{ {} }}", rendered.join("; "))
        }
        TypeExpr::Other => "func()".to_string(),
    }
}

fn render_member(field: &Field) -> String {
    match &field.name {
        Some(name) => format!("{} {}", name, render_type(&field.ty)),
        None => render_type(&field.ty),
    }
}

/// Renders a field list as a complete fixture file declaring one struct.
pub fn render_struct_file(type_name: &str, fields: &[Field]) -> String {
    let mut out = String::from("package main\n\n");
    out.push_str(&format!("type {type_name} struct {{\n"));
    for field in fields {
        out.push('\t');
        if let Some(name) = &field.name {
            out.push_str(name);
            out.push(' ');
        }
        out.push_str(&render_type(&field.ty));
        if let Some(tag) = &field.tag {
            out.push(' ');
            out.push_str(tag);
        }
        out.push('\n');
    }
    out.push_str("}\n");
    out
}
