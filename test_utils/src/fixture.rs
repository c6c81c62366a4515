//! Fixture parsing for rule tests.
//!
//! Reads the restricted Go subset the testdata packages are written in: a
//! package clause, imports, top-level type declarations, struct fields with
//! backquoted tags, and `// want` comments naming the diagnostic each
//! annotated line should produce. Only the syntax the fixtures actually use
//! is supported; anything else is a hard error, so a typo in a fixture fails
//! the test instead of silently checking nothing.

use anyhow::{Context, Result, bail};
use omitempty_lint::ast::{ChanDir, Field, SourceFile, TypeDecl, TypeExpr};

/// One expected diagnostic, read from a `// want` annotation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Want {
    pub line: u32,
    pub message: String,
}

/// A parsed fixture: declarations plus the expectations embedded in them.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub file: SourceFile,
    pub wants: Vec<Want>,
}

/// Keywords that open a type expression and can therefore never be a field
/// name in the fixture subset.
const TYPE_KEYWORDS: &[&str] = &["map", "chan", "interface", "struct", "func"];

/// Parses fixture source into declarations and want annotations.
pub fn parse_fixture(source: &str) -> Result<Fixture> {
    let lines: Vec<&str> = source.lines().collect();
    let mut decls = Vec::new();
    let mut wants = Vec::new();
    let mut i = 0usize;
    while i < lines.len() {
        let trimmed = lines[i].trim();
        if trimmed.is_empty()
            || trimmed.starts_with("//")
            || trimmed.starts_with("package ")
            || (trimmed.starts_with("import ") && !trimmed.contains('('))
        {
            i += 1;
        } else if trimmed.starts_with("import (") {
            i += 1;
            while i < lines.len() && lines[i].trim() != ")" {
                i += 1;
            }
            i += 1;
        } else if trimmed.starts_with("func ") {
            i = skip_braced_block(&lines, i);
        } else if trimmed.starts_with("type ") {
            i = parse_type_decl(&lines, i, &mut decls, &mut wants)?;
        } else {
            bail!("line {}: unsupported declaration: {}", i + 1, trimmed);
        }
    }
    Ok(Fixture { file: SourceFile::new(decls), wants })
}

/// Skips a brace-delimited block starting at `start`, returning the index of
/// the first line after it. Used for function bodies, which the rule never
/// inspects.
fn skip_braced_block(lines: &[&str], start: usize) -> usize {
    let mut depth = 0i32;
    let mut seen_open = false;
    let mut i = start;
    while i < lines.len() {
        for ch in lines[i].chars() {
            match ch {
                '{' => {
                    depth += 1;
                    seen_open = true;
                }
                '}' => depth -= 1,
                _ => {}
            }
        }
        i += 1;
        if seen_open && depth <= 0 {
            break;
        }
    }
    i
}

fn parse_type_decl(
    lines: &[&str],
    start: usize,
    decls: &mut Vec<TypeDecl>,
    wants: &mut Vec<Want>,
) -> Result<usize> {
    let line = lines[start];
    let line_no = (start + 1) as u32;
    let column = (line.len() - line.trim_start().len() + 1) as u32;
    let rest = line.trim_start();
    let rest = rest.strip_prefix("type ").unwrap_or(rest).trim_start();
    let (name, after_name) = split_ident(rest);
    if name.is_empty() {
        bail!("line {line_no}: type declaration without a name");
    }
    let mut after = after_name.trim_start();
    if let Some(stripped) = after.strip_prefix('=') {
        // alias form: `type A = B`
        after = stripped.trim_start();
    }

    let after = after.trim_end();
    if after == "struct {" || after == "struct{" {
        let mut fields = Vec::new();
        let mut i = start + 1;
        while i < lines.len() && lines[i].trim() != "}" {
            let body_line_no = (i + 1) as u32;
            let (decl_part, want) = split_comment(lines[i], body_line_no)?;
            if let Some(want) = want {
                wants.push(want);
            }
            if !decl_part.trim().is_empty() {
                fields.extend(parse_field_line(decl_part, body_line_no)?);
            }
            i += 1;
        }
        if i >= lines.len() {
            bail!("line {line_no}: unterminated struct declaration");
        }
        decls.push(TypeDecl::new(name, TypeExpr::Struct(fields)).at(line_no, column));
        Ok(i + 1)
    } else {
        let ty = parse_type(after, line_no)?;
        decls.push(TypeDecl::new(name, ty).at(line_no, column));
        Ok(start + 1)
    }
}

/// Splits a line into its declaration part and an optional want annotation.
///
/// The comment search skips backquoted tag literals so that `//` inside a
/// tag is not mistaken for a comment.
fn split_comment(line: &str, line_no: u32) -> Result<(&str, Option<Want>)> {
    let Some(comment_at) = find_comment_start(line) else {
        return Ok((line, None));
    };
    let decl_part = &line[..comment_at];
    let comment = line[comment_at + 2..].trim_start();
    if let Some(rest) = comment.strip_prefix("want") {
        if rest.starts_with(' ') || rest.starts_with('\t') || rest.starts_with('`') {
            let rest = rest.trim_start();
            let Some(rest) = rest.strip_prefix('`') else {
                bail!("line {line_no}: malformed want annotation: {comment}");
            };
            let Some(end) = rest.find('`') else {
                bail!("line {line_no}: unterminated want annotation");
            };
            let want = Want { line: line_no, message: rest[..end].to_string() };
            return Ok((decl_part, Some(want)));
        }
    }
    Ok((decl_part, None))
}

/// Finds the byte offset of `//` outside any backquoted literal.
fn find_comment_start(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut in_tag = false;
    let mut idx = 0;
    while idx < bytes.len() {
        match bytes[idx] {
            b'`' => in_tag = !in_tag,
            b'/' if !in_tag && idx + 1 < bytes.len() && bytes[idx + 1] == b'/' => {
                return Some(idx);
            }
            _ => {}
        }
        idx += 1;
    }
    None
}

/// Parses one field declaration line, expanding `A, B T` into one field per
/// name. Columns are 1-based byte offsets, matching `go/token`.
fn parse_field_line(decl: &str, line_no: u32) -> Result<Vec<Field>> {
    let base = decl.len() - decl.trim_start().len();
    let mut rest = decl.trim();
    let mut tag = None;

    if rest.ends_with('`') {
        let Some(open) = rest[..rest.len() - 1].rfind('`') else {
            bail!("line {line_no}: unterminated tag literal");
        };
        tag = Some(rest[open..].to_string());
        rest = rest[..open].trim_end();
    }
    if rest.is_empty() {
        bail!("line {line_no}: tag without a field declaration");
    }

    let (first, after_first) = split_ident(rest);
    let is_named = !first.is_empty()
        && !TYPE_KEYWORDS.contains(&first)
        && !after_first.starts_with('.')
        && (after_first.starts_with(',') || !after_first.trim_start().is_empty());

    if is_named {
        let mut names: Vec<(String, u32)> = Vec::new();
        let mut cursor = 0usize;
        loop {
            cursor = skip_blanks(rest, cursor);
            let (name, _) = split_ident(&rest[cursor..]);
            if name.is_empty() {
                bail!("line {line_no}: expected a field name before: {}", &rest[cursor..]);
            }
            names.push((name.to_string(), (base + cursor + 1) as u32));
            cursor += name.len();
            cursor = skip_blanks(rest, cursor);
            if rest[cursor..].starts_with(',') {
                cursor += 1;
                continue;
            }
            break;
        }
        let ty_src = rest[cursor..].trim();
        if ty_src.is_empty() {
            bail!("line {line_no}: field {} has no type", names[0].0);
        }
        let ty = parse_type(ty_src, line_no)?;
        Ok(names
            .into_iter()
            .map(|(name, column)| {
                let field = Field::named(name, ty.clone()).at(line_no, column);
                match &tag {
                    Some(tag) => field.with_tag(tag.clone()),
                    None => field,
                }
            })
            .collect())
    } else {
        let ty = parse_type(rest, line_no)?;
        let field = Field::embedded(ty).at(line_no, (base + 1) as u32);
        Ok(vec![match tag {
            Some(tag) => field.with_tag(tag),
            None => field,
        }])
    }
}

fn skip_blanks(s: &str, mut pos: usize) -> usize {
    while s[pos..].starts_with(' ') || s[pos..].starts_with('\t') {
        pos += 1;
    }
    pos
}

/// Splits off a leading Go identifier, returning `("", s)` when the input
/// does not start with one.
fn split_ident(s: &str) -> (&str, &str) {
    let end = s
        .char_indices()
        .find(|(idx, ch)| {
            if *idx == 0 {
                !ch.is_ascii_alphabetic() && *ch != '_'
            } else {
                !ch.is_ascii_alphanumeric() && *ch != '_'
            }
        })
        .map_or(s.len(), |(idx, _)| idx);
    s.split_at(end)
}

/// Parses a complete type expression, rejecting trailing characters.
pub fn parse_type(src: &str, line_no: u32) -> Result<TypeExpr> {
    let mut cursor = TypeCursor { src, pos: 0, line: line_no };
    let ty = cursor.parse()?;
    cursor.skip_blanks();
    if cursor.pos != src.len() {
        bail!("line {line_no}: trailing characters in type: {}", cursor.rest());
    }
    Ok(ty)
}

struct TypeCursor<'a> {
    src: &'a str,
    pos: usize,
    line: u32,
}

impl<'a> TypeCursor<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn skip_blanks(&mut self) {
        self.pos = skip_blanks(self.src, self.pos);
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    /// Like `eat`, but only matches a whole word: `map` but not `mapper`.
    fn eat_word(&mut self, word: &str) -> bool {
        let rest = self.rest();
        if !rest.starts_with(word) {
            return false;
        }
        let at_boundary = rest[word.len()..]
            .chars()
            .next()
            .is_none_or(|ch| !ch.is_ascii_alphanumeric() && ch != '_');
        if at_boundary {
            self.pos += word.len();
        }
        at_boundary
    }

    fn expect(&mut self, token: &str) -> Result<()> {
        if self.eat(token) {
            Ok(())
        } else {
            bail!("line {}: expected '{}' before: {}", self.line, token, self.rest())
        }
    }

    fn scan_ident(&mut self) -> Result<&'a str> {
        let (ident, _) = split_ident(self.rest());
        if ident.is_empty() {
            bail!("line {}: expected a type name before: {}", self.line, self.rest());
        }
        self.pos += ident.len();
        Ok(ident)
    }

    fn parse(&mut self) -> Result<TypeExpr> {
        self.skip_blanks();
        if self.eat("(") {
            let inner = self.parse()?;
            self.skip_blanks();
            self.expect(")")?;
            return Ok(inner);
        }
        if self.eat("*") {
            return Ok(TypeExpr::pointer(self.parse()?));
        }
        if self.eat("[]") {
            return Ok(TypeExpr::slice(self.parse()?));
        }
        if self.rest().starts_with('[') {
            self.pos += 1;
            let len = self.scan_array_len()?;
            self.expect("]")?;
            return Ok(TypeExpr::array(len, self.parse()?));
        }
        if self.eat("<-") {
            self.skip_blanks();
            if !self.eat_word("chan") {
                bail!("line {}: expected 'chan' after '<-'", self.line);
            }
            return Ok(TypeExpr::Chan { dir: ChanDir::Recv, elem: Box::new(self.parse()?) });
        }
        if self.eat_word("map") {
            self.expect("[")?;
            let key = self.parse()?;
            self.skip_blanks();
            self.expect("]")?;
            let value = self.parse()?;
            return Ok(TypeExpr::map(key, value));
        }
        if self.eat_word("chan") {
            if self.eat("<-") {
                return Ok(TypeExpr::Chan { dir: ChanDir::Send, elem: Box::new(self.parse()?) });
            }
            return Ok(TypeExpr::Chan { dir: ChanDir::Both, elem: Box::new(self.parse()?) });
        }
        if self.eat_word("interface") {
            self.skip_blanks();
            self.expect("{")?;
            self.skip_blanks();
            self.expect("}")?;
            return Ok(TypeExpr::Interface);
        }
        if self.eat_word("struct") {
            return self.parse_inline_struct();
        }
        if self.eat_word("func") {
            // Signatures carry no shape information; consume the remainder.
            self.pos = self.src.len();
            return Ok(TypeExpr::Other);
        }
        let name = self.scan_ident()?;
        if self.eat(".") {
            let member = self.scan_ident()?;
            return Ok(TypeExpr::selector(name, member));
        }
        Ok(TypeExpr::ident(name))
    }

    fn scan_array_len(&mut self) -> Result<u64> {
        let digits: String =
            self.rest().chars().take_while(|ch| ch.is_ascii_digit()).collect();
        if digits.is_empty() {
            bail!("line {}: expected an array length before: {}", self.line, self.rest());
        }
        self.pos += digits.len();
        digits
            .parse()
            .with_context(|| format!("line {}: array length out of range", self.line))
    }

    /// Parses a single-line `struct{ A int; B string }` literal. Members are
    /// separated by semicolons at brace depth zero.
    fn parse_inline_struct(&mut self) -> Result<TypeExpr> {
        self.skip_blanks();
        self.expect("{")?;
        let body_start = self.pos;
        let mut depth = 1usize;
        for (offset, ch) in self.rest().char_indices() {
            match ch {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        let body = &self.src[body_start..body_start + offset];
                        self.pos = body_start + offset + 1;
                        let mut fields = Vec::new();
                        for segment in split_top_level(body, ';') {
                            let segment = segment.trim();
                            if !segment.is_empty() {
                                fields.extend(parse_field_line(segment, self.line)?);
                            }
                        }
                        return Ok(TypeExpr::Struct(fields));
                    }
                }
                _ => {}
            }
        }
        bail!("line {}: unterminated inline struct", self.line)
    }
}

fn split_top_level(body: &str, separator: char) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (offset, ch) in body.char_indices() {
        match ch {
            '{' | '[' | '(' => depth += 1,
            '}' | ']' | ')' => depth = depth.saturating_sub(1),
            ch if ch == separator && depth == 0 => {
                segments.push(&body[start..offset]);
                start = offset + separator.len_utf8();
            }
            _ => {}
        }
    }
    segments.push(&body[start..]);
    segments
}
