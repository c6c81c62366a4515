//! Struct-tag micro-format
//!
//! A faithful port of the host language's tag convention: a tag is a
//! sequence of space-separated `key:"value"` pairs, values are quoted with
//! backslash escapes, and the `json` value is a comma-separated list whose
//! first element is the serialization name (`-` to exclude the field) and
//! whose remaining elements are options such as `omitempty`.
//!
//! Lookup is lenient the same way the host's reflection is: any malformed
//! tail ends the scan and the key is simply reported absent.

const OMITEMPTY: &str = "omitempty";

/// Borrowed view over a raw tag string with `key:"value"` lookup.
#[derive(Debug, Clone, Copy)]
pub struct StructTag<'a>(&'a str);

impl<'a> StructTag<'a> {
    /// Wraps a raw tag string. Backquote delimiters, if still present, are
    /// stripped so callers may pass the literal as written in source.
    pub fn new(raw: &'a str) -> StructTag<'a> {
        StructTag(raw.trim_matches('`'))
    }

    /// Returns the unquoted value for `key`, or `None` if the key is absent
    /// or the tag is malformed from that point on.
    pub fn get(&self, key: &str) -> Option<String> {
        let mut tag = self.0.as_bytes();
        loop {
            // Skip leading spaces between pairs.
            let mut i = 0;
            while i < tag.len() && tag[i] == b' ' {
                i += 1;
            }
            tag = &tag[i..];
            if tag.is_empty() {
                return None;
            }

            // Scan the key up to the colon. A space, quote, or control
            // character here is a syntax error.
            let mut i = 0;
            while i < tag.len() && tag[i] > b' ' && tag[i] != b':' && tag[i] != b'"' && tag[i] != 0x7f {
                i += 1;
            }
            if i == 0 || i + 1 >= tag.len() || tag[i] != b':' || tag[i + 1] != b'"' {
                return None;
            }
            let name = &tag[..i];
            tag = &tag[i + 1..];

            // Scan the quoted value, honoring backslash escapes.
            let mut i = 1;
            while i < tag.len() && tag[i] != b'"' {
                if tag[i] == b'\\' {
                    i += 1;
                }
                i += 1;
            }
            if i >= tag.len() {
                return None;
            }
            let quoted = &tag[..=i];
            tag = &tag[i + 1..];

            if name == key.as_bytes() {
                let quoted = std::str::from_utf8(quoted).ok()?;
                return unquote(quoted);
            }
        }
    }
}

/// Unquotes a `"..."` literal, resolving the escape sequences tags use.
/// Returns `None` for anything malformed.
fn unquote(s: &str) -> Option<String> {
    let inner = s.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            // A bare quote cannot appear here; the scanner stops at it.
            out.push(c);
            continue;
        }
        match chars.next()? {
            '"' => out.push('"'),
            '\\' => out.push('\\'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            _ => return None,
        }
    }
    Some(out)
}

/// The parsed `json` entry of a field tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonTag {
    value: String,
}

impl JsonTag {
    /// Looks up the `json` key in a raw field tag. `None` when the tag has
    /// no (well-formed) `json` entry.
    pub fn from_tag(raw: &str) -> Option<JsonTag> {
        StructTag::new(raw).get("json").map(|value| JsonTag { value })
    }

    /// The whole comma-separated value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The serialization name: everything before the first comma.
    pub fn name(&self) -> &str {
        self.value.split(',').next().unwrap_or("")
    }

    /// The options after the serialization name, in order.
    pub fn options(&self) -> impl Iterator<Item = &str> {
        self.value.split(',').skip(1)
    }

    /// True when the whole value is empty (`json:""`).
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// True when the whole value is the skip sentinel (`json:"-"`).
    /// `json:"-,"` names the field `-` and is not the sentinel.
    pub fn is_skip(&self) -> bool {
        self.value == "-"
    }

    /// Substring match for the omit marker over the full value, name segment
    /// included; a serialization name containing the token also counts.
    pub fn has_omitempty(&self) -> bool {
        self.value.contains(OMITEMPTY)
    }
}
