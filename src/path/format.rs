use super::segment::PathSegment;
use super::tokens::PathToken;

/// Renders tokens back into a canonical path string.
///
/// Names are always written in bracket-quoted form, so any name survives a
/// round trip through [`tokenize`](super::tokenize).
///
/// ```
/// use peek_query::{to_path_string, tokenize};
///
/// let tokens = tokenize("$.store.book[0]").unwrap();
/// assert_eq!(to_path_string(&tokens), "$['store']['book'][0]");
/// ```
pub fn to_path_string(tokens: &[PathToken]) -> String {
    let mut out = String::from("$");
    for token in tokens {
        match token {
            PathToken::Descendant => out.push_str(".."),
            PathToken::Parent => out.push('^'),
            PathToken::PropertyName => out.push('~'),
            PathToken::TypeCheck(t) => out.push_str(&t.to_string()),
            other => {
                out.push('[');
                out.push_str(&bracket_member(other));
                out.push(']');
            }
        }
    }
    out
}

fn bracket_member(token: &PathToken) -> String {
    match token {
        PathToken::Name(name) => quote_name(name),
        PathToken::Index(i) => i.to_string(),
        PathToken::Wildcard => "*".to_string(),
        PathToken::Slice(slice) => slice.to_string(),
        PathToken::Filter(code) => format!("?({})", code),
        PathToken::Script(code) => format!("({})", code),
        PathToken::Union(parts) => parts
            .iter()
            .map(bracket_member)
            .collect::<Vec<_>>()
            .join(","),
        PathToken::Descendant => "..".to_string(),
        PathToken::Parent => "^".to_string(),
        PathToken::PropertyName => "~".to_string(),
        PathToken::TypeCheck(t) => t.to_string(),
    }
}

fn quote_name(name: &str) -> String {
    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push('\'');
    for ch in name.chars() {
        if ch == '\\' || ch == '\'' {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('\'');
    quoted
}

/// `$['a'][0]['b']` for a concrete match path.
pub fn normalized_path(path: &[PathSegment]) -> String {
    let mut out = String::from("$");
    for segment in path {
        match segment {
            PathSegment::Field(name) => {
                out.push('[');
                out.push_str(&quote_name(name));
                out.push(']');
            }
            PathSegment::Index(i) => out.push_str(&format!("[{}]", i)),
            PathSegment::PropertyName => {}
        }
    }
    out
}

/// RFC 6901 JSON Pointer for a concrete match path.
pub fn to_pointer(path: &[PathSegment]) -> String {
    let mut out = String::new();
    for segment in path {
        match segment {
            PathSegment::Field(name) => {
                out.push('/');
                out.push_str(&name.replace('~', "~0").replace('/', "~1"));
            }
            PathSegment::Index(i) => out.push_str(&format!("/{}", i)),
            PathSegment::PropertyName => {}
        }
    }
    out
}
