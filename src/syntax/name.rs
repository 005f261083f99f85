// src/syntax/name.rs
//
// Qualified-name parsing: splits a dotted/bracketed name string into its
// namespace prefix, base name, and generic-argument components.
//
// The specialization engine uses this to recognize that a rendered name
// like "Collections.List<i32>" refers to an instance that may already
// exist under a different creation path.

/// A name string split into structural components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    /// Dotted namespace prefix, outermost first. Empty for unqualified names.
    pub namespace: Vec<String>,
    /// The declaration's own name, without arguments.
    pub base: String,
    /// Rendered generic-argument names; empty for unspecialized names.
    pub args: Vec<String>,
}

impl ParsedName {
    /// True when the name carries a generic-argument list.
    pub fn is_specialized(&self) -> bool {
        !self.args.is_empty()
    }
}

/// Split a name like `"Ns.Sub.List<i32, Box<string>>"` into namespace
/// prefix `["Ns", "Sub"]`, base `"List"`, and args `["i32", "Box<string>"]`.
///
/// Dots inside the bracketed argument list belong to the arguments, not
/// the namespace path. Nested brackets are kept intact inside each
/// argument. Returns `None` for an empty name or unbalanced brackets.
pub fn parse_qualified_name(text: &str) -> Option<ParsedName> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    // Find the argument list: the first '<' at bracket depth zero.
    let mut depth = 0usize;
    let mut args_start = None;
    for (i, c) in text.char_indices() {
        match c {
            '<' => {
                if depth == 0 {
                    args_start = Some(i);
                }
                depth += 1;
            }
            '>' => {
                if depth == 0 {
                    return None;
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }

    let (path, args) = match args_start {
        Some(start) => {
            if !text.ends_with('>') {
                return None;
            }
            let inner = &text[start + 1..text.len() - 1];
            (&text[..start], split_args(inner))
        }
        None => (text, Vec::new()),
    };

    let mut segments: Vec<String> = path.split('.').map(|s| s.trim().to_string()).collect();
    if segments.iter().any(|s| s.is_empty()) {
        return None;
    }
    let base = segments.pop()?;

    Some(ParsedName {
        namespace: segments,
        base,
        args,
    })
}

/// Split a bracketed argument body on top-level commas.
fn split_args(inner: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for c in inner.chars() {
        match c {
            '<' => {
                depth += 1;
                current.push(c);
            }
            '>' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => {
                args.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        args.push(current.trim().to_string());
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bare_name() {
        let parsed = parse_qualified_name("List").unwrap();
        assert!(parsed.namespace.is_empty());
        assert_eq!(parsed.base, "List");
        assert!(parsed.args.is_empty());
        assert!(!parsed.is_specialized());
    }

    #[test]
    fn parse_dotted_name() {
        let parsed = parse_qualified_name("Ns.Sub.List").unwrap();
        assert_eq!(parsed.namespace, vec!["Ns", "Sub"]);
        assert_eq!(parsed.base, "List");
    }

    #[test]
    fn parse_specialized_name() {
        let parsed = parse_qualified_name("List<i32>").unwrap();
        assert_eq!(parsed.base, "List");
        assert_eq!(parsed.args, vec!["i32"]);
        assert!(parsed.is_specialized());
    }

    #[test]
    fn parse_nested_arguments() {
        let parsed = parse_qualified_name("Ns.Map<string, Box<i32>>").unwrap();
        assert_eq!(parsed.namespace, vec!["Ns"]);
        assert_eq!(parsed.base, "Map");
        assert_eq!(parsed.args, vec!["string", "Box<i32>"]);
    }

    #[test]
    fn dots_inside_arguments_stay_in_arguments() {
        let parsed = parse_qualified_name("Box<Ns.Inner>").unwrap();
        assert!(parsed.namespace.is_empty());
        assert_eq!(parsed.args, vec!["Ns.Inner"]);
    }

    #[test]
    fn rejects_malformed_names() {
        assert!(parse_qualified_name("").is_none());
        assert!(parse_qualified_name("List<i32").is_none());
        assert!(parse_qualified_name("List>i32<").is_none());
        assert!(parse_qualified_name("Ns..List").is_none());
    }
}
