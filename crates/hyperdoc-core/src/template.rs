//! URI template expansion
//!
//! Link hrefs may be URI templates such as `/search{?text,limit}`. This is
//! the subset of RFC 6570 that hypermedia APIs use in practice:
//!
//! | Expression  | Example value `q = "a b/c"` |
//! |-------------|-----------------------------|
//! | `{q}`       | `a%20b%2Fc`                 |
//! | `{+q}`      | `a%20b/c`                   |
//! | `{#q}`      | `#a%20b/c`                  |
//! | `{/q}`      | `/a%20b%2Fc`                |
//! | `{?q}`      | `?q=a%20b%2Fc`              |
//! | `{&q}`      | `&q=a%20b%2Fc`              |
//!
//! `{+q}` and `{#q}` leave reserved characters and existing `%XX` escapes
//! alone; everything else is percent-encoded. Variables without a value are
//! dropped. Prefix (`:n`) and explode (`*`)
//! modifiers are accepted but ignored.

use std::collections::BTreeMap;

/// Characters `{+var}` and `{#var}` pass through unencoded
const RESERVED: &str = ":/?#[]@!$&'()*+,;=";

/// Values substituted into a template, keyed by variable name
pub type TemplateParams = BTreeMap<String, String>;

/// Check whether an href contains template expressions
pub fn is_template(href: &str) -> bool {
    href.find('{')
        .map(|open| href[open..].contains('}'))
        .unwrap_or(false)
}

/// Expand a URI template with the given values
pub fn expand(template: &str, params: &TemplateParams) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        match after.find('}') {
            Some(close) => {
                expand_expression(&after[..close], params, &mut out);
                rest = &after[close + 1..];
            }
            None => {
                // Unterminated expression is copied as-is
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

fn expand_expression(expr: &str, params: &TemplateParams, out: &mut String) {
    let (operator, vars) = match expr.chars().next() {
        Some(op @ ('+' | '#' | '/' | '?' | '&')) => (Some(op), &expr[1..]),
        _ => (None, expr),
    };

    let defined: Vec<(&str, &str)> = vars
        .split(',')
        .map(variable_name)
        .filter(|name| !name.is_empty())
        .filter_map(|name| params.get(name).map(|value| (name, value.as_str())))
        .collect();

    if defined.is_empty() {
        return;
    }

    match operator {
        None => push_joined(out, &defined, |(_, v)| urlencoding::encode(v).into_owned()),
        Some('+') => push_joined(out, &defined, |(_, v)| encode_reserved(v)),
        Some('#') => {
            out.push('#');
            push_joined(out, &defined, |(_, v)| encode_reserved(v));
        }
        Some('/') => {
            for (_, value) in &defined {
                out.push('/');
                out.push_str(&urlencoding::encode(value));
            }
        }
        Some(op) => {
            // Form-style query ('?') or continuation ('&')
            for (i, (name, value)) in defined.iter().enumerate() {
                out.push(if i == 0 { op } else { '&' });
                out.push_str(name);
                out.push('=');
                out.push_str(&urlencoding::encode(value));
            }
        }
    }
}

/// Percent-encode all but unreserved and reserved characters
///
/// A `%` that already starts an escape triplet is kept.
fn encode_reserved(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut buf = [0u8; 4];

    for (i, c) in value.char_indices() {
        let keep = c.is_ascii_alphanumeric()
            || "-._~".contains(c)
            || RESERVED.contains(c)
            || (c == '%' && starts_escape(&value[i..]));
        if keep {
            out.push(c);
        } else {
            out.push_str(&urlencoding::encode(c.encode_utf8(&mut buf)));
        }
    }
    out
}

fn starts_escape(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() >= 3 && bytes[1].is_ascii_hexdigit() && bytes[2].is_ascii_hexdigit()
}

/// Strip value modifiers from a variable (`q:3`, `list*`)
fn variable_name(varspec: &str) -> &str {
    let varspec = varspec.trim();
    let varspec = varspec.split(':').next().unwrap_or(varspec);
    varspec.trim_end_matches('*')
}

fn push_joined<F>(out: &mut String, defined: &[(&str, &str)], render: F)
where
    F: Fn(&(&str, &str)) -> String,
{
    let rendered: Vec<String> = defined.iter().map(render).collect();
    out.push_str(&rendered.join(","));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> TemplateParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_is_template() {
        assert!(is_template("/search{?q}"));
        assert!(is_template("/docs/{guid}"));
        assert!(!is_template("/plain/path"));
        assert!(!is_template("/broken{"));
    }

    #[test]
    fn test_simple_expansion_encodes() {
        let p = params(&[("guid", "a b/c")]);
        assert_eq!(expand("/docs/{guid}", &p), "/docs/a%20b%2Fc");
    }

    #[test]
    fn test_reserved_expansion_keeps_reserved_characters() {
        let p = params(&[("path", "a/b c"), ("q", "a b")]);
        assert_eq!(expand("/root{+path}", &p), "/roota/b%20c");
        assert_eq!(expand("/r{+q}", &p), "/ra%20b");
        assert_eq!(expand("/r{#q}", &p), "/r#a%20b");
    }

    #[test]
    fn test_reserved_expansion_escapes() {
        let p = params(&[("a", "x%2Fy"), ("b", "50%"), ("c", "café?x=1&y")]);
        assert_eq!(expand("{+a}", &p), "x%2Fy");
        assert_eq!(expand("{+b}", &p), "50%25");
        assert_eq!(expand("{+c}", &p), "caf%C3%A9?x=1&y");
    }

    #[test]
    fn test_query_expansion() {
        let p = params(&[("text", "radio news"), ("limit", "10")]);
        assert_eq!(
            expand("/docs{?text,limit}", &p),
            "/docs?text=radio%20news&limit=10"
        );
    }

    #[test]
    fn test_query_drops_undefined_variables() {
        let p = params(&[("limit", "5")]);
        assert_eq!(expand("/docs{?text,limit,offset}", &p), "/docs?limit=5");
        assert_eq!(expand("/docs{?text}", &TemplateParams::new()), "/docs");
    }

    #[test]
    fn test_continuation_and_path_segments() {
        let p = params(&[("a", "1"), ("b", "2"), ("seg", "x y")]);
        assert_eq!(expand("/q?fixed=1{&a,b}", &p), "/q?fixed=1&a=1&b=2");
        assert_eq!(expand("/base{/seg}", &p), "/base/x%20y");
    }

    #[test]
    fn test_fragment_expansion() {
        let p = params(&[("frag", "top")]);
        assert_eq!(expand("/page{#frag}", &p), "/page#top");
    }

    #[test]
    fn test_modifiers_are_ignored() {
        let p = params(&[("q", "abcdef"), ("list", "x")]);
        assert_eq!(expand("/s{?q:3,list*}", &p), "/s?q=abcdef&list=x");
    }

    #[test]
    fn test_unterminated_expression_is_literal() {
        let p = params(&[("q", "v")]);
        assert_eq!(expand("/s{?q}{oops", &p), "/s?q=v{oops");
    }

    #[test]
    fn test_no_expressions() {
        assert_eq!(expand("/plain", &TemplateParams::new()), "/plain");
    }
}
