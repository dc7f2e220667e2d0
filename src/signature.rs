use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::Kind;

quick_error! {
    /// Why a single function is left out of the bindings
    #[derive(Debug, Clone, PartialEq)]
    pub enum Rejection {
        Variadic(fragment: String) {
            display("variadic argument '{}' is not supported", fragment)
        }
        Direction(fragment: String) {
            display("argument '{}' declares an explicit direction", fragment)
        }
        Unresolved(fragment: String) {
            display("cannot resolve the type of '{}'", fragment)
        }
        CaseSensitive(name: String) {
            display("result column '{}' is not lowercase", name)
        }
        Trigger(result: String) {
            display("'{}' functions are not supported", result)
        }
    }
}

/// A `[name] type` fragment whose type was recognized
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedField {
    pub name: String,
    pub kind: Kind,
    pub rs_type: String,
}

// --------------------------------------------------------------------------------------------------------------------
// Type rules
// --------------------------------------------------------------------------------------------------------------------

struct Rule {
    pattern: Regex,
    kind: Kind,
    rs_type: &'static str,
}

impl Rule {
    /// Type family matched at the end of the fragment; `[]` turns it into an array
    fn with_array(types: &str, kind: Kind, rs_type: &'static str) -> Self {
        Self::new(&format!(r"(?i)(?:^|\s)(?:{})(?P<array>\[\])?$", types), kind, rs_type)
    }

    /// Type family without an array form
    fn scalar(types: &str, kind: Kind, rs_type: &'static str) -> Self {
        Self::new(&format!(r"(?i)(?:^|\s)(?:{})$", types), kind, rs_type)
    }

    fn new(pattern: &str, kind: Kind, rs_type: &'static str) -> Self {
        let pattern = Regex::new(pattern).unwrap_or_else(|e| panic!("invalid type rule {}: {}", pattern, e));
        Self { pattern, kind, rs_type }
    }

    fn apply(&self, fragment: &str) -> Option<ParsedField> {
        let captures = self.pattern.captures(fragment)?;
        let start = captures.get(0)?.start();
        let (kind, rs_type) = match captures.name("array") {
            Some(_) => (Kind::Array, format!("Vec<{}>", self.rs_type)),
            None => (self.kind, self.rs_type.to_string()),
        };
        Some(ParsedField {
            name: unquote(fragment[..start].trim()),
            kind,
            rs_type,
        })
    }
}

// Evaluated in order, first match wins.
// Time, binary and uuid arrays are deliberately left unresolved.
static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::with_array("boolean|bool", Kind::Boolean, "bool"),
        Rule::with_array("jsonb|json", Kind::Json, "serde_json::Value"),
        Rule::with_array(
            "smallint|integer|bigint|int2|int4|int8|int|smallserial|bigserial|serial|oid",
            Kind::Number,
            "i64",
        ),
        Rule::with_array(
            r"real|double precision|float4|float8|numeric(?:\(\d+(?:,\s*\d+)?\))?|decimal(?:\(\d+(?:,\s*\d+)?\))?",
            Kind::Number,
            "f64",
        ),
        Rule::with_array(
            r"text|character varying(?:\(\d+\))?|varchar(?:\(\d+\))?|character(?:\(\d+\))?|char(?:\(\d+\))?|bpchar|name|citext",
            Kind::String,
            "String",
        ),
        Rule::scalar(
            r"timestamp(?:\(\d\))?(?: with(?:out)? time zone)?|timestamptz|time(?:\(\d\))?(?: with(?:out)? time zone)?|timetz|date",
            Kind::Time,
            "chrono::NaiveDateTime",
        ),
        Rule::scalar("bytea", Kind::Binary, "Vec<u8>"),
        Rule::scalar("uuid", Kind::Uuid, "uuid::Uuid"),
    ]
});

// --------------------------------------------------------------------------------------------------------------------
// Public functions
// --------------------------------------------------------------------------------------------------------------------

/// Recognize the type at the end of a `[name] type[[]]` fragment.
/// Everything before the type, trimmed, is the name. `None` means unresolved.
pub fn parse_field(fragment: &str) -> Option<ParsedField> {
    let fragment = fragment.trim();
    RULES.iter().find_map(|rule| rule.apply(fragment))
}

/// Parse the output of `pg_get_function_arguments`.
/// Unnamed arguments are called `_arg<N>`, counting from one.
pub fn parse_arguments(raw: &str) -> Result<Vec<ParsedField>, Rejection> {
    let mut arguments = Vec::new();
    for (i, fragment) in split_list(raw).into_iter().enumerate() {
        if fragment.starts_with("VARIADIC ") {
            return Err(Rejection::Variadic(fragment.to_string()));
        }
        if ["IN ", "OUT ", "INOUT "].iter().any(|m| fragment.starts_with(m)) {
            return Err(Rejection::Direction(fragment.to_string()));
        }
        let declaration = match fragment.find(" DEFAULT ") {
            Some(pos) => &fragment[..pos],
            None => fragment,
        };
        let mut argument = parse_field(declaration).ok_or_else(|| Rejection::Unresolved(fragment.to_string()))?;
        if argument.name.is_empty() {
            argument.name = format!("_arg{}", i + 1);
        }
        arguments.push(argument);
    }
    Ok(arguments)
}

/// Parse the output of `pg_get_function_result`.
///
/// - `void` yields no result at all,
/// - `TABLE(...)` yields one result per column, unnamed ones called `Result<N>`,
/// - anything else, with or without `SETOF`, yields a single result called `Result`.
pub fn parse_result(raw: &str) -> Result<Vec<ParsedField>, Rejection> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("void") {
        return Ok(Vec::new());
    }
    if raw.eq_ignore_ascii_case("trigger") || raw.eq_ignore_ascii_case("event_trigger") {
        return Err(Rejection::Trigger(raw.to_string()));
    }

    if let Some(columns) = raw.strip_prefix("TABLE(").and_then(|r| r.strip_suffix(')')) {
        let mut results = Vec::new();
        for (i, fragment) in split_list(columns).into_iter().enumerate() {
            let mut result = parse_field(fragment).ok_or_else(|| Rejection::Unresolved(fragment.to_string()))?;
            if result.name.is_empty() {
                result.name = format!("Result{}", i + 1);
            } else if result.name != result.name.to_lowercase() {
                return Err(Rejection::CaseSensitive(result.name));
            }
            results.push(result);
        }
        return Ok(results);
    }

    let scalar = raw.strip_prefix("SETOF ").unwrap_or(raw);
    let mut result = parse_field(scalar).ok_or_else(|| Rejection::Unresolved(raw.to_string()))?;
    result.name = "Result".to_string();
    Ok(vec![result])
}

/// Strip the double quotes of a quoted identifier, `""` standing for a single quote character
pub fn unquote(name: &str) -> String {
    match name.strip_prefix('"').and_then(|n| n.strip_suffix('"')) {
        Some(inner) => inner.replace("\"\"", "\""),
        None => name.to_string(),
    }
}

/// Split a comma separated list, ignoring commas inside parentheses and quotes
pub fn split_list(raw: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (idx, ch) in raw.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(ch),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(raw[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }
    let last = raw[start..].trim();
    if !last.is_empty() || !parts.is_empty() {
        parts.push(last);
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_of(fragment: &str) -> Option<Kind> {
        parse_field(fragment).map(|f| f.kind)
    }

    #[test]
    fn each_rule_alone() {
        assert_eq!(kind_of("flag boolean"), Some(Kind::Boolean));
        assert_eq!(kind_of("doc jsonb"), Some(Kind::Json));
        assert_eq!(kind_of("n bigint"), Some(Kind::Number));
        assert_eq!(kind_of("x double precision"), Some(Kind::Number));
        assert_eq!(kind_of("price numeric(10,2)"), Some(Kind::Number));
        assert_eq!(kind_of("label character varying"), Some(Kind::String));
        assert_eq!(kind_of("at timestamp with time zone"), Some(Kind::Time));
        assert_eq!(kind_of("day date"), Some(Kind::Time));
        assert_eq!(kind_of("blob bytea"), Some(Kind::Binary));
        assert_eq!(kind_of("id uuid"), Some(Kind::Uuid));
    }

    #[test]
    fn rust_types_follow_the_rule() {
        let field = parse_field("n integer").unwrap();
        assert_eq!(field.rs_type, "i64");
        let field = parse_field("x real").unwrap();
        assert_eq!(field.rs_type, "f64");
        let field = parse_field("ids integer[]").unwrap();
        assert_eq!(field.kind, Kind::Array);
        assert_eq!(field.rs_type, "Vec<i64>");
    }

    #[test]
    fn name_is_everything_before_the_type() {
        let field = parse_field("  created_at  timestamp without time zone ").unwrap();
        assert_eq!(field.name, "created_at");
        assert_eq!(field.kind, Kind::Time);

        // a name that is itself a type keyword
        let field = parse_field("date date").unwrap();
        assert_eq!(field.name, "date");

        let field = parse_field("text").unwrap();
        assert_eq!(field.name, "");
        assert_eq!(field.kind, Kind::String);
    }

    #[test]
    fn array_asymmetry() {
        assert_eq!(kind_of("tags boolean[]"), Some(Kind::Array));
        assert_eq!(kind_of("docs json[]"), Some(Kind::Array));
        assert_eq!(kind_of("names text[]"), Some(Kind::Array));
        assert_eq!(kind_of("stamps timestamp[]"), None);
        assert_eq!(kind_of("chunks bytea[]"), None);
    }

    #[test]
    fn unknown_types_are_unresolved() {
        assert_eq!(kind_of("shape geometry"), None);
        assert_eq!(kind_of("period interval"), None);
        assert_eq!(kind_of("r record"), None);
    }

    #[test]
    fn first_rule_wins() {
        // `int` is part of the integer family, `interval` of none
        assert_eq!(kind_of("int"), Some(Kind::Number));
        assert_eq!(parse_field("int text").map(|f| (f.name, f.kind)), Some(("int".to_string(), Kind::String)));
    }

    #[test]
    fn splits_on_top_level_commas() {
        assert_eq!(split_list(""), Vec::<&str>::new());
        assert_eq!(split_list("a integer"), vec!["a integer"]);
        assert_eq!(
            split_list("a numeric(10,2), b text DEFAULT 'x, y'::text, \"c,d\" integer"),
            vec!["a numeric(10,2)", "b text DEFAULT 'x, y'::text", "\"c,d\" integer"]
        );
    }

    #[test]
    fn arguments_are_named_and_typed() {
        let args = parse_arguments("a integer, text, b boolean DEFAULT false").unwrap();
        let names: Vec<_> = args.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["a", "_arg2", "b"]);
        assert_eq!(args[2].kind, Kind::Boolean);
        assert!(parse_arguments("").unwrap().is_empty());
    }

    #[test]
    fn argument_modifiers_are_rejected() {
        assert_eq!(
            parse_arguments("a integer, VARIADIC xs integer[]"),
            Err(Rejection::Variadic("VARIADIC xs integer[]".to_string()))
        );
        assert_eq!(
            parse_arguments("OUT total bigint"),
            Err(Rejection::Direction("OUT total bigint".to_string()))
        );
        assert!(matches!(parse_arguments("INOUT n integer"), Err(Rejection::Direction(_))));
        assert!(matches!(parse_arguments("IN n integer"), Err(Rejection::Direction(_))));
        assert!(matches!(parse_arguments("g geometry"), Err(Rejection::Unresolved(_))));
    }

    #[test]
    fn result_shapes() {
        assert!(parse_result("void").unwrap().is_empty());

        let scalar = parse_result("bigint").unwrap();
        assert_eq!(scalar.len(), 1);
        assert_eq!(scalar[0].name, "Result");
        assert_eq!(scalar[0].kind, Kind::Number);

        let set = parse_result("SETOF text").unwrap();
        assert_eq!(set[0].name, "Result");
        assert_eq!(set[0].kind, Kind::String);

        let table = parse_result("TABLE(id integer, character varying, score numeric(5,2))").unwrap();
        let names: Vec<_> = table.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["id", "Result2", "score"]);
    }

    #[test]
    fn quoted_names_lose_their_quotes() {
        let table = parse_result("TABLE(\"order\" integer, \"my col\" text, \"say \"\"hi\"\"\" text)").unwrap();
        let names: Vec<_> = table.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["order", "my col", "say \"hi\""]);
        assert_eq!(table[0].kind, Kind::Number);

        let args = parse_arguments("\"from\" date, \"to\" date").unwrap();
        let names: Vec<_> = args.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["from", "to"]);
    }

    #[test]
    fn unquote_leaves_plain_names_alone() {
        assert_eq!(unquote("plain"), "plain");
        assert_eq!(unquote("\"Mixed Case\""), "Mixed Case");
        assert_eq!(unquote("\""), "\"");
    }

    #[test]
    fn result_rejections() {
        assert_eq!(parse_result("trigger"), Err(Rejection::Trigger("trigger".to_string())));
        assert_eq!(
            parse_result("TABLE(\"ID\" integer)"),
            Err(Rejection::CaseSensitive("ID".to_string()))
        );
        assert_eq!(parse_result("TABLE(ID integer)"), Err(Rejection::CaseSensitive("ID".to_string())));
        assert!(matches!(parse_result("record"), Err(Rejection::Unresolved(_))));
        assert!(matches!(parse_result("SETOF timestamp[]"), Err(Rejection::Unresolved(_))));
    }
}
