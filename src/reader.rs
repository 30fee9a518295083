use crate::LispError;
use crate::ast::Value;
use crate::parser::SyntaxNode;

/// Convert a syntax tree node, and recursively its children, into a value
///
/// Dispatches on substrings of the node tag. The root node and anything tagged
/// `sexpr` become S-expressions; `qexpr` nodes become Q-expressions. A number
/// literal that does not fit in an `i64` becomes an `invalid number` error value.
pub fn read(node: &SyntaxNode) -> Value {
    if node.tag.contains("number") {
        return read_number(&node.contents);
    }
    if node.tag.contains("symbol") {
        return Value::Symbol(node.contents.clone());
    }
    if node.tag.contains("string") {
        return read_string(&node.contents);
    }

    let items = node
        .children
        .iter()
        .filter(|child| !is_punctuation(child))
        .map(read)
        .collect();

    if node.tag.contains("qexpr") {
        Value::qexpr(items)
    } else {
        Value::sexpr(items)
    }
}

fn read_number(text: &str) -> Value {
    match text.parse::<i64>() {
        Ok(n) => Value::Number(n),
        Err(_) => LispError::MalformedNumber.into(),
    }
}

fn read_string(text: &str) -> Value {
    let inner = text
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(text);
    Value::String(unescape(inner))
}

/// Delimiters, start/end markers and comments carry no value
fn is_punctuation(node: &SyntaxNode) -> bool {
    node.tag == "regex"
        || node.tag.contains("comment")
        || matches!(node.contents.as_str(), "(" | ")" | "{" | "}")
}

/// Resolve backslash escapes; unknown escapes keep the escaped character
pub fn unescape(text: &str) -> String {
    let mut chars = text.chars();
    let mut unescaped = String::with_capacity(text.len());
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            unescaped.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => unescaped.push('\n'),
            Some('t') => unescaped.push('\t'),
            Some('r') => unescaped.push('\r'),
            Some('0') => unescaped.push('\0'),
            Some(c) => unescaped.push(c),
            None => unescaped.push('\\'),
        }
    }
    unescaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{NUMBER_TAG, QEXPR_TAG, SEXPR_TAG, SYMBOL_TAG, parse};

    fn read_str(input: &str) -> Value {
        read(&parse(input).unwrap())
    }

    #[test]
    fn test_read_number() {
        assert_eq!(read(&SyntaxNode::leaf(NUMBER_TAG, "42")), Value::Number(42));
        assert_eq!(read(&SyntaxNode::leaf(NUMBER_TAG, "-7")), Value::Number(-7));
        assert_eq!(
            read(&SyntaxNode::leaf(NUMBER_TAG, "9223372036854775808")),
            Value::error("invalid number")
        );
        assert_eq!(
            read(&SyntaxNode::leaf(NUMBER_TAG, "-9223372036854775808")),
            Value::Number(i64::MIN)
        );
    }

    #[test]
    fn test_read_string_unescapes() {
        assert_eq!(read_str(r#""hi""#), Value::sexpr(vec![Value::string("hi")]));
        assert_eq!(
            read_str(r#""a\nb\"c\\""#),
            Value::sexpr(vec![Value::string("a\nb\"c\\")])
        );
        assert_eq!(unescape(r"\q"), "q");
    }

    #[test]
    fn test_read_root_is_sexpr() {
        assert_eq!(
            read_str("+ 1 2"),
            Value::sexpr(vec![Value::symbol("+"), Value::Number(1), Value::Number(2)])
        );
        assert_eq!(read_str(""), Value::sexpr(vec![]));
    }

    #[test]
    fn test_read_nested_lists() {
        assert_eq!(
            read_str("(head {1 (2)}) ; ignored"),
            Value::sexpr(vec![Value::sexpr(vec![
                Value::symbol("head"),
                Value::qexpr(vec![
                    Value::Number(1),
                    Value::sexpr(vec![Value::Number(2)])
                ]),
            ])])
        );
    }

    #[test]
    fn test_read_hand_built_tree() {
        // Trees from any producer work as long as the tags follow the convention
        let node = SyntaxNode::branch(
            SEXPR_TAG,
            vec![
                SyntaxNode::leaf("char", "("),
                SyntaxNode::leaf(SYMBOL_TAG, "list"),
                SyntaxNode::branch(
                    QEXPR_TAG,
                    vec![SyntaxNode::leaf("char", "{"), SyntaxNode::leaf("char", "}")],
                ),
                SyntaxNode::leaf("regex", ""),
                SyntaxNode::leaf("char", ")"),
            ],
        );
        assert_eq!(
            read(&node),
            Value::sexpr(vec![Value::symbol("list"), Value::qexpr(vec![])])
        );
    }
}
