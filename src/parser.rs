//! Text to syntax tree.
//!
//! Produces a tree of tagged [`SyntaxNode`]s in the same shape a combinator
//! grammar library emits: every node carries a `|`-separated tag naming the
//! rules that matched it, its matched text, and its children. Punctuation and
//! start/end markers stay in the tree; the reader skips them.

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{anychar, char, digit1, multispace0, none_of},
    combinator::{map, opt, recognize},
    multi::{many0, many0_count},
    sequence::{delimited, pair, preceded},
};
use serde::Serialize;

use crate::LispError;

pub const ROOT_TAG: &str = ">";
pub const NUMBER_TAG: &str = "expr|number|regex";
pub const SYMBOL_TAG: &str = "expr|symbol|regex";
pub const STRING_TAG: &str = "expr|string|regex";
pub const COMMENT_TAG: &str = "expr|comment|regex";
pub const SEXPR_TAG: &str = "expr|sexpr|>";
pub const QEXPR_TAG: &str = "expr|qexpr|>";

/// One node of the parse tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntaxNode {
    pub tag: String,
    pub contents: String,
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    pub fn leaf(tag: &str, contents: &str) -> Self {
        SyntaxNode {
            tag: tag.to_string(),
            contents: contents.to_string(),
            children: Vec::new(),
        }
    }

    pub fn branch(tag: &str, children: Vec<SyntaxNode>) -> Self {
        SyntaxNode {
            tag: tag.to_string(),
            contents: String::new(),
            children,
        }
    }

    /// Render as pretty-printed JSON
    pub fn to_json(&self) -> String {
        // Serializing plain strings and vectors cannot fail
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

fn is_symbol_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "_+-*/\\=<>!&%".contains(c)
}

/// Parse a number: `-?[0-9]+`
///
/// Overflowing literals are still numbers here; the reader reports them.
fn parse_number(input: &str) -> IResult<&str, SyntaxNode> {
    map(recognize(pair(opt(char('-')), digit1)), |s: &str| {
        SyntaxNode::leaf(NUMBER_TAG, s)
    })(input)
}

/// Parse a symbol (identifier or operator)
fn parse_symbol(input: &str) -> IResult<&str, SyntaxNode> {
    map(take_while1(is_symbol_char), |s: &str| {
        SyntaxNode::leaf(SYMBOL_TAG, s)
    })(input)
}

/// Parse a string literal, keeping quotes and escapes verbatim
fn parse_string(input: &str) -> IResult<&str, SyntaxNode> {
    let escape = recognize(pair(char('\\'), anychar));
    let plain = recognize(none_of("\\\""));
    map(
        recognize(delimited(
            char('"'),
            many0_count(alt((escape, plain))),
            char('"'),
        )),
        |s: &str| SyntaxNode::leaf(STRING_TAG, s),
    )(input)
}

/// Parse a line comment starting with `;`
fn parse_comment(input: &str) -> IResult<&str, SyntaxNode> {
    map(
        recognize(pair(char(';'), take_while(|c: char| c != '\r' && c != '\n'))),
        |s: &str| SyntaxNode::leaf(COMMENT_TAG, s),
    )(input)
}

/// Parse a delimited list, keeping the delimiters as `char` children
fn parse_delimited<'a>(
    input: &'a str,
    open: char,
    close: char,
    tag: &str,
) -> IResult<&'a str, SyntaxNode> {
    let (input, _) = char(open)(input)?;
    let (input, items) = many0(preceded(multispace0, parse_expr))(input)?;
    let (input, _) = preceded(multispace0, char(close))(input)?;

    let mut children = Vec::with_capacity(items.len() + 2);
    children.push(SyntaxNode::leaf("char", &open.to_string()));
    children.extend(items);
    children.push(SyntaxNode::leaf("char", &close.to_string()));
    Ok((input, SyntaxNode::branch(tag, children)))
}

fn parse_sexpr(input: &str) -> IResult<&str, SyntaxNode> {
    parse_delimited(input, '(', ')', SEXPR_TAG)
}

fn parse_qexpr(input: &str) -> IResult<&str, SyntaxNode> {
    parse_delimited(input, '{', '}', QEXPR_TAG)
}

/// Parse a single expression
fn parse_expr(input: &str) -> IResult<&str, SyntaxNode> {
    alt((
        parse_number,
        parse_symbol,
        parse_string,
        parse_comment,
        parse_sexpr,
        parse_qexpr,
    ))(input)
}

/// Explain why parsing stopped at `remaining`
fn parse_error_to_message(input: &str, remaining: &str) -> String {
    let position = input.len().saturating_sub(remaining.len());
    let opens = remaining.chars().filter(|c| matches!(c, '(' | '{')).count();
    let closes = remaining.chars().filter(|c| matches!(c, ')' | '}')).count();

    match remaining.chars().next() {
        Some(c @ (')' | '}')) => {
            format!("Unexpected closing delimiter '{}' at position {}", c, position)
        }
        Some('"') if !remaining[1..].contains('"') => {
            format!("Unterminated string literal at position {}", position)
        }
        Some('(' | '{') if opens > closes => {
            format!("Missing closing delimiter for expression at position {}", position)
        }
        _ => {
            let snippet: String = remaining.chars().take(10).collect();
            format!("Invalid syntax near '{}' at position {}", snippet, position)
        }
    }
}

/// Parse a whole line or file into a root node holding every top-level expression
pub fn parse(input: &str) -> Result<SyntaxNode, LispError> {
    let (remaining, items) = many0(preceded(multispace0, parse_expr))(input)
        .map_err(|_| LispError::Parse(parse_error_to_message(input, input)))?;
    let remaining = remaining.trim_start();

    if !remaining.is_empty() {
        return Err(LispError::Parse(parse_error_to_message(input, remaining)));
    }

    let mut children = Vec::with_capacity(items.len() + 2);
    children.push(SyntaxNode::leaf("regex", ""));
    children.extend(items);
    children.push(SyntaxNode::leaf("regex", ""));
    Ok(SyntaxNode::branch(ROOT_TAG, children))
}
