//! Boolean license expression grammar.
//!
//! `WITH` binds tighter than `AND`, which binds tighter than `OR`. Operators
//! are matched case-insensitively and printed upper case. Runs of the same
//! operator collapse into one node, while an explicitly parenthesized group
//! stays a node of its own, so `(A OR B) OR C` prints back unchanged.

use super::ExpressionError;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    Open,
    Close,
    And,
    Or,
    With,
    Word(&'a str),
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "("),
            Self::Close => write!(f, ")"),
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
            Self::With => write!(f, "WITH"),
            Self::Word(word) => write!(f, "{word}"),
        }
    }
}

fn word_token(word: &str) -> Token<'_> {
    match word.to_ascii_uppercase().as_str() {
        "AND" => Token::And,
        "OR" => Token::Or,
        "WITH" => Token::With,
        _ => Token::Word(word),
    }
}

fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut word_start: Option<usize> = None;

    for (idx, c) in text.char_indices() {
        if c.is_whitespace() || c == '(' || c == ')' {
            if let Some(start) = word_start.take() {
                tokens.push(word_token(&text[start..idx]));
            }
            match c {
                '(' => tokens.push(Token::Open),
                ')' => tokens.push(Token::Close),
                _ => {}
            }
        } else if word_start.is_none() {
            word_start = Some(idx);
        }
    }
    if let Some(start) = word_start {
        tokens.push(word_token(&text[start..]));
    }
    tokens
}

/// Parsed expression tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Node {
    License(String),
    With { license: String, exception: String },
    And(Vec<Node>),
    Or(Vec<Node>),
}

impl Node {
    const fn is_compound(&self) -> bool {
        matches!(self, Self::And(_) | Self::Or(_))
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (children, op) = match self {
            Self::License(id) => return write!(f, "{id}"),
            Self::With { license, exception } => return write!(f, "{license} WITH {exception}"),
            Self::And(children) => (children, " AND "),
            Self::Or(children) => (children, " OR "),
        };
        for (idx, child) in children.iter().enumerate() {
            if idx > 0 {
                f.write_str(op)?;
            }
            if child.is_compound() {
                write!(f, "({child})")?;
            } else {
                write!(f, "{child}")?;
            }
        }
        Ok(())
    }
}

/// Deepest parenthesis nesting the parser descends into
pub(crate) const MAX_NESTING_DEPTH: usize = 256;

struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token<'a>> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn error(&self, message: impl Into<String>) -> ExpressionError {
        ExpressionError::new(message, self.pos)
    }

    fn or_expr(&mut self) -> Result<Node, ExpressionError> {
        let mut children = vec![self.and_expr()?];
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            children.push(self.and_expr()?);
        }
        Ok(if children.len() == 1 {
            children.remove(0)
        } else {
            Node::Or(children)
        })
    }

    fn and_expr(&mut self) -> Result<Node, ExpressionError> {
        let mut children = vec![self.with_expr()?];
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            children.push(self.with_expr()?);
        }
        Ok(if children.len() == 1 {
            children.remove(0)
        } else {
            Node::And(children)
        })
    }

    fn with_expr(&mut self) -> Result<Node, ExpressionError> {
        let node = self.primary()?;
        if self.peek() != Some(&Token::With) {
            return Ok(node);
        }
        let Node::License(license) = node else {
            return Err(self.error("WITH must follow a single license identifier"));
        };
        self.pos += 1;
        match self.next() {
            Some(Token::Word(exception)) => Ok(Node::With {
                license,
                exception: exception.to_string(),
            }),
            Some(other) => Err(self.error(format!("expected an exception after WITH, found {other}"))),
            None => Err(self.error("expected an exception after WITH")),
        }
    }

    fn primary(&mut self) -> Result<Node, ExpressionError> {
        match self.next() {
            Some(Token::Word(word)) => Ok(Node::License(word.to_string())),
            Some(Token::Open) => {
                if self.depth >= MAX_NESTING_DEPTH {
                    return Err(self.error(format!(
                        "expression nested too deeply (more than {MAX_NESTING_DEPTH} groups)"
                    )));
                }
                self.depth += 1;
                let inner = self.or_expr()?;
                self.depth -= 1;
                match self.next() {
                    Some(Token::Close) => Ok(inner),
                    _ => Err(self.error("unbalanced parenthesis: missing \")\"")),
                }
            }
            Some(Token::Close) => Err(self.error("unexpected \")\"")),
            Some(op) => Err(self.error(format!("unexpected operator {op}"))),
            None => Err(self.error("expression ends with an operator")),
        }
    }
}

/// Parse `text` into a tree.
pub(crate) fn parse(text: &str) -> Result<Node, ExpressionError> {
    let tokens = tokenize(text);
    if tokens.is_empty() {
        return Err(ExpressionError::new("empty license expression", 0));
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let node = parser.or_expr()?;
    match parser.peek() {
        None => Ok(node),
        Some(Token::Close) => Err(parser.error("unbalanced parenthesis: unexpected \")\"")),
        Some(token) => Err(parser.error(format!(
            "invalid symbol sequence: expected an operator before \"{token}\""
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn print(text: &str) -> String {
        parse(text).unwrap().to_string()
    }

    #[test]
    fn test_single_license() {
        assert_eq!(print("MIT"), "MIT");
        assert_eq!(print("  (MIT) "), "MIT");
        assert_eq!(print("((MIT))"), "MIT");
    }

    #[test]
    fn test_operator_case_and_spacing() {
        assert_eq!(print("MIT or Apache-2.0"), "MIT OR Apache-2.0");
        assert_eq!(print("MIT  and\tBSD-3-Clause"), "MIT AND BSD-3-Clause");
        assert_eq!(print("(MIT)OR(ISC)"), "MIT OR ISC");
    }

    #[test]
    fn test_groups_are_kept() {
        assert_eq!(
            print("(GPL-2.0-only OR GPL-3.0-only) OR BSD-3-Clause"),
            "(GPL-2.0-only OR GPL-3.0-only) OR BSD-3-Clause"
        );
        assert_eq!(print("A OR B OR C"), "A OR B OR C");
        assert_eq!(print("( A OR B )"), "A OR B");
    }

    #[test]
    fn test_precedence() {
        assert_eq!(print("A AND B OR C"), "(A AND B) OR C");
        assert_eq!(print("A OR B AND C"), "A OR (B AND C)");
        assert_eq!(
            print("GPL-2.0-only WITH Classpath-exception-2.0 OR MIT"),
            "GPL-2.0-only WITH Classpath-exception-2.0 OR MIT"
        );
    }

    #[test]
    fn test_errors() {
        assert!(parse("").is_err());
        assert!(parse("   ").is_err());
        assert!(parse("MIT OR").is_err());
        assert!(parse("OR MIT").is_err());
        assert!(parse("(MIT").is_err());
        assert!(parse("MIT)").is_err());
        assert!(parse("BSD 3 Clause").is_err());
        assert!(parse("(A OR B) WITH X").is_err());
        assert!(parse("A WITH").is_err());
        assert!(parse("A WITH (X)").is_err());
    }

    #[test]
    fn test_nesting_depth() {
        let nested = |depth: usize| format!("{}MIT{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(print(&nested(MAX_NESTING_DEPTH)), "MIT");

        let err = parse(&nested(MAX_NESTING_DEPTH + 1)).unwrap_err();
        assert!(err.message.contains("nested too deeply"), "{err}");
        let err = parse(&nested(10_000)).unwrap_err();
        assert!(err.message.contains("nested too deeply"), "{err}");
    }

    #[test]
    fn test_error_message() {
        let err = parse("BSD 3 Clause").unwrap_err();
        assert!(err.to_string().contains("expected an operator before \"3\""), "{err}");
    }
}
