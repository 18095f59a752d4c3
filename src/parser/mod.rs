//! Project-file parser
//!
//! A hand-written recursive-descent parser with three entry points, one per
//! grammar:
//!
//! - [`parse_project`]: whole files and `eval()` snippets
//! - [`parse_condition`]: a single condition, as used by `if()` and
//!   `Project::test_condition`
//! - [`parse_value_expression`]: a single right-hand side, as used by
//!   `Project::expand`

pub mod error;
pub mod lexer;
mod statement;
mod word;

pub use error::{ParseError, ParseResult};

use crate::ast::{Block, Condition, Expr, ProFile};
use crate::diagnostics::SourceLocation;
use lexer::Cursor;
use std::sync::Arc;

/// Parser state shared by the grammar modules
pub(crate) struct Parser<'a> {
    cur: Cursor<'a>,
    file: Arc<str>,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(source: &'a str, file: Arc<str>, line: u32) -> Self {
        Self {
            cur: Cursor::new(source, line),
            file,
        }
    }

    fn location_at(&self, line: u32) -> SourceLocation {
        SourceLocation::new(self.file.clone(), line)
    }

    fn location(&self) -> SourceLocation {
        self.location_at(self.cur.line())
    }

    /// Error for whatever character sits at the cursor
    fn unexpected(&self) -> ParseError {
        match self.cur.peek_char() {
            Some(found) => ParseError::UnexpectedChar {
                found,
                location: self.location(),
            },
            None => ParseError::InvalidControl {
                message: "unexpected end of input".to_string(),
                location: self.location(),
            },
        }
    }

    fn expect_end(&mut self, what: &'static str) -> ParseResult<()> {
        self.cur.skip_blank_lines();
        if self.cur.at_end() {
            Ok(())
        } else {
            Err(ParseError::TrailingInput {
                what,
                location: self.location(),
            })
        }
    }
}

/// Parse a complete project file
pub fn parse_project(source: &str, file: impl Into<Arc<str>>) -> ParseResult<ProFile> {
    let file = file.into();
    let statements = parse_statements(source, file.clone(), 1)?;
    Ok(ProFile::new(file, statements))
}

/// Parse statements that start on `line` of `file`
pub fn parse_statements(source: &str, file: Arc<str>, line: u32) -> ParseResult<Block> {
    let mut parser = Parser::new(source, file, line);
    parser.parse_block(None)
}

/// Parse a single condition such as `win32:!contains(CONFIG, static)`
pub fn parse_condition(source: &str, file: impl Into<Arc<str>>, line: u32) -> ParseResult<Condition> {
    let mut parser = Parser::new(source, file.into(), line);
    parser.cur.skip_blank_lines();
    let condition = parser.parse_bare_condition()?;
    parser.expect_end("condition")?;
    Ok(condition)
}

/// Parse a single value expression such as `$$TARGET-$$VERSION`
pub fn parse_value_expression(source: &str, file: impl Into<Arc<str>>, line: u32) -> ParseResult<Expr> {
    let mut parser = Parser::new(source, file.into(), line);
    let expr = parser.parse_value(false)?;
    parser.expect_end("expression")?;
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AssignOp, FunctionKind, Otherwise, Segment, Statement, Word};
    use pretty_assertions::assert_eq;

    fn parse(src: &str) -> Block {
        parse_project(src, "t.pro").unwrap().statements
    }

    fn lit(s: &str) -> Word {
        Word::literal(s)
    }

    #[test]
    fn test_assignments() {
        let block = parse("X = a b c\nY += d\nZ *= e\nW -= f\nV ~= s/a/b/g\n");
        let ops: Vec<AssignOp> = block
            .iter()
            .map(|s| match s {
                Statement::Assign { op, .. } => *op,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(
            ops,
            vec![
                AssignOp::Set,
                AssignOp::Append,
                AssignOp::AppendUnique,
                AssignOp::Remove,
                AssignOp::Replace
            ]
        );
        match &block[0] {
            Statement::Assign { name, value, line, .. } => {
                assert_eq!(name, &lit("X"));
                assert_eq!(value.words, vec![lit("a"), lit("b"), lit("c")]);
                assert_eq!(*line, 1);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_quotes_and_escapes() {
        let block = parse("X = \"a b\" c\\\"d \\$\\$e \"\"\n");
        match &block[0] {
            Statement::Assign { value, .. } => {
                assert_eq!(value.words.len(), 4);
                assert_eq!(value.words[0].segments.as_slice(), &[Segment::Literal("a b".into())]);
                assert!(value.words[0].quoted);
                assert_eq!(value.words[1].as_literal(), Some("c\"d"));
                assert_eq!(value.words[2].as_literal(), Some("$$e"));
                assert!(value.words[3].quoted && value.words[3].segments.is_empty());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_expansions() {
        let block = parse("X = $$A $${B}_x $$[P] $$(E) $(MAKE) $$f(a b, c)\n");
        let Statement::Assign { value, .. } = &block[0] else {
            panic!("expected assignment");
        };
        assert_eq!(value.words[0].segments.as_slice(), &[Segment::Variable("A".into())]);
        assert_eq!(
            value.words[1].segments.as_slice(),
            &[Segment::Variable("B".into()), Segment::Literal("_x".into())]
        );
        assert_eq!(value.words[2].segments.as_slice(), &[Segment::Property("P".into())]);
        assert_eq!(value.words[3].segments.as_slice(), &[Segment::Env("E".into())]);
        assert_eq!(value.words[4].as_literal(), Some("$(MAKE)"));
        match &value.words[5].segments[0] {
            Segment::Call { name, args } => {
                assert_eq!(name, "f");
                assert_eq!(args.len(), 2);
                assert_eq!(args[0].words, vec![lit("a"), lit("b")]);
                assert_eq!(args[1].words, vec![lit("c")]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_continuation_and_comments() {
        let block = parse("SOURCES = a.cpp \\\n    b.cpp # trailing\n# whole line\nY = 1\n");
        assert_eq!(block.len(), 2);
        let Statement::Assign { value, .. } = &block[0] else {
            panic!("expected assignment");
        };
        assert_eq!(value.words, vec![lit("a.cpp"), lit("b.cpp")]);
        assert_eq!(block[1].line(), 4);
    }

    #[test]
    fn test_condition_precedence() {
        let block = parse("a|b:!c { X = 1 }\n");
        let Statement::Conditional { condition, then, .. } = &block[0] else {
            panic!("expected conditional");
        };
        match condition {
            Condition::And(terms) => {
                assert_eq!(terms.len(), 2);
                assert!(matches!(&terms[0], Condition::Or(alts) if alts.len() == 2));
                assert!(matches!(&terms[1], Condition::Not(_)));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(then.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_single_line_scope() {
        let block = parse("unix:debug: LIBS += -lfoo\n");
        let Statement::Conditional { condition, then, .. } = &block[0] else {
            panic!("expected conditional");
        };
        assert!(matches!(condition, Condition::And(terms) if terms.len() == 2));
        let then = then.as_ref().unwrap();
        assert!(matches!(&then[0], Statement::Assign { op: AssignOp::Append, .. }));
    }

    #[test]
    fn test_else_chain() {
        let block = parse("a {\n X = 1\n} else: b {\n X = 2\n} else {\n X = 3\n}\n");
        assert_eq!(block.len(), 1);
        let Statement::Conditional { otherwise: Some(Otherwise::Chain(chain)), .. } = &block[0] else {
            panic!("expected else chain");
        };
        let Statement::Conditional { otherwise, .. } = chain.as_ref() else {
            panic!("expected chained conditional");
        };
        assert!(matches!(otherwise, Some(Otherwise::Block(b)) if b.len() == 1));
    }

    #[test]
    fn test_function_definitions_and_for() {
        let block = parse(
            "defineTest(isFoo) {\n  return(true)\n}\ndefineReplace(twice): return($$1 $$1)\nfor(f, FILES) {\n  X += $$f\n}\n",
        );
        assert!(matches!(
            &block[0],
            Statement::FunctionDef { kind: FunctionKind::Test, name, body, .. } if name == "isFoo" && body.len() == 1
        ));
        assert!(matches!(
            &block[1],
            Statement::FunctionDef { kind: FunctionKind::Replace, name, .. } if name == "twice"
        ));
        assert!(matches!(&block[2], Statement::For { var, .. } if var == "f"));
    }

    #[test]
    fn test_errors() {
        assert!(matches!(parse_project("a {\nX = 1\n", "t.pro"), Err(ParseError::MissingBrace { .. })));
        assert!(matches!(parse_project("}\n", "t.pro"), Err(ParseError::ExcessBrace { .. })));
        assert!(matches!(parse_project("X = \"open\n", "t.pro"), Err(ParseError::MissingQuote { .. })));
        assert!(matches!(parse_project("f(a, b\n", "t.pro"), Err(ParseError::MissingParen { .. })));
        assert!(matches!(parse_project("else { }\n", "t.pro"), Err(ParseError::MisplacedElse { .. })));
        assert!(matches!(
            parse_project("defineTest(a, b) { }\n", "t.pro"),
            Err(ParseError::InvalidControl { .. })
        ));
    }

    #[test]
    fn test_condition_grammar() {
        let condition = parse_condition("win32:contains(CONFIG, static)", "t.pro", 1).unwrap();
        assert!(matches!(condition, Condition::And(ref t) if t.len() == 2));
        assert!(parse_condition("a { }", "t.pro", 1).is_err());
    }

    #[test]
    fn test_value_grammar() {
        let expr = parse_value_expression("$$A-suffix b", "t.pro", 1).unwrap();
        assert_eq!(expr.words.len(), 2);
        assert!(parse_value_expression("\"open", "t.pro", 1).is_err());
    }
}
