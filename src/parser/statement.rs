//! Statement and condition grammar

use super::error::{ParseError, ParseResult};
use super::word::WordContext;
use super::Parser;
use crate::ast::{AssignOp, Block, Condition, FunctionKind, Otherwise, Statement};
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
enum Control {
    Define(FunctionKind),
    For,
}

impl Control {
    fn keyword(self) -> &'static str {
        match self {
            Control::Define(FunctionKind::Test) => "defineTest",
            Control::Define(FunctionKind::Replace) => "defineReplace",
            Control::For => "for",
        }
    }
}

/// Hang `otherwise` off the innermost open `else` slot of `target`
fn attach_else(target: &mut Statement, otherwise: Otherwise) -> Result<(), Otherwise> {
    match target {
        Statement::Conditional { otherwise: slot, .. } => match slot {
            None => {
                *slot = Some(otherwise);
                Ok(())
            }
            Some(Otherwise::Chain(inner)) => attach_else(inner, otherwise),
            Some(Otherwise::Block(_)) => Err(otherwise),
        },
        _ => Err(otherwise),
    }
}

fn collapse(mut terms: Vec<Condition>, make: fn(Vec<Condition>) -> Condition) -> Condition {
    if terms.len() == 1 {
        terms.remove(0)
    } else {
        make(terms)
    }
}

impl Parser<'_> {
    /// Parse statements until end of input, or until `}` when `open` holds
    /// the line of the opening brace
    pub(crate) fn parse_block(&mut self, open: Option<u32>) -> ParseResult<Block> {
        let mut block = Block::new();
        loop {
            self.cur.skip_blank_lines();
            match self.cur.peek() {
                None => {
                    return match open {
                        Some(line) => Err(ParseError::MissingBrace {
                            location: self.location_at(line),
                        }),
                        None => Ok(block),
                    };
                }
                Some(b'}') => {
                    if open.is_none() {
                        return Err(ParseError::ExcessBrace {
                            location: self.location(),
                        });
                    }
                    self.cur.bump();
                    return Ok(block);
                }
                _ => self.parse_statement_into(&mut block, open.is_some())?,
            }
        }
    }

    fn parse_statement_into(&mut self, block: &mut Block, in_block: bool) -> ParseResult<()> {
        if self.cur.at_keyword("else") {
            let location = self.location();
            self.cur.advance(4);
            let otherwise = self.parse_else_body(in_block)?;
            let attached = match block.last_mut() {
                Some(last) => attach_else(last, otherwise).is_ok(),
                None => false,
            };
            if !attached {
                return Err(ParseError::MisplacedElse { location });
            }
        } else {
            let statement = self.parse_statement(in_block)?;
            block.push(statement);
        }
        self.finish_line()
    }

    fn finish_line(&mut self) -> ParseResult<()> {
        self.cur.skip_blanks();
        match self.cur.peek() {
            None | Some(b'\n') | Some(b'}') => Ok(()),
            _ if self.cur.at_keyword("else") => Ok(()),
            _ => Err(self.unexpected()),
        }
    }

    fn parse_else_body(&mut self, in_block: bool) -> ParseResult<Otherwise> {
        self.cur.skip_blanks();
        let line = self.cur.line();
        match self.cur.peek() {
            Some(b'{') => {
                self.cur.bump();
                Ok(Otherwise::Block(self.parse_block(Some(line))?))
            }
            Some(b':') => {
                self.cur.bump();
                self.cur.skip_blanks();
                Ok(Otherwise::Chain(Box::new(self.parse_statement(in_block)?)))
            }
            _ => Err(ParseError::InvalidControl {
                message: "expected '{' or ':' after else".to_string(),
                location: self.location(),
            }),
        }
    }

    fn peek_control(&self) -> Option<Control> {
        [
            Control::Define(FunctionKind::Test),
            Control::Define(FunctionKind::Replace),
            Control::For,
        ]
        .into_iter()
        .find(|control| {
            let keyword = control.keyword();
            self.cur.starts_with(keyword) && self.cur.peek_at(keyword.len()) == Some(b'(')
        })
    }

    fn parse_assign_op(&mut self) -> Option<AssignOp> {
        let (op, len) = match (self.cur.peek()?, self.cur.peek_at(1)) {
            (b'=', _) => (AssignOp::Set, 1),
            (b'+', Some(b'=')) => (AssignOp::Append, 2),
            (b'*', Some(b'=')) => (AssignOp::AppendUnique, 2),
            (b'-', Some(b'=')) => (AssignOp::Remove, 2),
            (b'~', Some(b'=')) => (AssignOp::Replace, 2),
            _ => return None,
        };
        self.cur.advance(len);
        Some(op)
    }

    /// Whether a full statement, rather than another condition term,
    /// follows a `:`
    fn statement_follows(&mut self) -> ParseResult<bool> {
        if self.peek_control().is_some() {
            return Ok(true);
        }
        if self.cur.peek() == Some(b'!') {
            return Ok(false);
        }
        let mark = self.cur.mark();
        let mut depth = 0;
        let is_assignment = match self.parse_word(WordContext::Head, &mut depth)? {
            Some(_) => {
                self.cur.skip_blanks();
                self.parse_assign_op().is_some()
            }
            None => false,
        };
        self.cur.reset(mark);
        Ok(is_assignment)
    }

    pub(crate) fn parse_statement(&mut self, in_block: bool) -> ParseResult<Statement> {
        let line = self.cur.line();
        if let Some(control) = self.peek_control() {
            return self.parse_control(control, in_block);
        }

        if self.cur.peek() != Some(b'!') {
            let mark = self.cur.mark();
            let mut depth = 0;
            if let Some(name) = self.parse_word(WordContext::Head, &mut depth)? {
                self.cur.skip_blanks();
                if let Some(op) = self.parse_assign_op() {
                    let value = self.parse_value(in_block)?;
                    return Ok(Statement::Assign {
                        name,
                        op,
                        value,
                        line,
                    });
                }
            }
            self.cur.reset(mark);
        }

        let (condition, then) = self.parse_condition_chain(in_block)?;
        Ok(Statement::Conditional {
            condition,
            then,
            otherwise: None,
            line,
        })
    }

    /// `a|b:c` followed by `{ block }`, `: statement` or nothing
    fn parse_condition_chain(&mut self, in_block: bool) -> ParseResult<(Condition, Option<Block>)> {
        let line = self.cur.line();
        let mut and_terms = Vec::new();
        let mut or_terms = Vec::new();
        let mut then = None;

        loop {
            or_terms.push(self.parse_condition_atom()?);
            self.cur.skip_blanks();
            match self.cur.peek() {
                Some(b'|') => {
                    self.cur.bump();
                    self.cur.skip_blanks();
                }
                Some(b':') => {
                    self.cur.bump();
                    self.cur.skip_blanks();
                    and_terms.push(collapse(std::mem::take(&mut or_terms), Condition::Or));
                    if self.statement_follows()? {
                        then = Some(vec![self.parse_statement(in_block)?]);
                        break;
                    }
                    if self.cur.peek() == Some(b'{') {
                        self.cur.bump();
                        then = Some(self.parse_block(Some(line))?);
                        break;
                    }
                }
                Some(b'{') => {
                    self.cur.bump();
                    and_terms.push(collapse(std::mem::take(&mut or_terms), Condition::Or));
                    then = Some(self.parse_block(Some(line))?);
                    break;
                }
                _ => {
                    and_terms.push(collapse(std::mem::take(&mut or_terms), Condition::Or));
                    break;
                }
            }
        }

        Ok((collapse(and_terms, Condition::And), then))
    }

    /// A condition without branches, for the test grammar
    pub(crate) fn parse_bare_condition(&mut self) -> ParseResult<Condition> {
        let mut and_terms = Vec::new();
        let mut or_terms = Vec::new();
        loop {
            or_terms.push(self.parse_condition_atom()?);
            self.cur.skip_blanks();
            match self.cur.peek() {
                Some(b'|') => {
                    self.cur.bump();
                    self.cur.skip_blanks();
                }
                Some(b':') => {
                    self.cur.bump();
                    self.cur.skip_blanks();
                    and_terms.push(collapse(std::mem::take(&mut or_terms), Condition::Or));
                }
                _ => {
                    and_terms.push(collapse(std::mem::take(&mut or_terms), Condition::Or));
                    break;
                }
            }
        }
        Ok(collapse(and_terms, Condition::And))
    }

    fn parse_condition_atom(&mut self) -> ParseResult<Condition> {
        self.cur.skip_blanks();
        let mut negate = false;
        while self.cur.peek() == Some(b'!') {
            self.cur.bump();
            self.cur.skip_blanks();
            negate = !negate;
        }

        let line = self.cur.line();
        let mut depth = 0;
        let Some(word) = self.parse_word(WordContext::Head, &mut depth)? else {
            return Err(self.unexpected());
        };

        let atom = if self.cur.peek() == Some(b'(') {
            self.cur.bump();
            let args = self.parse_args(line)?;
            let Some(name) = word.as_literal() else {
                return Err(ParseError::InvalidControl {
                    message: "function names cannot contain expansions or quotes".to_string(),
                    location: self.location_at(line),
                });
            };
            Condition::Test {
                name: name.to_string(),
                args,
                line,
            }
        } else {
            Condition::Config { word, line }
        };

        Ok(if negate {
            Condition::Not(Box::new(atom))
        } else {
            atom
        })
    }

    fn parse_control(&mut self, control: Control, in_block: bool) -> ParseResult<Statement> {
        let line = self.cur.line();
        let keyword = control.keyword();
        self.cur.advance(keyword.len() + 1);
        let mut args = self.parse_args(line)?;

        match control {
            Control::Define(kind) => {
                let name = match args.as_slice() {
                    [arg] => arg.as_literal().map(str::to_string),
                    _ => None,
                };
                let Some(name) = name else {
                    return Err(self.invalid_control(format!("{keyword}() requires one literal function name"), line));
                };
                let body = self.parse_control_body(keyword, line, in_block)?;
                Ok(Statement::FunctionDef {
                    kind,
                    name,
                    body: Arc::new(body),
                    line,
                })
            }
            Control::For => {
                if args.len() != 2 {
                    return Err(self.invalid_control("for() requires a variable and a list".to_string(), line));
                }
                let list = args.pop().unwrap_or_default();
                let Some(var) = args[0].as_literal().map(str::to_string) else {
                    return Err(self.invalid_control("for() loop variable must be a literal name".to_string(), line));
                };
                let body = self.parse_control_body(keyword, line, in_block)?;
                Ok(Statement::For {
                    var,
                    list,
                    body,
                    line,
                })
            }
        }
    }

    fn parse_control_body(&mut self, keyword: &str, line: u32, in_block: bool) -> ParseResult<Block> {
        self.cur.skip_blanks();
        match self.cur.peek() {
            Some(b'{') => {
                self.cur.bump();
                self.parse_block(Some(line))
            }
            Some(b':') => {
                self.cur.bump();
                self.cur.skip_blanks();
                Ok(vec![self.parse_statement(in_block)?])
            }
            _ => Err(self.invalid_control(format!("{keyword}() must be followed by '{{' or ':'"), line)),
        }
    }

    fn invalid_control(&self, message: String, line: u32) -> ParseError {
        ParseError::InvalidControl {
            message,
            location: self.location_at(line),
        }
    }
}
