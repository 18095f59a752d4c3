//! Word, expansion and argument grammar

use super::error::{ParseError, ParseResult};
use super::lexer::is_name_byte;
use super::Parser;
use crate::ast::{Expr, Segment, Word};

/// Where a word is being read; decides which characters end it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WordContext {
    /// Start of a statement: a variable name or a condition
    Head,
    /// Right-hand side of an assignment
    Value { in_block: bool },
    /// Inside a function argument list
    Argument,
}

impl Parser<'_> {
    fn is_word_break(&self, b: u8, context: WordContext, paren_depth: u32) -> bool {
        if matches!(b, b' ' | b'\t' | b'\r' | b'\n') {
            return true;
        }
        match context {
            WordContext::Head => match b {
                b'=' | b':' | b'{' | b'}' | b'(' | b')' | b'|' | b',' | b'#' => true,
                b'+' | b'-' | b'*' | b'~' => self.cur.peek_at(1) == Some(b'='),
                _ => false,
            },
            WordContext::Value { in_block } => (b == b'}' && in_block) || b == b'#',
            WordContext::Argument => paren_depth == 0 && matches!(b, b',' | b')'),
        }
    }

    /// Read one word; `None` when the cursor sits on a word break
    pub(crate) fn parse_word(
        &mut self,
        context: WordContext,
        paren_depth: &mut u32,
    ) -> ParseResult<Option<Word>> {
        let mut word = Word::default();
        let mut in_quotes = false;
        let mut quote_line = self.cur.line();

        while let Some(b) = self.cur.peek() {
            match b {
                b'"' => {
                    self.cur.bump();
                    in_quotes = !in_quotes;
                    word.quoted = true;
                    quote_line = self.cur.line();
                }
                b'\n' if in_quotes => {
                    return Err(ParseError::MissingQuote {
                        location: self.location_at(quote_line),
                    });
                }
                b'\\' => {
                    if self.cur.at_continuation() {
                        if in_quotes {
                            return Err(ParseError::MissingQuote {
                                location: self.location_at(quote_line),
                            });
                        }
                        break;
                    }
                    match self.cur.peek_at(1) {
                        Some(escaped @ (b'"' | b'\'' | b'$' | b'#')) => {
                            self.cur.advance(2);
                            word.push_char(escaped as char);
                        }
                        _ => {
                            self.cur.bump();
                            word.push_char('\\');
                        }
                    }
                }
                b'$' if self.cur.peek_at(1) == Some(b'$') => {
                    let segment = self.parse_expansion()?;
                    match segment {
                        Segment::Literal(text) => word.push_literal(&text),
                        other => word.push_expansion(other),
                    }
                }
                _ if !in_quotes && self.is_word_break(b, context, *paren_depth) => break,
                b'(' if context == WordContext::Argument && !in_quotes => {
                    *paren_depth += 1;
                    self.cur.bump();
                    word.push_char('(');
                }
                b')' if context == WordContext::Argument && !in_quotes => {
                    *paren_depth = paren_depth.saturating_sub(1);
                    self.cur.bump();
                    word.push_char(')');
                }
                _ => {
                    if let Some(c) = self.cur.bump() {
                        word.push_char(c);
                    }
                }
            }
        }

        if in_quotes {
            return Err(ParseError::MissingQuote {
                location: self.location_at(quote_line),
            });
        }
        Ok((!word.is_empty()).then_some(word))
    }

    /// Read an expansion starting at `$$`
    fn parse_expansion(&mut self) -> ParseResult<Segment> {
        let line = self.cur.line();
        self.cur.advance(2);
        match self.cur.peek() {
            Some(b'{') => {
                self.cur.bump();
                let name = self.cur.take_while(|b| b != b'}' && b != b'\n').to_string();
                if self.cur.peek() != Some(b'}') {
                    return Err(ParseError::MissingBrace {
                        location: self.location_at(line),
                    });
                }
                self.cur.bump();
                Ok(Segment::Variable(name))
            }
            Some(b'[') => {
                self.cur.bump();
                let name = self.cur.take_while(|b| b != b']' && b != b'\n').to_string();
                if self.cur.peek() != Some(b']') {
                    return Err(self.unexpected());
                }
                self.cur.bump();
                Ok(Segment::Property(name))
            }
            Some(b'(') => {
                self.cur.bump();
                let name = self.cur.take_while(|b| b != b')' && b != b'\n').to_string();
                if self.cur.peek() != Some(b')') {
                    return Err(ParseError::MissingParen {
                        location: self.location_at(line),
                    });
                }
                self.cur.bump();
                Ok(Segment::Env(name))
            }
            Some(b) if is_name_byte(b) => {
                let name = self.cur.take_while(is_name_byte).to_string();
                if self.cur.peek() == Some(b'(') {
                    self.cur.bump();
                    let args = self.parse_args(line)?;
                    Ok(Segment::Call { name, args })
                } else {
                    Ok(Segment::Variable(name))
                }
            }
            _ => Ok(Segment::Literal("$$".to_string())),
        }
    }

    /// Read comma-separated arguments; the cursor is just past `(`
    pub(crate) fn parse_args(&mut self, open_line: u32) -> ParseResult<Vec<Expr>> {
        let mut args = Vec::new();
        let mut words = Vec::new();
        let mut depth = 0u32;

        loop {
            self.cur.skip_blanks();
            match self.cur.peek() {
                None | Some(b'\n') => {
                    return Err(ParseError::MissingParen {
                        location: self.location_at(open_line),
                    });
                }
                Some(b',') => {
                    self.cur.bump();
                    args.push(Expr::new(std::mem::take(&mut words)));
                }
                Some(b')') => {
                    self.cur.bump();
                    args.push(Expr::new(words));
                    break;
                }
                _ => match self.parse_word(WordContext::Argument, &mut depth)? {
                    Some(word) => words.push(word),
                    None => return Err(self.unexpected()),
                },
            }
        }

        if args.len() == 1 && args[0].is_empty() {
            args.clear();
        }
        Ok(args)
    }

    /// Read the right-hand side of an assignment up to the end of the line
    pub(crate) fn parse_value(&mut self, in_block: bool) -> ParseResult<Expr> {
        let mut words = Vec::new();
        let mut depth = 0u32;
        loop {
            self.cur.skip_blanks();
            match self.cur.peek() {
                None | Some(b'\n') => break,
                Some(b'}') if in_block => break,
                _ => {}
            }
            match self.parse_word(WordContext::Value { in_block }, &mut depth)? {
                Some(word) => words.push(word),
                None => break,
            }
        }
        Ok(Expr::new(words))
    }
}
