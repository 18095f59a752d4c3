// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Words and the expansions embedded in them

use smallvec::SmallVec;

/// One piece of a word
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text taken verbatim
    Literal(String),
    /// `$$NAME` or `$${NAME}`
    Variable(String),
    /// `$$[NAME]`
    Property(String),
    /// `$$(NAME)`
    Env(String),
    /// `$$name(args)`
    Call {
        /// Replace function name
        name: String,
        /// Comma-separated arguments
        args: Vec<Expr>,
    },
}

impl Segment {
    /// Whether this segment is expanded at evaluation time
    pub fn is_expansion(&self) -> bool {
        !matches!(self, Segment::Literal(_))
    }
}

/// A whitespace-delimited word
///
/// Most words are a single literal or a single expansion, so the segments
/// live inline.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Word {
    /// Pieces in source order; adjacent literals are merged
    pub segments: SmallVec<[Segment; 2]>,
    /// Whether the word contained double quotes
    pub quoted: bool,
}

impl Word {
    /// An unquoted literal word
    pub fn literal(text: impl Into<String>) -> Self {
        let mut word = Word::default();
        word.push_literal(&text.into());
        word
    }

    /// Append text, merging with a trailing literal
    pub fn push_literal(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Segment::Literal(last)) = self.segments.last_mut() {
            last.push_str(text);
        } else {
            self.segments.push(Segment::Literal(text.to_string()));
        }
    }

    /// Append a character, merging with a trailing literal
    pub fn push_char(&mut self, c: char) {
        if let Some(Segment::Literal(last)) = self.segments.last_mut() {
            last.push(c);
        } else {
            self.segments.push(Segment::Literal(c.to_string()));
        }
    }

    /// Append an expansion
    pub fn push_expansion(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    /// The text of an unquoted word without expansions
    pub fn as_literal(&self) -> Option<&str> {
        if self.quoted {
            return None;
        }
        match self.segments.as_slice() {
            [] => Some(""),
            [Segment::Literal(text)] => Some(text),
            _ => None,
        }
    }

    /// The lone expansion of an unquoted word made of exactly one expansion
    pub fn as_single_expansion(&self) -> Option<&Segment> {
        match self.segments.as_slice() {
            [segment] if !self.quoted && segment.is_expansion() => Some(segment),
            _ => None,
        }
    }

    /// Whether the word has no content and no quotes
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty() && !self.quoted
    }
}

/// A sequence of words, such as the right-hand side of an assignment or one
/// function argument
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Expr {
    pub words: Vec<Word>,
}

impl Expr {
    pub fn new(words: Vec<Word>) -> Self {
        Self { words }
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// The text of a single literal word
    pub fn as_literal(&self) -> Option<&str> {
        match self.words.as_slice() {
            [word] => word.as_literal(),
            _ => None,
        }
    }
}
