//! Expansion of words and expressions into value lists

use super::Evaluator;
use crate::ast::{Expr, Segment, Word};
use crate::error::EvalResult;
use crate::model::ProStringList;

impl Evaluator {
    /// Expand every word of `expr` and concatenate the resulting lists
    pub(crate) fn expand_expr(&mut self, expr: &Expr) -> EvalResult<ProStringList> {
        let mut out = ProStringList::new();
        for word in &expr.words {
            out.extend(self.expand_word(word)?);
        }
        Ok(out)
    }

    /// Expand each argument of a call separately
    pub(crate) fn expand_args(&mut self, args: &[Expr]) -> EvalResult<Vec<ProStringList>> {
        args.iter().map(|arg| self.expand_expr(arg)).collect()
    }

    /// A lone expansion keeps its list; anything else becomes one value
    pub(crate) fn expand_word(&mut self, word: &Word) -> EvalResult<ProStringList> {
        if let Some(segment) = word.as_single_expansion() {
            return self.expand_segment(segment);
        }
        let text = self.expand_word_joined(word)?;
        if text.is_empty() && !word.quoted {
            Ok(ProStringList::new())
        } else {
            Ok(ProStringList::single(text))
        }
    }

    /// Expand a word into one string, joining lists with a space
    pub(crate) fn expand_word_joined(&mut self, word: &Word) -> EvalResult<String> {
        let mut text = String::new();
        for segment in &word.segments {
            match segment {
                Segment::Literal(literal) => text.push_str(literal),
                other => text.push_str(&self.expand_segment(other)?.join(" ")),
            }
        }
        Ok(text)
    }

    fn expand_segment(&mut self, segment: &Segment) -> EvalResult<ProStringList> {
        match segment {
            Segment::Literal(text) => Ok(ProStringList::single(text.as_str())),
            Segment::Variable(name) => Ok(self.values(name)),
            Segment::Property(name) => Ok(self
                .property_value(name)
                .map(ProStringList::single)
                .unwrap_or_default()),
            Segment::Env(name) => Ok(std::env::var(name)
                .ok()
                .filter(|value| !value.is_empty())
                .map(ProStringList::single)
                .unwrap_or_default()),
            Segment::Call { name, args } => {
                let args = self.expand_args(args)?;
                self.call_replace(name, &args)
            }
        }
    }
}
