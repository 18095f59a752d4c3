//! Variable scopes
//!
//! The evaluator keeps a stack of frames. The bottom frame holds the project's
//! top-level variables and lives as long as the evaluator; function calls push
//! a frame on entry and pop it on exit. Reads fall through to enclosing frames,
//! writes always land in the innermost frame.

use super::pro_string::{ProKey, ProStringList};
use indexmap::IndexMap;
use rustc_hash::FxHashSet;

/// Ordered mapping from variable name to its values
pub type ValueMap = IndexMap<ProKey, ProStringList>;

/// One scope frame
#[derive(Debug, Clone, Default)]
struct Frame {
    values: ValueMap,
    /// Names unset in this frame; they hide bindings of enclosing frames
    hidden: FxHashSet<ProKey>,
}

/// Stack of variable scopes
#[derive(Debug, Clone)]
pub struct ValueMapStack {
    frames: Vec<Frame>,
}

impl Default for ValueMapStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueMapStack {
    /// Create a stack holding only the root frame
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::default()],
        }
    }

    /// Number of frames, including the root
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Enter a nested scope
    pub fn push(&mut self) {
        self.frames.push(Frame::default());
    }

    /// Leave the innermost scope. The root frame is never popped.
    pub fn pop(&mut self) -> Option<ValueMap> {
        if self.frames.len() > 1 {
            self.frames.pop().map(|f| f.values)
        } else {
            None
        }
    }

    /// The root (outermost) frame
    pub fn first(&self) -> &ValueMap {
        &self.frames[0].values
    }

    /// Mutable access to the root frame
    pub fn first_mut(&mut self) -> &mut ValueMap {
        &mut self.frames[0].values
    }

    /// The innermost frame
    pub fn top(&self) -> &ValueMap {
        &self.top_frame().values
    }

    fn top_frame(&self) -> &Frame {
        // frames is never empty: pop() refuses to remove the root
        &self.frames[self.frames.len() - 1]
    }

    fn top_frame_mut(&mut self) -> &mut Frame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    /// Look a variable up, innermost frame first
    pub fn lookup(&self, key: &str) -> Option<&ProStringList> {
        for frame in self.frames.iter().rev() {
            if let Some(values) = frame.values.get(key) {
                return Some(values);
            }
            if frame.hidden.contains(key) {
                return None;
            }
        }
        None
    }

    /// Whether the variable is visible from the innermost frame
    pub fn contains(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    /// Mutable access to a variable in the innermost frame
    ///
    /// A value visible from an enclosing frame is copied in first, so the
    /// enclosing binding is left untouched.
    pub fn values_mut(&mut self, key: &ProKey) -> &mut ProStringList {
        if !self.top().contains_key(key.as_str()) {
            let inherited = self.lookup(key).cloned().unwrap_or_default();
            let top = self.top_frame_mut();
            top.hidden.remove(key.as_str());
            top.values.insert(key.clone(), inherited);
        }
        let top = self.top_frame_mut();
        top.values.entry(key.clone()).or_default()
    }

    /// Bind a variable in the innermost frame
    pub fn set(&mut self, key: ProKey, values: ProStringList) {
        let top = self.top_frame_mut();
        top.hidden.remove(key.as_str());
        top.values.insert(key, values);
    }

    /// Drop a binding from the innermost frame only, uncovering any
    /// enclosing binding of the same name
    pub fn remove_local(&mut self, key: &str) -> Option<ProStringList> {
        self.top_frame_mut().values.shift_remove(key)
    }

    /// Remove a variable as seen from the innermost frame
    ///
    /// Returns false when the variable was not visible.
    pub fn unset(&mut self, key: &ProKey) -> bool {
        if !self.contains(key) {
            return false;
        }
        let nested = self.frames.len() > 1;
        let top = self.top_frame_mut();
        top.values.shift_remove(key.as_str());
        if nested {
            top.hidden.insert(key.clone());
        }
        true
    }

    /// Move a variable's current value into the root frame
    ///
    /// Intermediate frames forget the variable so the exported value becomes
    /// visible after the current function returns.
    pub fn export(&mut self, key: &ProKey) -> bool {
        let Some(value) = self.lookup(key).cloned() else {
            return false;
        };
        for frame in self.frames.iter_mut().skip(1) {
            frame.values.shift_remove(key.as_str());
            frame.hidden.remove(key.as_str());
        }
        self.frames[0].values.insert(key.clone(), value);
        true
    }

    /// All variable names visible from the innermost frame
    pub fn visible_keys(&self) -> Vec<ProKey> {
        let mut seen = FxHashSet::default();
        let mut hidden = FxHashSet::default();
        let mut out = Vec::new();
        for frame in self.frames.iter().rev() {
            for key in frame.values.keys() {
                if !hidden.contains(key) && seen.insert(key.clone()) {
                    out.push(key.clone());
                }
            }
            hidden.extend(frame.hidden.iter().cloned());
        }
        out
    }

    /// Replace the whole stack with a single root frame
    pub fn reset_to(&mut self, root: ValueMap) {
        self.frames = vec![Frame {
            values: root,
            hidden: FxHashSet::default(),
        }];
    }
}
