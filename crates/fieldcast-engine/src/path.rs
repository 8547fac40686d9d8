//! Paths and the alignment scope.
//!
//! A [`Path`] identifies *where in the call structure* a value was produced
//! during the current round. It is the key into the state store and both
//! envelopes, and it is what makes values from different devices comparable:
//! two devices running the same program through the same call sites and
//! pivots produce the same path, round after round.

use crate::errors::{Result, RoundError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::Location;

/// One token of a path.
///
/// A token is derived from the identity of the operator call site (the
/// caller's `file:line:column`, stable across devices running the same
/// program) plus an optional *pivot*: a programmer-supplied value that
/// disambiguates repeated invocations of the same call site within one round.
/// Derivation is injective over (call site, pivot): the pivot is kept as its
/// canonical JSON rendering, not a hash, so distinct pivots cannot collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PathToken {
    site: String,
    pivot: Option<String>,
}

impl PathToken {
    /// Token for a bare operator invocation at `location`.
    pub fn site(location: &'static Location<'static>) -> Self {
        Self {
            site: format!("{}:{}:{}", location.file(), location.line(), location.column()),
            pivot: None,
        }
    }

    /// Token for an `aligned_on` invocation at `location` with a rendered pivot.
    pub fn pivoted(location: &'static Location<'static>, pivot: String) -> Self {
        Self {
            site: format!("{}:{}:{}", location.file(), location.line(), location.column()),
            pivot: Some(pivot),
        }
    }

    /// The call-site identity.
    pub fn call_site(&self) -> &str {
        &self.site
    }

    /// The rendered pivot, if one was supplied.
    pub fn pivot(&self) -> Option<&str> {
        self.pivot.as_deref()
    }
}

impl fmt::Display for PathToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.pivot {
            Some(pivot) => write!(f, "{}[{}]", self.site, pivot),
            None => write!(f, "{}", self.site),
        }
    }
}

/// Render a pivot value into its canonical form.
pub fn render_pivot<P: Serialize>(pivot: &P) -> Result<String> {
    serde_json::to_string(pivot).map_err(RoundError::codec)
}

/// An ordered, finite token sequence addressing one operator invocation
/// within one round's call structure.
///
/// Two paths are equal iff their token sequences are equal element-wise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Path(Vec<PathToken>);

impl Path {
    /// The empty path (program top level).
    pub fn root() -> Self {
        Self::default()
    }

    /// The token sequence, outermost first.
    pub fn tokens(&self) -> &[PathToken] {
        &self.0
    }

    /// Nesting depth.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this is the root path.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "(root)");
        }
        for (i, token) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{token}")?;
        }
        Ok(())
    }
}

impl From<Vec<PathToken>> for Path {
    fn from(tokens: Vec<PathToken>) -> Self {
        Self(tokens)
    }
}

/// The per-round alignment cursor.
///
/// Tokens are pushed as the program enters operator invocations and popped on
/// every exit path; the current path at any instant is the stack contents in
/// order. The scope is round-scoped: the engine resets it before running the
/// program.
#[derive(Debug, Default)]
pub struct AlignmentScope {
    stack: Vec<PathToken>,
}

impl AlignmentScope {
    /// Create an empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter an operator invocation.
    pub fn push(&mut self, token: PathToken) {
        self.stack.push(token);
    }

    /// Leave the innermost operator invocation.
    pub fn pop(&mut self) -> Option<PathToken> {
        self.stack.pop()
    }

    /// Current nesting depth.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Snapshot of the stack contents at this instant.
    pub fn current_path(&self) -> Path {
        Path(self.stack.clone())
    }

    /// Drop all tokens, returning the scope to the program top level.
    pub fn reset(&mut self) {
        self.stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[track_caller]
    fn here() -> PathToken {
        PathToken::site(Location::caller())
    }

    #[test]
    fn paths_are_equal_iff_token_sequences_are() {
        let a = here();
        let b = here();
        assert_ne!(a, b); // two different source lines

        let mut scope = AlignmentScope::new();
        scope.push(a.clone());
        scope.push(b.clone());
        let path = scope.current_path();
        assert_eq!(path, Path::from(vec![a.clone(), b.clone()]));
        assert_ne!(path, Path::from(vec![b, a])); // order-sensitive
    }

    #[test]
    fn pivots_distinguish_tokens_at_one_site() {
        let location = Location::caller();
        let t1 = PathToken::pivoted(location, render_pivot(&1u32).unwrap());
        let t2 = PathToken::pivoted(location, render_pivot(&2u32).unwrap());
        let bare = PathToken::site(location);
        assert_ne!(t1, t2);
        assert_ne!(t1, bare);
        assert_eq!(t1.call_site(), t2.call_site());
    }

    #[test]
    fn scope_tracks_push_and_pop() {
        let mut scope = AlignmentScope::new();
        assert_eq!(scope.current_path(), Path::root());
        scope.push(here());
        assert_eq!(scope.depth(), 1);
        let snapshot = scope.current_path();
        scope.pop();
        assert_eq!(scope.depth(), 0);
        assert_ne!(snapshot, scope.current_path());
        assert!(scope.current_path().is_empty());
    }

    #[test]
    fn display_is_readable() {
        assert_eq!(Path::root().to_string(), "(root)");
        let location = Location::caller();
        let path = Path::from(vec![PathToken::pivoted(
            location,
            render_pivot(&"edge").unwrap(),
        )]);
        assert!(path.to_string().contains("[\"edge\"]"));
    }
}
