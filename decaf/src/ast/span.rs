//! Source location tracking

use serde::{Deserialize, Serialize};

/// A byte range in the source file a node was parsed from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// True if this span starts strictly after `other` starts.
    ///
    /// Local variables are only visible to uses that do not precede their
    /// declaration; this is the ordering used for that rule.
    pub fn starts_after(self, other: Span) -> bool {
        self.start > other.start
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl From<Span> for std::ops::Range<usize> {
    fn from(span: Span) -> Self {
        span.start..span.end
    }
}

/// A value with source location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Spanned<U> {
        Spanned {
            node: f(self.node),
            span: self.span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_display() {
        assert_eq!(Span::new(3, 7).to_string(), "3..7");
    }

    #[test]
    fn test_span_into_range() {
        let range: std::ops::Range<usize> = Span::new(4, 9).into();
        assert_eq!(range, 4..9);
    }

    #[test]
    fn test_starts_after() {
        let decl = Span::new(10, 12);
        assert!(decl.starts_after(Span::new(4, 5)));
        assert!(!decl.starts_after(Span::new(10, 11)));
        assert!(!decl.starts_after(Span::new(20, 21)));
    }

    #[test]
    fn test_spanned_map_preserves_span() {
        let s = Spanned::new(21, Span::new(1, 3)).map(|n| n * 2);
        assert_eq!(s.node, 42);
        assert_eq!(s.span, Span::new(1, 3));
    }
}
