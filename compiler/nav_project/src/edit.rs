//! Byte-span text edits.
//!
//! A [`ChangeSet`] collects replacements for one file, rejects overlapping
//! ones, and applies the rest from end to start so earlier spans stay valid
//! while later text grows or shrinks.

use nav_syntax::Span;

/// Replace the text at `span` with `new_text`. An empty span inserts.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct SpanEdit {
    pub span: Span,
    pub new_text: String,
}

impl SpanEdit {
    pub fn replace(span: Span, new_text: impl Into<String>) -> Self {
        SpanEdit {
            span,
            new_text: new_text.into(),
        }
    }

    #[inline]
    pub fn is_insert(&self) -> bool {
        self.span.is_empty() && !self.new_text.is_empty()
    }
}

/// Two edits of the same file cover overlapping text.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("edits overlap: {:?} and {:?}", first.span, second.span)]
pub struct EditConflict {
    pub first: SpanEdit,
    pub second: SpanEdit,
}

/// Pending edits for one file.
#[derive(Clone, Debug, Default)]
pub struct ChangeSet {
    edits: Vec<SpanEdit>,
}

impl ChangeSet {
    pub fn new() -> Self {
        ChangeSet { edits: Vec::new() }
    }

    pub fn replace(&mut self, span: Span, text: impl Into<String>) {
        self.edits.push(SpanEdit::replace(span, text));
    }

    pub fn push(&mut self, edit: SpanEdit) {
        self.edits.push(edit);
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn edits(&self) -> &[SpanEdit] {
        &self.edits
    }

    /// Sort by position and drop exact duplicates.
    pub fn normalize(&mut self) {
        self.edits
            .sort_by(|a, b| (a.span, &a.new_text).cmp(&(b.span, &b.new_text)));
        self.edits.dedup();
    }

    /// First pair of overlapping edits, if any.
    ///
    /// Edits that merely touch do not conflict, nor do two insertions at the
    /// same offset.
    pub fn check_conflicts(&self) -> Option<EditConflict> {
        let mut sorted = self.edits.clone();
        sorted.sort_by_key(|e| (e.span.start, e.span.end));

        sorted.windows(2).find_map(|pair| {
            let (a, b) = (&pair[0], &pair[1]);
            (a.span.end > b.span.start && !(a.is_insert() && b.is_insert())).then(|| EditConflict {
                first: a.clone(),
                second: b.clone(),
            })
        })
    }

    /// Apply every edit to `source`, end to start. Spans past the end of the
    /// text are clamped.
    pub fn apply(&self, source: &str) -> String {
        let mut sorted = self.edits.clone();
        sorted.sort_by(|a, b| {
            b.span
                .start
                .cmp(&a.span.start)
                .then(b.span.end.cmp(&a.span.end))
        });

        let mut result = source.to_string();
        for edit in sorted {
            let start = (edit.span.start as usize).min(result.len());
            let end = (edit.span.end as usize).min(result.len()).max(start);
            result.replace_range(start..end, &edit.new_text);
        }
        result
    }

    /// Like [`apply`](Self::apply), but refuses overlapping edits.
    pub fn apply_checked(&self, source: &str) -> Result<String, EditConflict> {
        match self.check_conflicts() {
            Some(conflict) => Err(conflict),
            None => Ok(self.apply(source)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests use unwrap to panic on unexpected state")]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rename_two_occurrences() {
        let mut changes = ChangeSet::new();
        // "let x = x + 1;"
        changes.replace(Span::new(4, 5), "total");
        changes.replace(Span::new(8, 9), "total");
        assert_eq!(changes.apply_checked("let x = x + 1;").unwrap(), "let total = total + 1;");
    }

    #[test]
    fn test_adjacent_edits_do_not_conflict() {
        let mut changes = ChangeSet::new();
        changes.replace(Span::new(0, 5), "aaa");
        changes.replace(Span::new(5, 10), "bbb");
        assert!(changes.check_conflicts().is_none());
    }

    #[test]
    fn test_overlap_is_reported() {
        let mut changes = ChangeSet::new();
        changes.replace(Span::new(5, 15), "aaa");
        changes.replace(Span::new(10, 20), "bbb");
        let conflict = changes.check_conflicts().unwrap();
        assert_eq!(conflict.first.span, Span::new(5, 15));
        assert_eq!(conflict.second.span, Span::new(10, 20));
        assert!(changes.apply_checked("hello world testing!").is_err());
    }

    #[test]
    fn test_same_span_different_text_conflicts() {
        let mut changes = ChangeSet::new();
        changes.replace(Span::new(0, 3), "a");
        changes.replace(Span::new(0, 3), "b");
        assert!(changes.check_conflicts().is_some());
    }

    #[test]
    fn test_normalize_drops_duplicates() {
        let mut changes = ChangeSet::new();
        changes.replace(Span::new(8, 9), "y");
        changes.replace(Span::new(4, 5), "y");
        changes.replace(Span::new(8, 9), "y");
        changes.normalize();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes.edits()[0].span, Span::new(4, 5));
        assert!(changes.check_conflicts().is_none());
    }

    #[test]
    fn test_empty_change_set_is_identity() {
        let changes = ChangeSet::new();
        assert!(changes.is_empty());
        assert_eq!(changes.apply("unchanged"), "unchanged");
    }
}
