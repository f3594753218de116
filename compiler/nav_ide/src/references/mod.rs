//! Reference Model
//!
//! The per-request result of a reference search: at most one occurrence at
//! the cursor, plus de-duplicated, ordered sets of definitions and usages.
//! Nothing here outlives the request that built it.

mod collector;

pub(crate) use collector::ReferenceCollector;

use std::collections::BTreeMap;

use nav_project::{ModuleId, Symbol};
use nav_syntax::{LineCol, Span};

/// How an occurrence relates to the searched symbol.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ReferenceRole {
    /// The declaration site.
    Definition,
    /// Any other occurrence.
    Usage,
    /// The occurrence under the request's cursor.
    Cursor,
}

/// One occurrence of a symbol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reference {
    /// The symbol as annotated at this occurrence.
    pub symbol: Symbol,
    pub module: ModuleId,
    pub unit: String,
    /// Span of the identifier token.
    pub span: Span,
    pub start: LineCol,
    pub end: LineCol,
    pub role: ReferenceRole,
}

/// Identity of an occurrence: where it is, not what it says.
pub(crate) type SiteKey = (ModuleId, String, Span);

impl Reference {
    pub(crate) fn site(&self) -> SiteKey {
        (self.module.clone(), self.unit.clone(), self.span)
    }

    #[must_use]
    pub(crate) fn with_role(mut self, role: ReferenceRole) -> Self {
        self.role = role;
        self
    }
}

/// Cursor, definitions and usages found by one request.
#[derive(Clone, Debug, Default)]
pub struct ReferenceModel {
    cursor: Option<Reference>,
    definitions: BTreeMap<SiteKey, Reference>,
    usages: BTreeMap<SiteKey, Reference>,
}

impl ReferenceModel {
    pub fn new() -> Self {
        ReferenceModel::default()
    }

    /// Record the cursor occurrence. Only the first call has an effect.
    pub fn set_cursor(&mut self, reference: Reference) -> bool {
        if self.cursor.is_some() {
            return false;
        }
        self.cursor = Some(reference.with_role(ReferenceRole::Cursor));
        true
    }

    /// Add a definition. Returns `false` if one at the same site exists.
    pub fn add_definition(&mut self, reference: Reference) -> bool {
        let reference = reference.with_role(ReferenceRole::Definition);
        insert_new(&mut self.definitions, reference)
    }

    /// Add a usage. Returns `false` if one at the same site exists.
    pub fn add_usage(&mut self, reference: Reference) -> bool {
        let reference = reference.with_role(ReferenceRole::Usage);
        insert_new(&mut self.usages, reference)
    }

    #[inline]
    pub fn cursor(&self) -> Option<&Reference> {
        self.cursor.as_ref()
    }

    /// Definitions ordered by module, unit and position.
    pub fn definitions(&self) -> impl Iterator<Item = &Reference> {
        self.definitions.values()
    }

    /// Usages ordered by module, unit and position.
    pub fn usages(&self) -> impl Iterator<Item = &Reference> {
        self.usages.values()
    }

    pub fn definition_count(&self) -> usize {
        self.definitions.len()
    }

    pub fn usage_count(&self) -> usize {
        self.usages.len()
    }

    /// `true` if the cursor occurrence is also a definition.
    pub fn cursor_is_definition(&self) -> bool {
        self.cursor
            .as_ref()
            .is_some_and(|c| self.definitions.contains_key(&c.site()))
    }

    /// Drop every definition and usage whose symbol is not equivalent to
    /// the cursor symbol. Without a cursor everything is dropped.
    pub fn prune(&mut self) {
        let Some(cursor) = &self.cursor else {
            self.definitions.clear();
            self.usages.clear();
            return;
        };
        let target = &cursor.symbol;
        self.definitions.retain(|_, r| r.symbol.is_equivalent(target));
        self.usages.retain(|_, r| r.symbol.is_equivalent(target));
    }

    /// Occurrences reported by find-references: definitions (if requested),
    /// usages, and the cursor unless it is already a definition.
    pub fn find_results(&self, include_declaration: bool) -> Vec<&Reference> {
        let mut out = Vec::with_capacity(self.definitions.len() + self.usages.len() + 1);
        if include_declaration {
            out.extend(self.definitions.values());
        }
        out.extend(self.usages.values());
        if let Some(cursor) = &self.cursor {
            if !self.cursor_is_definition() {
                out.push(cursor);
            }
        }
        out
    }

    /// Every distinct occurrence a rename must rewrite: cursor, definitions
    /// and usages, one per site.
    pub fn rename_targets(&self) -> Vec<&Reference> {
        let mut sites: BTreeMap<SiteKey, &Reference> = BTreeMap::new();
        for reference in self.cursor.iter().chain(self.definitions.values()).chain(self.usages.values()) {
            sites.entry(reference.site()).or_insert(reference);
        }
        sites.into_values().collect()
    }
}

fn insert_new(set: &mut BTreeMap<SiteKey, Reference>, reference: Reference) -> bool {
    use std::collections::btree_map::Entry;

    match set.entry(reference.site()) {
        Entry::Occupied(_) => false,
        Entry::Vacant(slot) => {
            slot.insert(reference);
            true
        }
    }
}
