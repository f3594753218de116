//! Module graph snapshot.
//!
//! A module is a named group of compilation units (files) plus the set of
//! modules it imports. The graph is built once per project state and shared
//! by every request through an `Arc`; it is never mutated afterwards.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

/// Name of a module.
///
/// The unnamed module at the source root is [`ModuleId::CURRENT`] (`"."`).
#[derive(Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ModuleId(Arc<str>);

impl ModuleId {
    /// Name of the unnamed module living directly in the source root.
    pub const CURRENT: &'static str = ".";

    pub fn new(name: impl AsRef<str>) -> Self {
        ModuleId(Arc::from(name.as_ref()))
    }

    /// The unnamed module.
    pub fn current() -> Self {
        ModuleId::new(Self::CURRENT)
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn is_current(&self) -> bool {
        &*self.0 == Self::CURRENT
    }
}

impl fmt::Debug for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModuleId({})", self.0)
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModuleId {
    fn from(name: &str) -> Self {
        ModuleId::new(name)
    }
}

/// One module: its units in a stable order and the modules it imports.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Module {
    id: ModuleId,
    units: Vec<String>,
    imports: Vec<ModuleId>,
}

impl Module {
    pub fn new(id: impl Into<ModuleId>) -> Self {
        Module {
            id: id.into(),
            units: Vec::new(),
            imports: Vec::new(),
        }
    }

    /// Add a unit (file name). Duplicates are ignored.
    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        let unit = unit.into();
        if !self.units.contains(&unit) {
            self.units.push(unit);
        }
        self
    }

    /// Record a direct import. Duplicates and self-imports are ignored.
    #[must_use]
    pub fn with_import(mut self, module: impl Into<ModuleId>) -> Self {
        let module = module.into();
        if module != self.id && !self.imports.contains(&module) {
            self.imports.push(module);
        }
        self
    }

    #[inline]
    pub fn id(&self) -> &ModuleId {
        &self.id
    }

    #[inline]
    pub fn units(&self) -> &[String] {
        &self.units
    }

    #[inline]
    pub fn imports(&self) -> &[ModuleId] {
        &self.imports
    }

    pub fn has_unit(&self, unit: &str) -> bool {
        self.units.iter().any(|u| u == unit)
    }

    pub fn imports_module(&self, module: &ModuleId) -> bool {
        self.imports.contains(module)
    }
}

/// Immutable snapshot of every module in a project.
#[derive(Clone, Debug, Default)]
pub struct ModuleGraph {
    modules: Vec<Module>,
    index: FxHashMap<ModuleId, usize>,
}

impl ModuleGraph {
    pub fn builder() -> ModuleGraphBuilder {
        ModuleGraphBuilder::default()
    }

    pub fn get(&self, id: &ModuleId) -> Option<&Module> {
        self.index.get(id).map(|&i| &self.modules[i])
    }

    pub fn contains(&self, id: &ModuleId) -> bool {
        self.index.contains_key(id)
    }

    /// Modules in insertion order.
    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.iter()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Modules that import `target` directly, in graph order.
    pub fn direct_importers<'g>(&'g self, target: &'g ModuleId) -> impl Iterator<Item = &'g Module> {
        self.modules
            .iter()
            .filter(move |m| m.imports_module(target))
    }

    /// The modules a reference search for a symbol owned by `owner` walks:
    /// the owner first, then every direct importer in graph order.
    ///
    /// Importers of importers are not included.
    pub fn candidate_modules(&self, owner: &ModuleId) -> Vec<ModuleId> {
        let mut out = Vec::with_capacity(4);
        if self.contains(owner) {
            out.push(owner.clone());
        }
        out.extend(self.direct_importers(owner).map(|m| m.id.clone()));
        out
    }
}

/// Accumulates modules before freezing them into a [`ModuleGraph`].
#[derive(Clone, Debug, Default)]
pub struct ModuleGraphBuilder {
    modules: Vec<Module>,
}

impl ModuleGraphBuilder {
    /// Add a module. A second module with the same id replaces the first
    /// while keeping its position.
    #[must_use]
    pub fn module(mut self, module: Module) -> Self {
        self.add(module);
        self
    }

    pub fn add(&mut self, module: Module) {
        match self.modules.iter_mut().find(|m| m.id == module.id) {
            Some(slot) => *slot = module,
            None => self.modules.push(module),
        }
    }

    pub fn build(self) -> ModuleGraph {
        let index = self
            .modules
            .iter()
            .enumerate()
            .map(|(i, m)| (m.id.clone(), i))
            .collect();
        ModuleGraph {
            modules: self.modules,
            index,
        }
    }
}
