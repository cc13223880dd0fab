//! Alias table built from the build script's `use` items.

use std::collections::HashMap;
use std::rc::Rc;

use syn::{ItemUse, UseTree};

use crate::error::GenerateError;
use crate::loader::{CrateGraph, CrateRoot, Module};

/// What an imported alias refers to.
#[derive(Debug, Clone)]
pub enum ImportTarget {
    /// A readable module.
    Module(Rc<Module>),
    /// An item inside a readable module.
    Item {
        /// Module expected to declare the item.
        module: Rc<Module>,
        /// Item name inside `module`.
        name: String,
    },
    /// Anything inside a crate whose sources are unavailable.
    Opaque,
}

/// Aliases visible in the build script. Later imports replace earlier ones.
#[derive(Debug, Default)]
pub struct ImportTable {
    entries: HashMap<String, ImportTarget>,
}

/// A single imported path after flattening groups and renames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatImport {
    /// Path segments, without a leading `::`.
    pub segments: Vec<String>,
    /// Name the path is bound to.
    pub alias: String,
}

impl ImportTable {
    /// Resolves every import of the build script.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::ImportNotFound`] when a path starts outside
    /// the dependency set or names a module that does not exist. Several
    /// failures are reported together as [`GenerateError::Aggregate`].
    pub fn build(
        imports: &[ItemUse],
        graph: &mut CrateGraph,
        local: &Rc<Module>,
    ) -> Result<Self, GenerateError> {
        let mut table = Self::default();
        let mut errors = Vec::new();
        for import in imports.iter().flat_map(|item| flatten(&item.tree)) {
            match resolve_import(&import, graph, local) {
                Ok(target) => {
                    tracing::debug!(
                        alias = %import.alias,
                        path = %import.segments.join("::"),
                        "imported"
                    );
                    table.entries.insert(import.alias, target);
                }
                Err(err) => errors.push(err),
            }
        }
        GenerateError::aggregate(errors).map_or(Ok(table), Err)
    }

    /// Looks up an alias.
    #[must_use]
    pub fn get(&self, alias: &str) -> Option<&ImportTarget> {
        self.entries.get(alias)
    }

    /// Number of aliases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no aliases were imported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Flattens a use tree into one entry per bound name.
///
/// Glob imports and `as _` bindings name nothing usable and are dropped.
#[must_use]
pub fn flatten(tree: &UseTree) -> Vec<FlatImport> {
    let mut out = Vec::new();
    flatten_into(tree, &mut Vec::new(), &mut out);
    out
}

fn flatten_into(tree: &UseTree, prefix: &mut Vec<String>, out: &mut Vec<FlatImport>) {
    match tree {
        UseTree::Path(path) => {
            prefix.push(path.ident.to_string());
            flatten_into(&path.tree, prefix, out);
            prefix.pop();
        }
        UseTree::Name(name) if name.ident == "self" => {
            if let Some(last) = prefix.last() {
                out.push(FlatImport {
                    segments: prefix.clone(),
                    alias: last.clone(),
                });
            }
        }
        UseTree::Name(name) => {
            let ident = name.ident.to_string();
            let mut segments = prefix.clone();
            segments.push(ident.clone());
            out.push(FlatImport {
                segments,
                alias: ident,
            });
        }
        UseTree::Rename(rename) => {
            if rename.rename == "_" {
                tracing::debug!(name = %rename.ident, "skipping anonymous import");
                return;
            }
            let mut segments = prefix.clone();
            if rename.ident != "self" {
                segments.push(rename.ident.to_string());
            }
            out.push(FlatImport {
                segments,
                alias: rename.rename.to_string(),
            });
        }
        UseTree::Glob(_) => {
            tracing::debug!(path = %prefix.join("::"), "skipping glob import");
        }
        UseTree::Group(group) => {
            for item in &group.items {
                flatten_into(item, prefix, out);
            }
        }
    }
}

fn resolve_import(
    import: &FlatImport,
    graph: &mut CrateGraph,
    local: &Rc<Module>,
) -> Result<ImportTarget, GenerateError> {
    let not_found = || GenerateError::ImportNotFound {
        path: import.segments.join("::"),
    };
    let Some((first, tail)) = import.segments.split_first() else {
        return Err(not_found());
    };

    let (root, rest) = match first.as_str() {
        "self" | "super" => {
            let skipped = import
                .segments
                .iter()
                .take_while(|segment| matches!(segment.as_str(), "self" | "super"))
                .count();
            (
                Rc::clone(local),
                import.segments.get(skipped..).unwrap_or_default(),
            )
        }
        name => match graph.crate_root(name)? {
            Some(CrateRoot::Readable(module)) => (module, tail),
            Some(CrateRoot::Opaque) => return Ok(ImportTarget::Opaque),
            None => return Err(not_found()),
        },
    };

    let Some((last, middle)) = rest.split_last() else {
        return Ok(ImportTarget::Module(root));
    };
    let mut current = root;
    for segment in middle {
        current = graph.child(&current, segment)?.ok_or_else(not_found)?;
    }
    match graph.child(&current, last)? {
        Some(module) => Ok(ImportTarget::Module(module)),
        None => Ok(ImportTarget::Item {
            module: current,
            name: last.clone(),
        }),
    }
}
