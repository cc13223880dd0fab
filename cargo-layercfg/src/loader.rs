//! Discovery of the gated build script and loading of the modules it can
//! reference.
//!
//! The *local module* is every `.rs` file in the build script's directory.
//! Other modules are loaded lazily through [`CrateGraph`], which follows
//! `mod` declarations from a crate root the way the compiler would (without
//! `#[path]` support).

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::fs_utf8::Dir;
use syn::{AttrStyle, Attribute, Item};

use crate::error::{Diagnostic, Diagnostics, GenerateError};
use crate::fs_helpers::{open_optional_dir, read_optional};
use crate::manifest::{self, CrateInfo};
use crate::source::SourceFile;

/// File name of the build script.
pub const SRC_FILE_NAME: &str = "config.rs";

/// File name of the generated output, written beside the build script.
pub const DST_FILE_NAME: &str = "config_gen.rs";

/// Crates that ship with the toolchain and have no readable sources.
const TOOLCHAIN_CRATES: [&str; 5] = ["std", "core", "alloc", "proc_macro", "test"];

/// Recursively finds gated build scripts under `root`, in path order.
///
/// Hidden directories and `target` are not searched. A candidate that fails
/// to parse still counts when its text carries the gate, so its diagnostics
/// are reported instead of a missing-module error.
///
/// # Errors
///
/// Returns [`GenerateError::Io`] when a directory cannot be read.
pub fn find_build_scripts(root: &Utf8Path) -> Result<Vec<Utf8PathBuf>, GenerateError> {
    let Some(dir) = open_optional_dir(root)? else {
        return Err(GenerateError::ModuleNotFound {
            root: root.to_path_buf(),
        });
    };
    let mut found = Vec::new();
    walk(&dir, root, &mut found)?;
    Ok(found)
}

fn walk(dir: &Dir, base: &Utf8Path, found: &mut Vec<Utf8PathBuf>) -> Result<(), GenerateError> {
    let mut entries = Vec::new();
    for entry_result in dir.read_dir(".").map_err(GenerateError::io(base))? {
        let entry = entry_result.map_err(GenerateError::io(base))?;
        let name = entry.file_name().map_err(GenerateError::io(base))?;
        let file_type = entry.file_type().map_err(GenerateError::io(base))?;
        entries.push((name, file_type));
    }
    entries.sort_by(|(left, _), (right, _)| left.cmp(right));

    for (name, file_type) in entries {
        let path = base.join(&name);
        if file_type.is_dir() {
            if name.starts_with('.') || name == "target" {
                continue;
            }
            let subdir = dir.open_dir(&name).map_err(GenerateError::io(&path))?;
            walk(&subdir, &path, found)?;
        } else if file_type.is_file() && name == SRC_FILE_NAME {
            let text = dir.read_to_string(&name).map_err(GenerateError::io(&path))?;
            if is_gated(&text) {
                tracing::debug!(%path, "found build script");
                found.push(path);
            }
        }
    }
    Ok(())
}

/// Reports whether `text` opens with the `#![cfg(layercfg)]` gate.
#[must_use]
pub fn is_gated(text: &str) -> bool {
    match syn::parse_file(text) {
        Ok(file) => file.attrs.iter().any(is_gate),
        Err(_) => {
            let compact: String = text.split_whitespace().collect();
            compact.contains(&format!("#![cfg({})]", layercfg::BUILD_CFG))
        }
    }
}

fn is_gate(attr: &Attribute) -> bool {
    matches!(attr.style, AttrStyle::Inner(_))
        && attr.path().is_ident("cfg")
        && attr
            .parse_args::<syn::Ident>()
            .is_ok_and(|ident| ident == layercfg::BUILD_CFG)
}

/// Items of one source file that belong to a module.
#[derive(Debug)]
pub struct Unit {
    /// File the items were parsed from.
    pub source: Rc<SourceFile>,
    /// Items in declaration order.
    pub items: Vec<Item>,
}

/// A module and the directory its child module files live in.
#[derive(Debug)]
pub struct Module {
    name: String,
    dir: Utf8PathBuf,
    units: Vec<Unit>,
}

impl Module {
    /// Fully qualified name, for example `layercfg::presets`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory that holds child module files.
    #[must_use]
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// Source units in load order.
    #[must_use]
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Iterates over every item together with the file declaring it.
    pub fn items(&self) -> impl Iterator<Item = (&Rc<SourceFile>, &Item)> {
        self.units
            .iter()
            .flat_map(|unit| unit.items.iter().map(move |item| (&unit.source, item)))
    }

    /// First type-like declaration named `name`.
    #[must_use]
    pub fn declaration(&self, name: &str) -> Option<(&Rc<SourceFile>, &Item)> {
        self.items().find(|(_, item)| declared_type_name(item).as_deref() == Some(name))
    }

    fn child_declaration(&self, name: &str) -> Option<(&Rc<SourceFile>, &syn::ItemMod)> {
        self.items().find_map(|(source, item)| match item {
            Item::Mod(module) if module.ident == name => Some((source, module)),
            _ => None,
        })
    }

    fn from_file(name: String, dir: Utf8PathBuf, source: Rc<SourceFile>) -> Self {
        let items = source.syntax().items.clone();
        Self {
            name,
            dir,
            units: vec![Unit { source, items }],
        }
    }
}

fn declared_type_name(item: &Item) -> Option<String> {
    match item {
        Item::Struct(item) => Some(item.ident.to_string()),
        Item::Enum(item) => Some(item.ident.to_string()),
        Item::Type(item) => Some(item.ident.to_string()),
        Item::Union(item) => Some(item.ident.to_string()),
        _ => None,
    }
}

/// Loads the build script's directory as one module.
///
/// `config.rs` is loaded first; sibling `.rs` files follow in name order.
/// The generated file is never read.
///
/// # Errors
///
/// Returns [`GenerateError::Diagnostics`] listing every parse failure across
/// the directory, or [`GenerateError::Io`] when a file cannot be read.
pub fn load_local_module(script: &Utf8Path, name: String) -> Result<Module, GenerateError> {
    let dir_path = script
        .parent()
        .map_or_else(|| Utf8PathBuf::from("."), Utf8Path::to_path_buf);
    let Some(dir) = open_optional_dir(&dir_path)? else {
        return Err(GenerateError::ModuleNotFound { root: dir_path });
    };

    let mut names = Vec::new();
    for entry_result in dir.read_dir(".").map_err(GenerateError::io(&dir_path))? {
        let entry = entry_result.map_err(GenerateError::io(&dir_path))?;
        let file_name = entry.file_name().map_err(GenerateError::io(&dir_path))?;
        let is_file = entry
            .file_type()
            .map_err(GenerateError::io(&dir_path))?
            .is_file();
        if is_file
            && file_name.ends_with(".rs")
            && file_name != SRC_FILE_NAME
            && file_name != DST_FILE_NAME
        {
            names.push(file_name);
        }
    }
    names.sort();
    names.insert(0, SRC_FILE_NAME.to_owned());

    let mut units = Vec::new();
    let mut diagnostics = Vec::new();
    for file_name in names {
        let path = dir_path.join(&file_name);
        let text = dir
            .read_to_string(&file_name)
            .map_err(GenerateError::io(&path))?;
        match SourceFile::parse(path, text) {
            Ok(source) => {
                let items = source.syntax().items.clone();
                units.push(Unit {
                    source: Rc::new(source),
                    items,
                });
            }
            Err(errors) => diagnostics.extend(errors),
        }
    }

    if !diagnostics.is_empty() {
        return Err(GenerateError::Diagnostics(Diagnostics::new(diagnostics)));
    }

    Ok(Module {
        name,
        dir: dir_path,
        units,
    })
}

/// Where the first segment of a path leads.
#[derive(Debug, Clone)]
pub enum CrateRoot {
    /// A crate whose sources can be read.
    Readable(Rc<Module>),
    /// A known crate whose sources are not available.
    Opaque,
}

/// Lazily loaded view of the local crate and its path dependencies.
#[derive(Debug)]
pub struct CrateGraph {
    local: CrateInfo,
    modules: HashMap<String, Rc<Module>>,
    opaque: HashSet<String>,
}

impl CrateGraph {
    /// Creates a graph rooted at the package owning the build script.
    #[must_use]
    pub fn new(local: CrateInfo) -> Self {
        Self {
            local,
            modules: HashMap::new(),
            opaque: HashSet::new(),
        }
    }

    /// The package owning the build script.
    #[must_use]
    pub const fn local(&self) -> &CrateInfo {
        &self.local
    }

    /// Resolves a crate name as it appears in the first segment of a path.
    ///
    /// `crate` names the local crate. Returns `Ok(None)` for names outside
    /// the dependency set.
    ///
    /// # Errors
    ///
    /// Returns loader errors when a readable crate root cannot be parsed.
    pub fn crate_root(&mut self, extern_name: &str) -> Result<Option<CrateRoot>, GenerateError> {
        if TOOLCHAIN_CRATES.contains(&extern_name) || self.opaque.contains(extern_name) {
            return Ok(Some(CrateRoot::Opaque));
        }
        let key = if extern_name == "crate" {
            self.local.ident.clone()
        } else {
            extern_name.to_owned()
        };
        if let Some(module) = self.modules.get(&key) {
            return Ok(Some(CrateRoot::Readable(Rc::clone(module))));
        }

        let root_file = if extern_name == "crate" {
            self.local.crate_root.clone()
        } else {
            let Some(dep) = self.local.dependency(extern_name) else {
                return Ok(None);
            };
            match &dep.path {
                Some(dep_dir) => {
                    manifest::load_crate(&dep_dir.join("Cargo.toml"))?.and_then(|info| info.crate_root)
                }
                None => None,
            }
        };

        let Some(root_file) = root_file else {
            tracing::debug!(crate_name = extern_name, "treating crate as opaque");
            self.opaque.insert(extern_name.to_owned());
            return Ok(Some(CrateRoot::Opaque));
        };
        let Some(source) = load_source(&root_file)? else {
            self.opaque.insert(extern_name.to_owned());
            return Ok(Some(CrateRoot::Opaque));
        };
        let dir = root_file
            .parent()
            .map_or_else(|| Utf8PathBuf::from("."), Utf8Path::to_path_buf);
        let module = Rc::new(Module::from_file(key.clone(), dir, Rc::new(source)));
        self.modules.insert(key, Rc::clone(&module));
        Ok(Some(CrateRoot::Readable(module)))
    }

    /// Loads the child module `name` declared inside `parent`.
    ///
    /// Returns `Ok(None)` when `parent` declares no such module or its file
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::Diagnostics`] when the module file fails to
    /// parse.
    pub fn child(&mut self, parent: &Module, name: &str) -> Result<Option<Rc<Module>>, GenerateError> {
        let key = format!("{}::{name}", parent.name());
        if let Some(module) = self.modules.get(&key) {
            return Ok(Some(Rc::clone(module)));
        }
        let Some((source, declaration)) = parent.child_declaration(name) else {
            return Ok(None);
        };

        let dir = parent.dir().join(name);
        let loaded_module = if let Some((_, items)) = &declaration.content {
            Module {
                name: key.clone(),
                dir,
                units: vec![Unit {
                    source: Rc::clone(source),
                    items: items.clone(),
                }],
            }
        } else {
            let candidates = [
                parent.dir().join(format!("{name}.rs")),
                dir.join("mod.rs"),
            ];
            let mut found = None;
            for candidate in &candidates {
                if let Some(file) = load_source(candidate)? {
                    found = Some(file);
                    break;
                }
            }
            let Some(file) = found else {
                tracing::debug!(module = %key, "module file not found");
                return Ok(None);
            };
            Module::from_file(key.clone(), dir, Rc::new(file))
        };

        let module = Rc::new(loaded_module);
        self.modules.insert(key, Rc::clone(&module));
        Ok(Some(module))
    }
}

fn load_source(path: &Utf8Path) -> Result<Option<SourceFile>, GenerateError> {
    let Some(text) = read_optional(path)? else {
        return Ok(None);
    };
    SourceFile::parse(path, text)
        .map(Some)
        .map_err(|errors: Vec<Diagnostic>| GenerateError::Diagnostics(Diagnostics::new(errors)))
}

#[cfg(test)]
mod tests {
    //! Unit tests for build script detection.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::gated("#![cfg(layercfg)]\nfn main() {}\n", true)]
    #[case::spaced("#![ cfg( layercfg ) ]\nfn main() {}\n", true)]
    #[case::ungated("fn main() {}\n", false)]
    #[case::negated("#![cfg(not(layercfg))]\n", false)]
    #[case::outer("#[cfg(layercfg)]\nfn main() {}\n", false)]
    #[case::other_cfg("#![cfg(test)]\nfn main() {}\n", false)]
    #[case::broken_but_gated("#![cfg(layercfg)]\nfn main( {\n", true)]
    fn detects_gate(#[case] text: &str, #[case] expected: bool) {
        assert_eq!(is_gated(text), expected);
    }
}
