//! Generation pipeline state for one build script.

use std::rc::Rc;

use camino::{Utf8Path, Utf8PathBuf};

use crate::emit::{self, EmitInput};
use crate::error::GenerateError;
use crate::extract;
use crate::imports::ImportTable;
use crate::loader::{self, CrateGraph, DST_FILE_NAME, Module};
use crate::manifest::{self, CrateInfo};
use crate::resolve::{Resolver, Skipped};
use crate::source::SourceFile;
use crate::synth::{self, AggregateStruct};

/// Caller overrides for a generation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Fail on skipped arguments. `None` defers to
    /// `package.metadata.layercfg.strict`.
    pub strict: Option<bool>,
}

/// The result of rendering one build script.
#[derive(Debug, Clone)]
pub struct Rendered {
    /// Where the generated module belongs.
    pub output_path: Utf8PathBuf,
    /// Generated source text.
    pub text: String,
    /// Field layout of the generated aggregate.
    pub aggregate: AggregateStruct,
    /// Arguments left out of the aggregate.
    pub skipped: Vec<Skipped>,
}

/// Everything loaded before symbol resolution starts.
#[derive(Debug)]
pub struct GenerationContext {
    script: Rc<SourceFile>,
    local: Rc<Module>,
    graph: CrateGraph,
    source_label: String,
    strict: bool,
}

impl GenerationContext {
    /// Locates the single build script under `root` and loads its module.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::ModuleNotFound`] or
    /// [`GenerateError::AmbiguousModule`] when `root` does not hold exactly
    /// one build script, and loader errors for the owning package and the
    /// local module.
    pub fn load(root: &Utf8Path, options: GenerateOptions) -> Result<Self, GenerateError> {
        let canonical_root = root
            .canonicalize_utf8()
            .map_err(|_| GenerateError::ModuleNotFound {
                root: root.to_path_buf(),
            })?;
        let mut scripts = loader::find_build_scripts(&canonical_root)?;
        let script_path = match scripts.len() {
            0 => {
                return Err(GenerateError::ModuleNotFound {
                    root: root.to_path_buf(),
                });
            }
            1 => scripts.remove(0),
            _ => {
                return Err(GenerateError::AmbiguousModule {
                    root: root.to_path_buf(),
                    candidates: scripts,
                });
            }
        };
        tracing::debug!(script = %script_path, "using build script");

        let module_dir = script_path
            .parent()
            .map_or_else(|| canonical_root.clone(), Utf8Path::to_path_buf);
        let crate_info = manifest::locate_crate(&module_dir)?;
        let local = loader::load_local_module(&script_path, module_name(&crate_info, &module_dir))?;
        let script = local
            .units()
            .first()
            .map(|unit| Rc::clone(&unit.source))
            .ok_or_else(|| GenerateError::ModuleNotFound {
                root: root.to_path_buf(),
            })?;

        let strict = options.strict.unwrap_or(crate_info.metadata.strict);
        let source_label = script_path
            .strip_prefix(&crate_info.root)
            .map_or_else(|_| script_path.to_string(), ToString::to_string);

        Ok(Self {
            script,
            local: Rc::new(local),
            graph: CrateGraph::new(crate_info),
            source_label,
            strict,
        })
    }

    /// Path of the generated module, beside the build script.
    #[must_use]
    pub fn output_path(&self) -> Utf8PathBuf {
        self.local.dir().join(DST_FILE_NAME)
    }

    /// Resolves the aggregation call and renders the generated module.
    ///
    /// # Errors
    ///
    /// Returns extraction, import and synthesis errors, and
    /// [`GenerateError::UnresolvedArguments`] when strict mode is enabled
    /// and any argument was skipped.
    pub fn render(mut self) -> Result<Rendered, GenerateError> {
        let extraction = extract::extract(&self.script)?;
        let imports = ImportTable::build(&extraction.imports, &mut self.graph, &self.local)?;
        let (mut declarations, skipped) =
            Resolver::new(&mut self.graph, &self.local, &imports, &self.script)
                .resolve_all(&extraction.arguments)?;

        if self.strict && !skipped.is_empty() {
            return Err(GenerateError::UnresolvedArguments(skipped));
        }

        let aggregate = synth::synthesize(&mut declarations)?;
        let text = emit::render(&EmitInput {
            source_label: &self.source_label,
            module: self.local.name(),
            script: &self.script,
            imports: &extraction.top_level_imports,
            declarations: &declarations,
            aggregate: &aggregate,
        })?;

        Ok(Rendered {
            output_path: self.output_path(),
            text,
            aggregate,
            skipped,
        })
    }
}

/// Derives `crate::a::b` style names from the module directory, relative to
/// the directory of the crate root.
fn module_name(crate_info: &CrateInfo, module_dir: &Utf8Path) -> String {
    let base = crate_info
        .crate_root
        .as_deref()
        .and_then(Utf8Path::parent)
        .unwrap_or(&crate_info.root);
    let mut name = crate_info.ident.clone();
    if let Ok(relative) = module_dir.strip_prefix(base) {
        for component in relative.components() {
            name.push_str("::");
            name.push_str(component.as_str());
        }
    }
    name
}
