//! Extraction of the entry point, its imports and the aggregation call.

use syn::punctuated::Punctuated;
use syn::visit::{self, Visit};
use syn::{Expr, ItemFn, ItemUse, Macro, Stmt, Token};

use crate::error::{Diagnostic, Diagnostics, GenerateError};
use crate::source::SourceFile;

/// Name of the function that holds the aggregation call.
pub const ENTRY_POINT: &str = "main";

/// Final path segment of the aggregation call.
pub const AGGREGATION_FN: &str = "build_configs";

/// One argument of the aggregation call.
#[derive(Debug, Clone)]
pub struct CallArgument {
    /// Zero-based position in the call.
    pub index: usize,
    /// The argument expression as written.
    pub expr: Expr,
}

/// What the build script declares.
#[derive(Debug, Default)]
pub struct Extraction {
    /// Every `use` item in the script, in source order.
    pub imports: Vec<ItemUse>,
    /// `use` items at the top level of the script, copied into the output.
    pub top_level_imports: Vec<ItemUse>,
    /// Arguments of the last aggregation statement in the entry point.
    pub arguments: Vec<CallArgument>,
}

/// Collects the entry point and every `use` item in pre-order.
#[derive(Debug, Default)]
pub struct ScriptVisitor {
    entry: Option<ItemFn>,
    imports: Vec<ItemUse>,
}

impl<'ast> Visit<'ast> for ScriptVisitor {
    fn visit_item_fn(&mut self, node: &'ast ItemFn) {
        if self.entry.is_none() && node.sig.ident == ENTRY_POINT {
            self.entry = Some(node.clone());
        }
        visit::visit_item_fn(self, node);
    }

    fn visit_item_use(&mut self, node: &'ast ItemUse) {
        self.imports.push(node.clone());
    }
}

#[derive(Debug)]
enum Call {
    Function(Vec<Expr>),
    Macro(Macro),
}

/// Matches an aggregation call written as a statement of the entry point.
///
/// Calls nested in blocks, closures or other expressions are not
/// aggregation calls.
fn aggregation_call(stmt: &Stmt) -> Option<Call> {
    match stmt {
        Stmt::Expr(Expr::Call(call), _) => match &*call.func {
            Expr::Path(callee) if is_aggregation_path(&callee.path) => {
                Some(Call::Function(call.args.iter().cloned().collect()))
            }
            _ => None,
        },
        Stmt::Expr(Expr::Macro(expr), _) => aggregation_macro(&expr.mac),
        Stmt::Macro(statement) => aggregation_macro(&statement.mac),
        _ => None,
    }
}

fn aggregation_macro(mac: &Macro) -> Option<Call> {
    is_aggregation_path(&mac.path).then(|| Call::Macro(mac.clone()))
}

/// A qualified path ending in the aggregation function.
fn is_aggregation_path(path: &syn::Path) -> bool {
    path.segments.len() >= 2
        && path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == AGGREGATION_FN)
}

/// Extracts imports and aggregation arguments from a parsed build script.
///
/// Only statements at the top level of the entry point are inspected and
/// the last aggregation call among them wins. A script without an entry
/// point or without such a call yields no arguments.
///
/// # Errors
///
/// Returns [`GenerateError::InvalidEntryPoint`] when `main` has an empty
/// body and [`GenerateError::Diagnostics`] when the macro arguments are not
/// a comma-separated list of expressions.
pub fn extract(script: &SourceFile) -> Result<Extraction, GenerateError> {
    let mut visitor = ScriptVisitor::default();
    visitor.visit_file(script.syntax());

    let top_level_imports = script
        .syntax()
        .items
        .iter()
        .filter_map(|item| match item {
            syn::Item::Use(import) => Some(import.clone()),
            _ => None,
        })
        .collect();

    let Some(entry) = visitor.entry else {
        tracing::debug!(path = %script.path(), "build script has no entry point");
        return Ok(Extraction {
            imports: visitor.imports,
            top_level_imports,
            arguments: Vec::new(),
        });
    };
    if entry.block.stmts.is_empty() {
        return Err(GenerateError::InvalidEntryPoint {
            path: script.path().to_path_buf(),
        });
    }

    let call = entry.block.stmts.iter().rev().find_map(aggregation_call);
    let exprs = match call {
        None => {
            tracing::debug!(path = %script.path(), "entry point makes no aggregation call");
            Vec::new()
        }
        Some(Call::Function(args)) => args,
        Some(Call::Macro(mac)) => mac
            .parse_body_with(Punctuated::<Expr, Token![,]>::parse_terminated)
            .map_err(|err| {
                GenerateError::Diagnostics(Diagnostics::new(Diagnostic::from_syn(
                    script.path(),
                    &err,
                )))
            })?
            .into_iter()
            .collect(),
    };

    Ok(Extraction {
        imports: visitor.imports,
        top_level_imports,
        arguments: exprs
            .into_iter()
            .enumerate()
            .map(|(index, expr)| CallArgument { index, expr })
            .collect(),
    })
}
