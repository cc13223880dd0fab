//! Resolution of aggregation arguments to struct declarations.

use std::fmt;
use std::rc::Rc;

use proc_macro2::TokenTree;
use syn::ext::IdentExt;
use syn::punctuated::Punctuated;
use syn::{Attribute, Expr, ExprStruct, Fields, Item, ItemStruct, Meta, Token};

use crate::error::GenerateError;
use crate::extract::CallArgument;
use crate::imports::{ImportTable, ImportTarget};
use crate::loader::{CrateGraph, CrateRoot, Module};
use crate::source::SourceFile;

/// Why an argument contributes no section.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SkipReason {
    /// The argument is not a struct literal.
    NotStructLiteral,
    /// The first path segment is neither imported nor a known crate.
    UnknownAlias(String),
    /// No declaration with this path could be read.
    DeclarationNotFound(String),
    /// The declaration is not a non-generic struct with named fields.
    NotStructShaped(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStructLiteral => f.write_str("not a struct literal"),
            Self::UnknownAlias(alias) => write!(f, "unknown alias `{alias}`"),
            Self::DeclarationNotFound(path) => write!(f, "declaration of `{path}` not found"),
            Self::NotStructShaped(path) => {
                write!(f, "`{path}` is not a struct with named fields")
            }
        }
    }
}

/// An argument that was left out of the aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    /// Zero-based position in the aggregation call.
    pub index: usize,
    /// Why it was left out.
    pub reason: SkipReason,
}

impl fmt::Display for Skipped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "argument {}: {}", self.index, self.reason)
    }
}

/// A field of a resolved declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclField {
    /// Identifier as declared, including any `r#` prefix.
    pub ident: String,
    /// Identifier without the raw prefix.
    pub name: String,
    /// Type text as written in the declaration.
    pub ty: String,
    /// Attributes carried over to the generated copy.
    pub attrs: Vec<String>,
    /// Serialized key, assigned during synthesis.
    pub tag: Option<String>,
}

/// A struct declaration paired with the literal that supplies its defaults.
#[derive(Debug, Clone)]
pub struct ResolvedDeclaration {
    /// Type name.
    pub name: String,
    /// Module declaring the type.
    pub module: String,
    /// Named fields in declaration order.
    pub fields: Vec<DeclField>,
    /// Whether the declaration derives `Default`.
    pub derives_default: bool,
    /// Call-site literal.
    pub literal: ExprStruct,
    /// File declaring the type.
    pub declaration_source: Rc<SourceFile>,
    /// File holding the literal.
    pub literal_source: Rc<SourceFile>,
}

/// Outcome for one argument.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// The argument contributes a section.
    Resolved(Box<ResolvedDeclaration>),
    /// The argument was left out.
    Skipped(Skipped),
}

/// Resolves arguments against the local module, the alias table and the
/// crate graph.
#[derive(Debug)]
pub struct Resolver<'a> {
    graph: &'a mut CrateGraph,
    local: &'a Rc<Module>,
    imports: &'a ImportTable,
    script: &'a Rc<SourceFile>,
}

enum Lookup {
    Found(Rc<Module>),
    Skip(SkipReason),
}

impl<'a> Resolver<'a> {
    /// Creates a resolver for arguments written in `script`.
    pub const fn new(
        graph: &'a mut CrateGraph,
        local: &'a Rc<Module>,
        imports: &'a ImportTable,
        script: &'a Rc<SourceFile>,
    ) -> Self {
        Self {
            graph,
            local,
            imports,
            script,
        }
    }

    /// Resolves every argument, logging a warning for each one skipped.
    ///
    /// # Errors
    ///
    /// Propagates loader failures for modules that exist but cannot be read.
    pub fn resolve_all(
        &mut self,
        arguments: &[CallArgument],
    ) -> Result<(Vec<ResolvedDeclaration>, Vec<Skipped>), GenerateError> {
        let mut resolved = Vec::new();
        let mut skipped = Vec::new();
        for argument in arguments {
            match self.resolve(argument)? {
                Resolution::Resolved(declaration) => resolved.push(*declaration),
                Resolution::Skipped(skip) => {
                    tracing::warn!(
                        index = skip.index,
                        reason = %skip.reason,
                        "skipping build_configs argument"
                    );
                    skipped.push(skip);
                }
            }
        }
        Ok((resolved, skipped))
    }

    /// Resolves one argument.
    ///
    /// # Errors
    ///
    /// Propagates loader failures for modules that exist but cannot be read.
    pub fn resolve(&mut self, argument: &CallArgument) -> Result<Resolution, GenerateError> {
        let skip = |reason| {
            Ok(Resolution::Skipped(Skipped {
                index: argument.index,
                reason,
            }))
        };

        let expr = match &argument.expr {
            Expr::Reference(reference) => &*reference.expr,
            other => other,
        };
        let Expr::Struct(literal) = expr else {
            return skip(SkipReason::NotStructLiteral);
        };
        let segments: Vec<String> = literal
            .path
            .segments
            .iter()
            .map(|segment| segment.ident.to_string())
            .collect();
        let written = segments.join("::");
        let Some((name, qualifier)) = segments.split_last() else {
            return skip(SkipReason::NotStructLiteral);
        };

        let (module, declared) = if qualifier.is_empty() {
            match self.unqualified(name) {
                Ok(found) => found,
                Err(reason) => return skip(reason),
            }
        } else {
            match self.qualified(qualifier, &written)? {
                Lookup::Found(module) => (module, name.clone()),
                Lookup::Skip(reason) => return skip(reason),
            }
        };

        let Some((source, item)) = module.declaration(&declared) else {
            return skip(SkipReason::DeclarationNotFound(written));
        };
        let Some(declaration) = struct_shape(item) else {
            return skip(SkipReason::NotStructShaped(written));
        };

        Ok(Resolution::Resolved(Box::new(ResolvedDeclaration {
            name: declared,
            module: module.name().to_owned(),
            fields: declared_fields(source, declaration),
            derives_default: derives_default(declaration),
            literal: literal.clone(),
            declaration_source: Rc::clone(source),
            literal_source: Rc::clone(self.script),
        })))
    }

    /// Local declarations shadow imports. Returns the declaring module and
    /// the declared name, which differs from `name` for renamed imports.
    fn unqualified(&self, name: &str) -> Result<(Rc<Module>, String), SkipReason> {
        if self.local.declaration(name).is_some() {
            return Ok((Rc::clone(self.local), name.to_owned()));
        }
        match self.imports.get(name) {
            Some(ImportTarget::Item { module, name: item }) => {
                Ok((Rc::clone(module), item.clone()))
            }
            _ => Err(SkipReason::DeclarationNotFound(name.to_owned())),
        }
    }

    fn qualified(&mut self, qualifier: &[String], written: &str) -> Result<Lookup, GenerateError> {
        let Some((first, middle)) = qualifier.split_first() else {
            return Ok(Lookup::Found(Rc::clone(self.local)));
        };

        let (mut current, rest) = match first.as_str() {
            "self" | "super" => {
                let skipped = qualifier
                    .iter()
                    .take_while(|segment| matches!(segment.as_str(), "self" | "super"))
                    .count();
                (
                    Rc::clone(self.local),
                    qualifier.get(skipped..).unwrap_or_default(),
                )
            }
            alias => match self.alias_root(alias)? {
                Lookup::Found(module) => (module, middle),
                Lookup::Skip(reason) => return Ok(Lookup::Skip(reason)),
            },
        };

        for segment in rest {
            let Some(child) = self.graph.child(&current, segment)? else {
                return Ok(Lookup::Skip(SkipReason::DeclarationNotFound(
                    written.to_owned(),
                )));
            };
            current = child;
        }
        Ok(Lookup::Found(current))
    }

    fn alias_root(&mut self, alias: &str) -> Result<Lookup, GenerateError> {
        let opaque = || Lookup::Skip(SkipReason::DeclarationNotFound(alias.to_owned()));
        if alias != "crate" {
            match self.imports.get(alias) {
                Some(ImportTarget::Module(module)) => return Ok(Lookup::Found(Rc::clone(module))),
                Some(ImportTarget::Item { module, name }) => {
                    return Ok(self
                        .graph
                        .child(module, name)?
                        .map_or_else(opaque, Lookup::Found));
                }
                Some(ImportTarget::Opaque) => return Ok(opaque()),
                None => {}
            }
        }
        Ok(match self.graph.crate_root(alias)? {
            Some(CrateRoot::Readable(module)) => Lookup::Found(module),
            Some(CrateRoot::Opaque) => opaque(),
            None => Lookup::Skip(SkipReason::UnknownAlias(alias.to_owned())),
        })
    }
}

fn struct_shape(item: &Item) -> Option<&ItemStruct> {
    match item {
        Item::Struct(declaration)
            if matches!(declaration.fields, Fields::Named(_))
                && declaration.generics.params.is_empty() =>
        {
            Some(declaration)
        }
        _ => None,
    }
}

fn derives_default(declaration: &ItemStruct) -> bool {
    declaration
        .attrs
        .iter()
        .filter(|attr| attr.path().is_ident("derive"))
        .any(|attr| {
            attr.parse_args_with(Punctuated::<syn::Path, Token![,]>::parse_terminated)
                .is_ok_and(|paths| {
                    paths
                        .iter()
                        .any(|path| path.segments.last().is_some_and(|last| last.ident == "Default"))
                })
        })
}

fn declared_fields(source: &SourceFile, declaration: &ItemStruct) -> Vec<DeclField> {
    declaration
        .fields
        .iter()
        .filter_map(|field| {
            let ident = field.ident.as_ref()?;
            Some(DeclField {
                ident: ident.to_string(),
                name: ident.unraw().to_string(),
                ty: source.snippet(&field.ty),
                attrs: field
                    .attrs
                    .iter()
                    .filter(|attr| is_carried(attr))
                    .map(|attr| source.snippet(attr))
                    .collect(),
                tag: None,
            })
        })
        .collect()
}

/// Keeps documentation, `cfg` and `serde` attributes. Renames are dropped
/// because the generated copy assigns its own keys.
fn is_carried(attr: &Attribute) -> bool {
    let path = attr.path();
    if path.is_ident("doc") || path.is_ident("cfg") {
        return true;
    }
    if !path.is_ident("serde") {
        return false;
    }
    match &attr.meta {
        Meta::List(list) => !list
            .tokens
            .clone()
            .into_iter()
            .any(|token| matches!(token, TokenTree::Ident(ident) if ident == "rename")),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for declaration shapes and attribute filtering.

    use super::*;
    use rstest::rstest;
    use syn::parse_quote;

    #[rstest]
    #[case::named(parse_quote!(struct A { x: u8 }), true)]
    #[case::tuple(parse_quote!(struct A(u8);), false)]
    #[case::unit(parse_quote!(struct A;), false)]
    #[case::generic(parse_quote!(struct A<T> { x: T }), false)]
    #[case::enumeration(parse_quote!(enum A { X }), false)]
    #[case::alias(parse_quote!(type A = u8;), false)]
    fn accepts_only_plain_named_structs(#[case] item: Item, #[case] expected: bool) {
        assert_eq!(struct_shape(&item).is_some(), expected);
    }

    #[rstest]
    #[case::plain(parse_quote!(#[derive(Default)] struct A { x: u8 }), true)]
    #[case::listed(parse_quote!(#[derive(Debug, Clone, Default)] struct A { x: u8 }), true)]
    #[case::qualified(parse_quote!(#[derive(::core::default::Default)] struct A { x: u8 }), true)]
    #[case::separate(parse_quote!(#[derive(Debug)] #[derive(Default)] struct A { x: u8 }), true)]
    #[case::absent(parse_quote!(#[derive(Debug, Clone)] struct A { x: u8 }), false)]
    #[case::underived(parse_quote!(struct A { x: u8 }), false)]
    fn detects_derived_default(#[case] item: ItemStruct, #[case] expected: bool) {
        assert_eq!(derives_default(&item), expected);
    }

    #[rstest]
    #[case::doc(parse_quote!(#[doc = "Host."]), true)]
    #[case::serde_default(parse_quote!(#[serde(default)]), true)]
    #[case::serde_rename(parse_quote!(#[serde(rename = "h")]), false)]
    #[case::serde_mixed(parse_quote!(#[serde(default, rename = "h")]), false)]
    #[case::cfg(parse_quote!(#[cfg(unix)]), true)]
    #[case::foreign(parse_quote!(#[arg(long)]), false)]
    fn filters_carried_attributes(#[case] attr: Attribute, #[case] expected: bool) {
        assert_eq!(is_carried(&attr), expected);
    }

    #[rstest]
    fn formats_skips_with_position() {
        let skipped = Skipped {
            index: 2,
            reason: SkipReason::UnknownAlias("cfgs".to_owned()),
        };
        assert_eq!(skipped.to_string(), "argument 2: unknown alias `cfgs`");
    }
}
