//! Rendering of the generated configuration module.
//!
//! The output is plain Rust source. Types, defaults and imports are copied
//! from the author's text so the generated file reads like the build script
//! it came from.

use std::fmt::{self, Write};

use syn::ItemUse;

use crate::loader::SRC_FILE_NAME;
use crate::resolve::ResolvedDeclaration;
use crate::source::SourceFile;
use crate::synth::{AGGREGATE_NAME, AggregateField, AggregateStruct, EMBEDDING_FIELD};

/// Paths used in generated code. Leading `::` keeps them independent of the
/// copied imports.
const RUNTIME: &str = "::layercfg";
const SERDE: &str = "::serde";
const DEFAULT_CALL: &str = "::core::default::Default::default()";

/// Everything the emitter needs from earlier stages.
#[derive(Debug, Clone, Copy)]
pub struct EmitInput<'a> {
    /// Build script path relative to the package root.
    pub source_label: &'a str,
    /// Name of the module being generated.
    pub module: &'a str,
    /// The build script.
    pub script: &'a SourceFile,
    /// Top-level imports of the build script.
    pub imports: &'a [ItemUse],
    /// Resolved sections in call order.
    pub declarations: &'a [ResolvedDeclaration],
    /// Field layout of the aggregate.
    pub aggregate: &'a AggregateStruct,
}

/// Renders the generated module.
///
/// # Errors
///
/// Returns [`fmt::Error`] if writing to the buffer fails.
pub fn render(input: &EmitInput<'_>) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_header(&mut out, input)?;
    write_imports(&mut out, input)?;
    write_sections(&mut out, input.declarations)?;
    write_aggregate(&mut out, input.aggregate)?;
    write_impls(&mut out, input)?;
    Ok(out)
}

fn write_header(out: &mut String, input: &EmitInput<'_>) -> fmt::Result {
    writeln!(
        out,
        "// Code generated by cargo-layercfg {}: DO NOT EDIT.",
        env!("CARGO_PKG_VERSION")
    )?;
    writeln!(out, "// source: {}", input.source_label)?;
    writeln!(out, "// module: {}", input.module)?;
    writeln!(out, "#![cfg(not({}))]", layercfg::BUILD_CFG)?;
    writeln!(out, "#![allow(unused_imports)]")
}

fn write_imports(out: &mut String, input: &EmitInput<'_>) -> fmt::Result {
    if input.imports.is_empty() {
        return Ok(());
    }
    writeln!(out)?;
    for import in input.imports {
        writeln!(out, "{}", input.script.snippet(import))?;
    }
    Ok(())
}

fn write_sections(out: &mut String, declarations: &[ResolvedDeclaration]) -> fmt::Result {
    if declarations.is_empty() {
        return Ok(());
    }
    writeln!(out)?;
    writeln!(out, "/// Sections merged into [`{AGGREGATE_NAME}`].")?;
    writeln!(out, "pub mod sections {{")?;
    writeln!(out, "    use super::*;")?;
    for declaration in declarations {
        writeln!(out)?;
        writeln!(
            out,
            "    /// Copy of `{}::{}`.",
            declaration.module, declaration.name
        )?;
        let default = if declaration.derives_default { " Default," } else { "" };
        writeln!(
            out,
            "    #[derive(Debug, Clone,{default} {SERDE}::Deserialize, {SERDE}::Serialize)]"
        )?;
        if declaration.fields.is_empty() {
            writeln!(out, "    pub struct {} {{}}", declaration.name)?;
            continue;
        }
        writeln!(out, "    pub struct {} {{", declaration.name)?;
        for field in &declaration.fields {
            for attr in &field.attrs {
                writeln!(out, "        {attr}")?;
            }
            let tag = field.tag.as_deref().unwrap_or(&field.name);
            writeln!(out, "        #[serde(rename = \"{tag}\")]")?;
            writeln!(out, "        pub {}: {},", field.ident, field.ty)?;
        }
        writeln!(out, "    }}")?;
    }
    writeln!(out, "}}")
}

fn write_aggregate(out: &mut String, aggregate: &AggregateStruct) -> fmt::Result {
    writeln!(out)?;
    writeln!(
        out,
        "/// Configuration assembled from the sections declared in `{SRC_FILE_NAME}`."
    )?;
    writeln!(
        out,
        "#[derive(Debug, Clone, {SERDE}::Deserialize, {SERDE}::Serialize)]"
    )?;
    writeln!(out, "pub struct {AGGREGATE_NAME} {{")?;
    for field in &aggregate.fields {
        match field {
            AggregateField::Marker => {
                writeln!(out, "    /// Layer sources applied by `{AGGREGATE_NAME}::new`.")?;
                writeln!(out, "    #[serde(skip)]")?;
                writeln!(out, "    pub {EMBEDDING_FIELD}: {RUNTIME}::Embedding,")?;
            }
            AggregateField::Spacer => writeln!(out)?,
            AggregateField::Section(section) => {
                writeln!(out, "    /// The `{}` section.", section.type_name)?;
                writeln!(out, "    #[serde(rename = \"{}\")]", section.tag)?;
                writeln!(
                    out,
                    "    pub {}: sections::{},",
                    section.ident, section.type_name
                )?;
            }
        }
    }
    writeln!(out, "}}")
}

fn write_impls(out: &mut String, input: &EmitInput<'_>) -> fmt::Result {
    writeln!(out)?;
    writeln!(out, "impl {RUNTIME}::Embedded for {AGGREGATE_NAME} {{")?;
    writeln!(out, "    fn embedding(&self) -> &{RUNTIME}::Embedding {{")?;
    writeln!(out, "        &self.{EMBEDDING_FIELD}")?;
    writeln!(out, "    }}")?;
    writeln!(out)?;
    writeln!(
        out,
        "    fn embedding_mut(&mut self) -> &mut {RUNTIME}::Embedding {{"
    )?;
    writeln!(out, "        &mut self.{EMBEDDING_FIELD}")?;
    writeln!(out, "    }}")?;
    writeln!(out, "}}")?;

    writeln!(out)?;
    writeln!(out, "impl {AGGREGATE_NAME} {{")?;
    writeln!(
        out,
        "    /// Builds the configuration from its defaults, then the layers selected"
    )?;
    writeln!(out, "    /// by `opts`.")?;
    writeln!(out, "    ///")?;
    writeln!(out, "    /// # Errors")?;
    writeln!(out, "    ///")?;
    writeln!(
        out,
        "    /// Returns `LayerError` when a layer cannot be read or merged."
    )?;
    writeln!(
        out,
        "    pub fn new<I>(opts: I) -> ::core::result::Result<Self, {RUNTIME}::LayerError>"
    )?;
    writeln!(out, "    where")?;
    writeln!(
        out,
        "        I: ::core::iter::IntoIterator<Item = {RUNTIME}::ConfigOption>,"
    )?;
    writeln!(out, "    {{")?;
    writeln!(out, "        let mut config = Self::new_default();")?;
    writeln!(
        out,
        "        {RUNTIME}::Embedding::init(&mut config, opts)?;"
    )?;
    writeln!(out, "        ::core::result::Result::Ok(config)")?;
    writeln!(out, "    }}")?;
    writeln!(out)?;
    writeln!(out, "    /// Returns the defaults written in `{SRC_FILE_NAME}`.")?;
    writeln!(out, "    #[must_use]")?;
    writeln!(out, "    pub fn new_default() -> Self {{")?;
    writeln!(out, "        Self {{")?;
    writeln!(
        out,
        "            {EMBEDDING_FIELD}: {RUNTIME}::Embedding::default(),"
    )?;
    let sections = input.aggregate.sections();
    for (section, declaration) in sections.zip(input.declarations) {
        write_initializer(out, &section.ident, declaration)?;
    }
    writeln!(out, "        }}")?;
    writeln!(out, "    }}")?;
    writeln!(out, "}}")?;

    writeln!(out)?;
    writeln!(out, "impl ::core::default::Default for {AGGREGATE_NAME} {{")?;
    writeln!(out, "    fn default() -> Self {{")?;
    writeln!(out, "        Self::new_default()")?;
    writeln!(out, "    }}")?;
    writeln!(out, "}}")
}

/// Writes the call-site literal of one section as its default value.
///
/// Fields missing from a literal without a base expression are filled from
/// the section's `Default` when it derives one.
fn write_initializer(
    out: &mut String,
    ident: &str,
    declaration: &ResolvedDeclaration,
) -> fmt::Result {
    let literal = &declaration.literal;
    let source = &declaration.literal_source;
    let rest = literal
        .rest
        .as_ref()
        .map(|rest| {
            if is_type_default_call(rest) {
                format!("..{DEFAULT_CALL}")
            } else {
                format!("..{}", source.snippet(rest))
            }
        })
        .or_else(|| {
            (declaration.derives_default && literal.fields.len() < declaration.fields.len())
                .then(|| format!("..{DEFAULT_CALL}"))
        });

    if literal.fields.is_empty() && rest.is_none() {
        return writeln!(out, "            {ident}: sections::{} {{}},", declaration.name);
    }
    writeln!(out, "            {ident}: sections::{} {{", declaration.name)?;
    for value in &literal.fields {
        writeln!(out, "                {},", source.snippet(value))?;
    }
    if let Some(base) = rest {
        writeln!(out, "                {base}")?;
    }
    writeln!(out, "            }},")
}

/// `Type::default()` and `<Type as Default>::default()` name the original
/// type, which differs from the generated copy. `Default::default()` is left
/// alone since it already infers the copy.
fn is_type_default_call(expr: &syn::Expr) -> bool {
    let syn::Expr::Call(call) = expr else {
        return false;
    };
    let syn::Expr::Path(callee) = &*call.func else {
        return false;
    };
    let mut segments = callee.path.segments.iter().rev();
    let is_default_fn = segments.next().is_some_and(|last| last.ident == "default");
    let owner = segments.next();
    call.args.is_empty()
        && is_default_fn
        && (callee.qself.is_some() || owner.is_some_and(|segment| segment.ident != "Default"))
}

#[cfg(test)]
mod tests {
    //! Unit tests for source rendering.

    use super::*;
    use crate::resolve::DeclField;
    use crate::synth::synthesize;
    use anyhow::{Result, anyhow};
    use rstest::rstest;
    use std::rc::Rc;

    const SCRIPT: &str = "#![cfg(layercfg)]\n\
        use layercfg::presets;\n\
        fn main() {\n    layercfg::build_configs!(\n        Http { host: \"0.0.0.0\".into() },\n        Empty {},\n    );\n}\n";

    fn field(name: &str) -> DeclField {
        DeclField {
            ident: name.to_owned(),
            name: name.to_owned(),
            ty: "String".to_owned(),
            attrs: vec!["/// Doc.".to_owned()],
            tag: None,
        }
    }

    fn fixture() -> Result<(Rc<SourceFile>, Vec<ItemUse>, Vec<ResolvedDeclaration>)> {
        let script = Rc::new(
            SourceFile::parse("config.rs", SCRIPT.to_owned())
                .map_err(|diagnostics| anyhow!("{diagnostics:?}"))?,
        );
        let extraction = crate::extract::extract(&script)?;
        let mut literals = extraction.arguments.into_iter().map(|argument| argument.expr);
        let mut next_literal = || match literals.next() {
            Some(syn::Expr::Struct(literal)) => Ok(literal),
            other => Err(anyhow!("expected struct literal, got {other:?}")),
        };
        let declarations = vec![
            ResolvedDeclaration {
                name: "Http".to_owned(),
                module: "demo::settings".to_owned(),
                fields: vec![field("host"), field("port")],
                derives_default: true,
                literal: next_literal()?,
                declaration_source: Rc::clone(&script),
                literal_source: Rc::clone(&script),
            },
            ResolvedDeclaration {
                name: "Empty".to_owned(),
                module: "demo::settings".to_owned(),
                fields: Vec::new(),
                derives_default: true,
                literal: next_literal()?,
                declaration_source: Rc::clone(&script),
                literal_source: Rc::clone(&script),
            },
        ];
        Ok((script, extraction.top_level_imports, declarations))
    }

    fn rendered() -> Result<String> {
        let (script, imports, mut declarations) = fixture()?;
        let aggregate = synthesize(&mut declarations)?;
        Ok(render(&EmitInput {
            source_label: "src/settings/config.rs",
            module: "demo::settings",
            script: &script,
            imports: &imports,
            declarations: &declarations,
            aggregate: &aggregate,
        })?)
    }

    #[rstest]
    #[case::header("// source: src/settings/config.rs\n// module: demo::settings\n#![cfg(not(layercfg))]\n")]
    #[case::import("\nuse layercfg::presets;\n")]
    #[case::copied_field(
        "        /// Doc.\n        #[serde(rename = \"host\")]\n        pub host: String,\n"
    )]
    #[case::empty_section("    pub struct Empty {}\n")]
    #[case::aggregate_field("    #[serde(rename = \"http\")]\n    pub http: sections::Http,\n")]
    #[case::verbatim_default("                host: \"0.0.0.0\".into(),\n")]
    #[case::filled_default("                ..::core::default::Default::default()\n")]
    #[case::empty_default("            empty: sections::Empty {},\n")]
    fn renders_expected_fragments(#[case] fragment: &str) -> Result<()> {
        let text = rendered()?;
        assert!(text.contains(fragment), "missing {fragment:?} in:\n{text}");
        Ok(())
    }

    fn render_single(literal: &str, derives_default: bool) -> Result<String> {
        let script = Rc::new(
            SourceFile::parse("config.rs", format!("fn main() {{ let _ = {literal}; }}\n"))
                .map_err(|diagnostics| anyhow!("{diagnostics:?}"))?,
        );
        let item = script.syntax().items.first().cloned();
        let Some(syn::Item::Fn(entry)) = item else {
            return Err(anyhow!("expected fn main"));
        };
        let Some(syn::Stmt::Local(local)) = entry.block.stmts.first() else {
            return Err(anyhow!("expected let statement"));
        };
        let Some(syn::Expr::Struct(parsed)) = local.init.as_ref().map(|init| &*init.expr) else {
            return Err(anyhow!("expected struct literal"));
        };
        let mut declarations = vec![ResolvedDeclaration {
            name: "Listen".to_owned(),
            module: "demo".to_owned(),
            fields: vec![field("addr"), field("port")],
            derives_default,
            literal: parsed.clone(),
            declaration_source: Rc::clone(&script),
            literal_source: Rc::clone(&script),
        }];
        let aggregate = synthesize(&mut declarations)?;
        Ok(render(&EmitInput {
            source_label: "config.rs",
            module: "demo",
            script: &script,
            imports: &[],
            declarations: &declarations,
            aggregate: &aggregate,
        })?)
    }

    #[rstest]
    fn sections_without_default_get_no_default_derive_or_filler() -> Result<()> {
        let text = render_single("Listen { addr: addr() }", false)?;
        assert!(text.contains(
            "    #[derive(Debug, Clone, ::serde::Deserialize, ::serde::Serialize)]\n    pub struct Listen {"
        ));
        assert!(!text.contains("..::core::default::Default::default()"));
        Ok(())
    }

    #[rstest]
    #[case::type_default("Listen { ..Listen::default() }", "..::core::default::Default::default()\n")]
    #[case::qualified_type_default(
        "Listen { ..presets::Listen::default() }",
        "..::core::default::Default::default()\n"
    )]
    #[case::qualified_self("Listen { ..<Listen as Default>::default() }", "..::core::default::Default::default()\n")]
    #[case::trait_default("Listen { ..Default::default() }", "..Default::default()\n")]
    #[case::variable("Listen { ..base }", "..base\n")]
    fn rewrites_bases_naming_the_original_type(
        #[case] literal: &str,
        #[case] expected: &str,
    ) -> Result<()> {
        let text = render_single(literal, true)?;
        assert!(text.contains(expected), "missing {expected:?} in:\n{text}");
        Ok(())
    }

    #[rstest]
    fn rendering_is_deterministic() -> Result<()> {
        assert_eq!(rendered()?, rendered()?);
        Ok(())
    }

    #[rstest]
    fn output_parses_as_rust() -> Result<()> {
        let text = rendered()?;
        syn::parse_file(&text)?;
        Ok(())
    }

    #[rstest]
    fn omits_sections_module_without_sections() -> Result<()> {
        let (script, _, _) = fixture()?;
        let aggregate = synthesize(&mut [])?;
        let text = render(&EmitInput {
            source_label: "config.rs",
            module: "demo",
            script: &script,
            imports: &[],
            declarations: &[],
            aggregate: &aggregate,
        })?;
        assert!(!text.contains("pub mod sections"));
        assert!(text.contains("    pub embedding: ::layercfg::Embedding,\n}\n"));
        Ok(())
    }
}
