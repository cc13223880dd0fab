//! Synthesis of the aggregate configuration type.

use std::collections::HashMap;

use crate::case::to_snake_case;
use crate::error::GenerateError;
use crate::resolve::ResolvedDeclaration;

/// Name of the generated aggregate type.
pub const AGGREGATE_NAME: &str = "Config";

/// Name of the field that stores the embedding settings.
pub const EMBEDDING_FIELD: &str = "embedding";

/// Identifiers that cannot be written as raw identifiers.
const UNRAWABLE: [&str; 5] = ["crate", "self", "super", "Self", "_"];

/// One field of the aggregate type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregateField {
    /// The embedding marker, always first and never serialized.
    Marker,
    /// A blank line separating sections in the emitted source.
    Spacer,
    /// A field holding one section.
    Section(SectionField),
}

/// A section field of the aggregate type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionField {
    /// Field identifier, raw when the tag is a keyword.
    pub ident: String,
    /// Serialized key.
    pub tag: String,
    /// Section type name.
    pub type_name: String,
}

/// Field layout of the aggregate type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateStruct {
    /// The marker followed by a spacer and a section per declaration.
    pub fields: Vec<AggregateField>,
}

impl AggregateStruct {
    /// Section fields in declaration order.
    pub fn sections(&self) -> impl Iterator<Item = &SectionField> {
        self.fields.iter().filter_map(|field| match field {
            AggregateField::Section(section) => Some(section),
            _ => None,
        })
    }
}

/// Assigns field tags and lays out the aggregate type.
///
/// # Errors
///
/// Returns [`GenerateError::ReservedSectionName`] when a section is named
/// like the aggregate or maps to a field that cannot be declared, and
/// [`GenerateError::DuplicateSection`] when two sections map to one field.
pub fn synthesize(
    declarations: &mut [ResolvedDeclaration],
) -> Result<AggregateStruct, GenerateError> {
    let mut fields = Vec::with_capacity(1 + 2 * declarations.len());
    fields.push(AggregateField::Marker);
    let mut claimed: HashMap<String, String> = HashMap::new();

    for declaration in declarations.iter_mut() {
        for field in &mut declaration.fields {
            field.tag = Some(to_snake_case(&field.name));
        }

        if declaration.name == AGGREGATE_NAME {
            return Err(GenerateError::ReservedSectionName(declaration.name.clone()));
        }
        let tag = to_snake_case(&declaration.name);
        if tag == EMBEDDING_FIELD || UNRAWABLE.contains(&tag.as_str()) {
            return Err(GenerateError::ReservedSectionName(declaration.name.clone()));
        }
        if let Some(first) = claimed.get(&tag) {
            return Err(GenerateError::DuplicateSection {
                first: first.clone(),
                second: declaration.name.clone(),
                field: tag,
            });
        }
        claimed.insert(tag.clone(), declaration.name.clone());

        fields.push(AggregateField::Spacer);
        fields.push(AggregateField::Section(SectionField {
            ident: field_ident(&tag),
            tag,
            type_name: declaration.name.clone(),
        }));
    }

    Ok(AggregateStruct { fields })
}

/// Writes keywords as raw identifiers.
fn field_ident(tag: &str) -> String {
    if syn::parse_str::<syn::Ident>(tag).is_ok() {
        tag.to_owned()
    } else {
        format!("r#{tag}")
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for aggregate synthesis.

    use super::*;
    use crate::resolve::DeclField;
    use crate::source::SourceFile;
    use anyhow::{Result, anyhow};
    use rstest::rstest;
    use std::rc::Rc;

    fn declaration(name: &str, fields: &[&str]) -> Result<ResolvedDeclaration> {
        let source = Rc::new(
            SourceFile::parse("config.rs", format!("fn main() {{ let _ = {name} {{}}; }}\n"))
                .map_err(|diagnostics| anyhow!("{diagnostics:?}"))?,
        );
        Ok(ResolvedDeclaration {
            name: name.to_owned(),
            module: "demo".to_owned(),
            fields: fields
                .iter()
                .map(|field| DeclField {
                    ident: (*field).to_owned(),
                    name: field.trim_start_matches("r#").to_owned(),
                    ty: "String".to_owned(),
                    attrs: Vec::new(),
                    tag: None,
                })
                .collect(),
            derives_default: true,
            literal: syn::parse_str(&format!("{name} {{}}"))?,
            declaration_source: Rc::clone(&source),
            literal_source: source,
        })
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(3)]
    fn lays_out_marker_spacers_and_sections(#[case] count: usize) -> Result<()> {
        let mut declarations = (0..count)
            .map(|index| declaration(&format!("Section{index}Config"), &[]))
            .collect::<Result<Vec<_>>>()?;
        let aggregate = synthesize(&mut declarations)?;
        assert_eq!(aggregate.fields.len(), 1 + 2 * count);
        assert_eq!(aggregate.fields.first(), Some(&AggregateField::Marker));
        assert_eq!(aggregate.sections().count(), count);
        Ok(())
    }

    #[rstest]
    fn tags_sections_and_fields_in_snake_case() -> Result<()> {
        let mut declarations = vec![declaration("OIDCConfig", &["ClientID", "r#type"])?];
        let aggregate = synthesize(&mut declarations)?;
        let section = aggregate.sections().next().ok_or_else(|| anyhow!("no section"))?;
        assert_eq!(section.tag, "oidc_config");
        assert_eq!(section.ident, "oidc_config");
        let tags: Vec<_> = declarations
            .iter()
            .flat_map(|declaration| declaration.fields.iter())
            .map(|field| field.tag.clone())
            .collect();
        assert_eq!(tags, [Some("client_id".to_owned()), Some("type".to_owned())]);
        Ok(())
    }

    #[rstest]
    fn keyword_tags_become_raw_identifiers() -> Result<()> {
        let mut declarations = vec![declaration("Type", &[])?];
        let aggregate = synthesize(&mut declarations)?;
        let section = aggregate.sections().next().ok_or_else(|| anyhow!("no section"))?;
        assert_eq!(section.ident, "r#type");
        assert_eq!(section.tag, "type");
        Ok(())
    }

    #[rstest]
    fn rejects_duplicate_sections() -> Result<()> {
        let mut declarations = vec![
            declaration("HttpServerConfig", &[])?,
            declaration("HTTPServerConfig", &[])?,
        ];
        let result = synthesize(&mut declarations);
        assert!(matches!(
            result,
            Err(GenerateError::DuplicateSection { ref field, .. }) if field == "http_server_config"
        ));
        Ok(())
    }

    #[rstest]
    #[case::aggregate("Config")]
    #[case::marker("Embedding")]
    #[case::keyword("Super")]
    fn rejects_reserved_names(#[case] name: &str) -> Result<()> {
        let mut declarations = vec![declaration(name, &[])?];
        assert!(matches!(
            synthesize(&mut declarations),
            Err(GenerateError::ReservedSectionName(_))
        ));
        Ok(())
    }
}
