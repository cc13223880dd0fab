//! Parsed source files and verbatim snippet extraction.
//!
//! Generated code reuses the author's own text for types, literal values and
//! imports. Spans recorded by `proc-macro2` (with `span-locations`) map each
//! syntax node back to its original characters; nodes without usable spans
//! fall back to token printing.

use camino::{Utf8Path, Utf8PathBuf};
use proc_macro2::LineColumn;
use quote::ToTokens;
use syn::spanned::Spanned;

use crate::error::Diagnostic;

/// A source file together with its syntax tree.
#[derive(Debug)]
pub struct SourceFile {
    path: Utf8PathBuf,
    text: String,
    line_starts: Vec<usize>,
    syntax: syn::File,
}

impl SourceFile {
    /// Parses `text` read from `path`.
    ///
    /// # Errors
    ///
    /// Returns one [`Diagnostic`] per parser message when `text` is not a
    /// valid Rust file.
    pub fn parse(path: impl Into<Utf8PathBuf>, text: String) -> Result<Self, Vec<Diagnostic>> {
        let owned = path.into();
        let syntax = match syn::parse_file(&text) {
            Ok(syntax) => syntax,
            Err(err) => return Err(Diagnostic::from_syn(&owned, &err)),
        };
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(at, _)| at + 1))
            .collect();
        Ok(Self {
            path: owned,
            text,
            line_starts,
            syntax,
        })
    }

    /// Path the file was read from.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Parsed syntax tree.
    #[must_use]
    pub const fn syntax(&self) -> &syn::File {
        &self.syntax
    }

    /// Original text of `node`, or its token rendering when the span does not
    /// point into this file.
    #[must_use]
    pub fn snippet<T: Spanned + ToTokens>(&self, node: &T) -> String {
        let span = node.span();
        self.offset(span.start())
            .zip(self.offset(span.end()))
            .filter(|(from, to)| from < to)
            .and_then(|(from, to)| self.text.get(from..to))
            .map_or_else(|| node.to_token_stream().to_string(), str::to_owned)
    }

    fn offset(&self, at: LineColumn) -> Option<usize> {
        let line_start = *self.line_starts.get(at.line.checked_sub(1)?)?;
        let rest = self.text.get(line_start..)?;
        rest.char_indices()
            .map(|(index, _)| index)
            .chain(std::iter::once(rest.len()))
            .nth(at.column)
            .map(|index| line_start + index)
    }
}
