//! Host method -> HLSL translation
//!
//! [`translate_method`] runs one [`ShaderSyntaxRewriter`] over one method and
//! returns the rewritten method together with the static members it captured.
//! Translations share no mutable state, so [`translate_methods`] runs them in
//! parallel.

pub mod captures;
pub mod error;
pub mod resolver;
pub mod rewriter;
pub mod type_map;

pub use captures::{CaptureEntry, CaptureInsert, CaptureTable};
pub use error::TranslateError;
pub use resolver::{
    LocalScope, MemberHandle, MemberKind, Resolution, StaticMemberTable, SymbolResolver,
};
pub use rewriter::ShaderSyntaxRewriter;
pub use type_map::TypeMap;

use crate::config::TranslatorConfig;
use crate::syntax::printer::render_method;
use crate::syntax::MethodDecl;
use rayon::prelude::*;

/// A method that went through the rewriter.
#[derive(Debug, Clone)]
pub struct TranslatedMethod {
    pub method: MethodDecl,
    pub captures: CaptureTable,
}

impl TranslatedMethod {
    /// HLSL source of the rewritten method.
    pub fn to_hlsl(&self) -> String {
        render_method(&self.method)
    }
}

/// Translate one method with the default capture prefix.
pub fn translate_method<R: SymbolResolver + ?Sized>(
    method: MethodDecl,
    resolver: &R,
    types: &TypeMap,
) -> error::Result<TranslatedMethod> {
    let mut rewriter = ShaderSyntaxRewriter::new(resolver, types);
    finish(&mut rewriter, method).map(|method| TranslatedMethod {
        method,
        captures: rewriter.into_captures(),
    })
}

/// Translate one method using a loaded configuration.
pub fn translate_method_with_config<R: SymbolResolver + ?Sized>(
    method: MethodDecl,
    resolver: &R,
    types: &TypeMap,
    config: &TranslatorConfig,
) -> error::Result<TranslatedMethod> {
    let mut rewriter =
        ShaderSyntaxRewriter::new(resolver, types).with_capture_prefix(config.capture_prefix.clone());
    finish(&mut rewriter, method).map(|method| TranslatedMethod {
        method,
        captures: rewriter.into_captures(),
    })
}

/// Translate independent methods in parallel, one rewriter per method. The
/// result for each method is reported separately and in input order.
pub fn translate_methods<R: SymbolResolver + Sync + ?Sized>(
    methods: Vec<MethodDecl>,
    resolver: &R,
    types: &TypeMap,
) -> Vec<error::Result<TranslatedMethod>> {
    methods
        .into_par_iter()
        .map(|method| translate_method(method, resolver, types))
        .collect()
}

fn finish<R: SymbolResolver + ?Sized>(
    rewriter: &mut ShaderSyntaxRewriter<'_, R>,
    method: MethodDecl,
) -> error::Result<MethodDecl> {
    let name = method.name.clone();
    match rewriter.rewrite_method(method) {
        Ok(method) => {
            log::debug!(
                "[ShaderSyntaxRewriter] translated {} ({} captured members)",
                name,
                rewriter.captures().len()
            );
            Ok(method)
        }
        Err(err) => {
            log::debug!("[ShaderSyntaxRewriter] {} is not translatable: {}", name, err);
            Err(err)
        }
    }
}
