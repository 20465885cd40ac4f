//! The canonicalization pipeline: read, analyze, locate, rewrite, render

use crate::cache::{AnalyzedSource, SourceCache};
use crate::config::CanonConfig;
use crate::error::CanonError;
use cn_canon::CanonicalSource;
use cn_lexer::SourceUnit;
use cn_locate::{Dispatch, Located, Origin, locate};
use cn_rewrite::{ClosureTraits, rewrite};
use cn_span::SourceKey;
use cn_vfs::SourceProvider;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A function value as the runtime describes it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionValue {
    /// File the value was defined in
    pub path: PathBuf,
    /// How to find the definition in that file
    pub origin: Origin,
}

impl FunctionValue {
    /// Value defined in `path` at `origin`
    pub fn new(path: impl Into<PathBuf>, origin: impl Into<Origin>) -> Self {
        Self {
            path: path.into(),
            origin: origin.into(),
        }
    }
}

/// Canonical form of a function value plus what was learned producing it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalClosure {
    /// Canonical code and its signature
    pub source: CanonicalSource,
    /// Facts the runtime needs to rebind the closure
    pub traits: ClosureTraits,
    /// Present for closures synthesized from callable references
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dispatch: Option<Dispatch>,
    /// Names that matched nothing and were anchored to the global scope
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unresolved: Vec<String>,
}

impl CanonicalClosure {
    /// The canonical code
    pub fn code(&self) -> &str {
        &self.source.code
    }
}

/// Turns function values into canonical source
pub struct Canonicalizer<P> {
    provider: P,
    config: CanonConfig,
}

impl<P: SourceProvider> Canonicalizer<P> {
    /// Canonicalizer reading sources through `provider`
    pub fn new(provider: P, config: CanonConfig) -> Self {
        Self { provider, config }
    }

    /// Active configuration
    pub fn config(&self) -> &CanonConfig {
        &self.config
    }

    /// Where sources are read from
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Canonicalize the function value described by `value`
    ///
    /// # Errors
    ///
    /// Returns [`CanonError::SourceUnavailable`] when the provider cannot
    /// supply the file, and the other variants when locating or rewriting
    /// the definition fails.
    pub fn canonicalize(&self, value: &FunctionValue) -> Result<CanonicalClosure, CanonError> {
        let text = self
            .provider
            .source_text(&value.path)
            .map_err(|cause| CanonError::SourceUnavailable {
                path: value.path.display().to_string(),
                reason: format!("{cause:#}"),
            })?;

        let analyzed = self.analyze(&value.path, text);
        self.canonicalize_in(&analyzed, &value.origin)
    }

    /// Canonicalize a function value defined in `text`, a code fragment
    /// without an opening tag
    ///
    /// The fragment has no path, so magic constants are kept as written.
    ///
    /// # Errors
    ///
    /// As for [`Canonicalizer::canonicalize`], minus source availability.
    pub fn canonicalize_snippet(
        &self,
        text: &str,
        origin: &Origin,
    ) -> Result<CanonicalClosure, CanonError> {
        let analyzed = AnalyzedSource::analyze(SourceUnit::snippet(text));
        self.canonicalize_in(&analyzed, origin)
    }

    /// Tokenize and scan `text`, through the shared cache when enabled
    fn analyze(&self, path: &Path, text: Arc<str>) -> Arc<AnalyzedSource> {
        if !self.config.use_cache {
            return Arc::new(AnalyzedSource::analyze(SourceUnit::new(path, text)));
        }

        let key = SourceKey::for_text(path, &text);
        SourceCache::global()
            .get_or_build(key, || AnalyzedSource::analyze(SourceUnit::new(path, text)))
    }

    fn canonicalize_in(
        &self,
        analyzed: &AnalyzedSource,
        origin: &Origin,
    ) -> Result<CanonicalClosure, CanonError> {
        let AnalyzedSource { unit, scopes } = analyzed;

        let located =
            locate(unit, scopes, origin).map_err(|error| CanonError::from_locate(error, unit))?;
        let rewritten = rewrite(unit, scopes, located.body(), &self.config.rewrite_options())
            .map_err(|error| CanonError::from_rewrite(error, unit))?;

        let mut traits = rewritten.traits;
        let source = match &located {
            Located::Literal(_) => CanonicalSource::from_tokens(&rewritten.tokens),
            Located::Synthesized(function) => {
                traits.is_static = function.is_static;
                CanonicalSource::from_parts(&function.header, &rewritten.tokens)
            }
        };

        for name in &rewritten.unresolved {
            tracing::debug!(name = %name, "anchored unresolved name to the global scope");
        }
        tracing::debug!(
            form = %located.body().form,
            signature = %source.signature,
            "canonicalized function value"
        );

        Ok(CanonicalClosure {
            source,
            traits,
            dispatch: located.dispatch(),
            unresolved: rewritten.unresolved,
        })
    }
}
