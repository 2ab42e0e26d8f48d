//! Handler registry.
//!
//! A registry maps `(language, node kind)` to a handler value. Lookup for a
//! concrete node walks the node's dispatch ancestry under the requested
//! language first, then under the language-agnostic entries, and finally
//! delegates to an optional parent registry. Overlays for a single
//! invocation are plain child registries.
//!
//! The registry stores *values*; backends register function pointers or
//! trait objects as they see fit, and several backends coexist by owning
//! separate registries over the same tag space.

use rustc_hash::FxHashMap;
use thiserror::Error;

use bindweld_core::Lang;

use crate::kind::NodeKind;

/// No handler matched a node during dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no {entry} handler registered for {kind} (lang {lang:?})")]
pub struct LookupError {
    /// Entry kind this registry serves (e.g. "type", "function").
    pub entry: &'static str,
    /// Debug rendering of the offending node kind.
    pub kind: String,
    pub lang: Lang,
}

/// A `(language, node-kind) → handler` table with parent fallback.
pub struct Registry<'p, K: NodeKind, H> {
    /// Entry kind served, used in lookup errors.
    entry: &'static str,
    entries: FxHashMap<(Option<Lang>, K), H>,
    parent: Option<&'p Registry<'p, K, H>>,
}

impl<'p, K: NodeKind, H> Registry<'p, K, H> {
    /// Fresh registry for the given entry kind.
    pub fn new(entry: &'static str) -> Self {
        Self {
            entry,
            entries: FxHashMap::default(),
            parent: None,
        }
    }

    /// Overlay registry: lookups fall back to `parent` when nothing local
    /// matches.
    pub fn with_parent(parent: &'p Registry<'p, K, H>) -> Self {
        Self {
            entry: parent.entry,
            entries: FxHashMap::default(),
            parent: Some(parent),
        }
    }

    /// Register a handler for a language-specific kind.
    pub fn register(&mut self, lang: Lang, kind: K, handler: H) {
        self.entries.insert((Some(lang), kind), handler);
    }

    /// Register a language-agnostic default for a kind.
    pub fn register_default(&mut self, kind: K, handler: H) {
        self.entries.insert((None, kind), handler);
    }

    /// Most specific handler for `kind` under `lang`.
    ///
    /// Search order: the kind's ancestry under `lang`, the ancestry under
    /// the language-agnostic entries, then the parent registry.
    pub fn get(&self, lang: Lang, kind: K) -> Option<&H> {
        for k in kind.ancestry() {
            if let Some(handler) = self.entries.get(&(Some(lang), *k)) {
                return Some(handler);
            }
        }
        for k in kind.ancestry() {
            if let Some(handler) = self.entries.get(&(None, *k)) {
                return Some(handler);
            }
        }
        self.parent.and_then(|parent| parent.get(lang, kind))
    }

    /// Like [`Registry::get`], but a missing handler is an error naming the
    /// offending kind.
    pub fn require(&self, lang: Lang, kind: K) -> Result<&H, LookupError> {
        self.get(lang, kind).ok_or_else(|| LookupError {
            entry: self.entry,
            kind: format!("{kind:?}"),
            lang,
        })
    }

    /// Every handler along the ancestry chain, most specific first.
    ///
    /// For each ancestor tag, the language-specific entry wins over the
    /// agnostic one and the parent is consulted last; compound visitors run
    /// these in order until one signals stop.
    pub fn chain(&self, lang: Lang, kind: K) -> Vec<&H> {
        let mut handlers = Vec::new();
        for k in kind.ancestry() {
            if let Some(handler) = self
                .entries
                .get(&(Some(lang), *k))
                .or_else(|| self.entries.get(&(None, *k)))
            {
                handlers.push(handler);
            } else if let Some(parent) = self.parent
                && let Some(handler) = parent
                    .entries
                    .get(&(Some(lang), *k))
                    .or_else(|| parent.entries.get(&(None, *k)))
            {
                handlers.push(handler);
            }
        }
        handlers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::EntityTag;

    #[test]
    fn lookup_walks_ancestry() {
        let mut reg: Registry<'_, EntityTag, &str> = Registry::new("function");
        reg.register(Lang::C, EntityTag::Function, "generic");

        // Method has no handler of its own; Function catches it.
        assert_eq!(reg.get(Lang::C, EntityTag::Method), Some(&"generic"));

        reg.register(Lang::C, EntityTag::Method, "method");
        assert_eq!(reg.get(Lang::C, EntityTag::Method), Some(&"method"));
    }

    #[test]
    fn language_specific_beats_agnostic() {
        let mut reg: Registry<'_, EntityTag, &str> = Registry::new("function");
        reg.register_default(EntityTag::Free, "any");
        assert_eq!(reg.get(Lang::Rust, EntityTag::Free), Some(&"any"));

        reg.register(Lang::Rust, EntityTag::Free, "rust");
        assert_eq!(reg.get(Lang::Rust, EntityTag::Free), Some(&"rust"));
        assert_eq!(reg.get(Lang::C, EntityTag::Free), Some(&"any"));
    }

    #[test]
    fn overlay_falls_back_to_parent() {
        let mut parent: Registry<'_, EntityTag, &str> = Registry::new("function");
        parent.register(Lang::C, EntityTag::Class, "base");

        let mut child = Registry::with_parent(&parent);
        assert_eq!(child.get(Lang::C, EntityTag::Class), Some(&"base"));

        child.register(Lang::C, EntityTag::Class, "override");
        assert_eq!(child.get(Lang::C, EntityTag::Class), Some(&"override"));
    }

    #[test]
    fn missing_handler_reports_the_kind() {
        let reg: Registry<'_, EntityTag, &str> = Registry::new("type");
        let err = reg.require(Lang::Rust, EntityTag::Enum).unwrap_err();

        assert_eq!(err.entry, "type");
        assert_eq!(err.kind, "Enum");
        assert_eq!(err.lang, Lang::Rust);
    }

    #[test]
    fn chain_collects_every_matching_ancestor() {
        let mut reg: Registry<'_, EntityTag, &str> = Registry::new("function");
        reg.register(Lang::C, EntityTag::Constructor, "ctor");
        reg.register(Lang::C, EntityTag::Function, "fn");

        let chain = reg.chain(Lang::C, EntityTag::Constructor);
        assert_eq!(chain, vec![&"ctor", &"fn"]);
    }
}
