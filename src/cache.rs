use std::collections::{HashMap, hash_map::Entry};

use tracing::trace;

use crate::{
    ast::Node,
    context::EvalContext,
    error::{ParseError, TemplateError},
    parser::parse,
};

/// Parsed templates keyed by their exact source text.
///
/// Each entry owns its tree; replacing or removing an entry drops the old
/// tree. Not synchronized.
///
/// ```
/// use elx_lang::{EvalContext, ExpressionCache};
///
/// let mut cache = ExpressionCache::new();
/// let mut ctx = EvalContext::default();
/// assert_eq!(cache.evaluate("${x * 2}", &mut ctx).unwrap(), "0");
/// assert_eq!(cache.evaluate("${x + x}", &mut ctx).unwrap(), "0");
/// assert_eq!(cache.usage_count("x"), 2);
/// assert_eq!(cache.occurrence_count("x"), 3);
/// ```
#[derive(Debug, Default, Clone)]
pub struct ExpressionCache {
    entries: HashMap<String, Node>,
}

impl ExpressionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find(&self, source: &str) -> Option<&Node> {
        self.entries.get(source)
    }

    /// Stores `node` under `source`, dropping any tree already there.
    pub fn insert(&mut self, source: impl Into<String>, node: Node) {
        let source = source.into();
        if self.entries.insert(source.clone(), node).is_some() {
            trace!(%source, "replaced cached expression");
        } else {
            trace!(%source, "cached expression");
        }
    }

    pub fn remove(&mut self, source: &str) -> Option<Node> {
        self.entries.remove(source)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of cached expressions that reference the identifier `name`.
    ///
    /// Recomputed by a full walk on each call.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn usage_count(&self, name: &str) -> u32 {
        let count = self
            .entries
            .values()
            .filter(|node| occurrences(node, name) > 0)
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Number of Identifier nodes named `name` across every cached tree.
    pub fn occurrence_count(&self, name: &str) -> u32 {
        self.entries
            .values()
            .map(|node| occurrences(node, name))
            .fold(0, u32::saturating_add)
    }

    /// Returns the cached tree for `source`, parsing and caching it first if
    /// needed. Sources with diagnostics are not cached.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn get_or_parse(&mut self, source: &str) -> Result<&Node, ParseError> {
        match self.entries.entry(source.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let node = parse(source)?;
                trace!("cached expression");
                Ok(entry.insert(node))
            }
        }
    }

    /// Parses (or reuses) `source` and renders it against `ctx`.
    #[tracing::instrument(level = "trace", skip(self, ctx))]
    pub fn evaluate(
        &mut self,
        source: &str,
        ctx: &mut EvalContext,
    ) -> Result<String, TemplateError> {
        let node = self.get_or_parse(source)?;
        Ok(node.evaluate_to_string(ctx)?)
    }
}

fn occurrences(node: &Node, name: &str) -> u32 {
    let mut count = 0u32;
    node.walk(&mut |visited: &Node| {
        if let Node::Identifier { name: ident, .. } = visited
            && ident == name
        {
            count = count.saturating_add(1);
        }
    });
    count
}
