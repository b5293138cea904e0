//! Merged properties - the flattened, precedence-ordered view of every
//! property source that applies to one component.
//!
//! Precedence, highest first:
//!
//! 1. `important` variants (later source, later declaration wins)
//! 2. satisfied conditional variants of the last source, later declared first
//! 3. plain entries of that source
//! 4. the same two tiers for each earlier source (defaults, theme)
//! 5. the parent's merged value, for inheritable keys only
//!
//! Sources are expanded through the transformer table when they are added.
//! Reads resolve live: condition state, signal-backed values and derived
//! entries are all read through the reactive graph, so a derived or effect
//! reading a merged property re-runs when the winning value changes.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::trace;

use crate::reactive::{derived, signal, Derived, Signal};
use crate::types::{Color, Dimension, Keyword};

use super::conditions::{Condition, ConditionContext};
use super::key::PropertyKey;
use super::source::PropertySource;
use super::transformers::{Entry, Transformers};
use super::value::{PropValue, Value};

/// Position of a candidate in the precedence order; greater wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Rank {
    important: bool,
    source: usize,
    conditional: bool,
    variant: usize,
    seq: usize,
    expansion: usize,
}

#[derive(Debug, Clone)]
struct Candidate {
    rank: Rank,
    conditions: Vec<Condition>,
    entry: Entry,
}

struct Inner {
    sources: RefCell<Vec<PropertySource>>,
    index: RefCell<HashMap<PropertyKey, Rc<[Candidate]>>>,
    transformers: RefCell<Transformers>,
    context: ConditionContext,
    parent: Option<MergedProperties>,
    version: Signal<u64>,
    resolving: RefCell<Vec<PropertyKey>>,
}

/// Shared handle to one component's merged properties.
#[derive(Clone)]
pub struct MergedProperties {
    inner: Rc<Inner>,
}

impl std::fmt::Debug for MergedProperties {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MergedProperties")
            .field("sources", &self.inner.sources.borrow().len())
            .field("keys", &self.inner.index.borrow().len())
            .field("has_parent", &self.inner.parent.is_some())
            .finish()
    }
}

/// Pops the resolving stack when a read finishes.
struct ResolveGuard<'a> {
    stack: &'a RefCell<Vec<PropertyKey>>,
}

impl<'a> ResolveGuard<'a> {
    fn enter(stack: &'a RefCell<Vec<PropertyKey>>, key: PropertyKey) -> Self {
        let cycle = {
            let mut stack = stack.borrow_mut();
            let cycle = stack.contains(&key);
            if !cycle {
                stack.push(key);
            }
            cycle
        };
        if cycle {
            let path: Vec<_> = stack.borrow().iter().map(|k| k.name()).collect();
            panic!("property cycle detected: {} -> {key}", path.join(" -> "));
        }
        Self { stack }
    }
}

impl Drop for ResolveGuard<'_> {
    fn drop(&mut self) {
        self.stack.borrow_mut().pop();
    }
}

impl MergedProperties {
    pub fn new(
        transformers: Transformers,
        context: ConditionContext,
        parent: Option<MergedProperties>,
    ) -> Self {
        Self {
            inner: Rc::new(Inner {
                sources: RefCell::new(Vec::new()),
                index: RefCell::new(HashMap::new()),
                transformers: RefCell::new(transformers),
                context,
                parent,
                version: signal(0),
                resolving: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Standard transformers, default context, no parent.
    pub fn standalone() -> Self {
        Self::new(Transformers::standard(), ConditionContext::default(), None)
    }

    pub fn parent(&self) -> Option<&MergedProperties> {
        self.inner.parent.as_ref()
    }

    pub fn context(&self) -> &ConditionContext {
        &self.inner.context
    }

    /// Append sources, lowest precedence first, above the ones already added.
    pub fn add_all(&self, sources: impl IntoIterator<Item = PropertySource>) {
        self.inner.sources.borrow_mut().extend(sources);
        self.rebuild();
    }

    /// Replace every source, lowest precedence first.
    pub fn replace(&self, sources: impl IntoIterator<Item = PropertySource>) {
        *self.inner.sources.borrow_mut() = sources.into_iter().collect();
        self.rebuild();
    }

    /// Register a transformer for this component only; replaces an existing
    /// entry for the same key and re-expands the current sources.
    pub fn register_transformer(
        &self,
        key: PropertyKey,
        transform: impl Fn(&PropValue<Value>) -> Vec<(PropertyKey, Entry)> + 'static,
    ) {
        self.inner.transformers.borrow_mut().register(key, transform);
        self.rebuild();
    }

    /// Bumps on every `add_all`/`replace`; read tracked by every property read.
    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }

    fn rebuild(&self) {
        let mut index: HashMap<PropertyKey, Vec<Candidate>> = HashMap::new();
        {
            let sources = self.inner.sources.borrow();
            let transformers = self.inner.transformers.borrow();
            for (source_index, source) in sources.iter().enumerate() {
                let mut counter = 0;
                ingest(&mut index, &transformers, source, source_index, &[], 0, &mut counter);
            }
        }

        let index: HashMap<_, Rc<[Candidate]>> = index
            .into_iter()
            .map(|(key, mut candidates)| {
                candidates.sort_by(|a, b| b.rank.cmp(&a.rank));
                (key, candidates.into())
            })
            .collect();

        trace!(target: "spark_spatial::properties", keys = index.len(), "merged properties rebuilt");
        *self.inner.index.borrow_mut() = index;
        self.inner.version.update(|v| *v += 1);
    }

    /// Resolve the winning value for `key` (tracked).
    ///
    /// Panics if resolving `key` ends up reading `key` again.
    pub fn read(&self, key: PropertyKey) -> Option<Value> {
        let _guard = ResolveGuard::enter(&self.inner.resolving, key);
        self.inner.version.with(|_| ());

        let candidates = self.inner.index.borrow().get(&key).cloned();
        if let Some(candidates) = candidates {
            for candidate in candidates.iter() {
                if self.inner.context.all_met(&candidate.conditions) {
                    return Some(candidate.entry.resolve(self));
                }
            }
        }

        if key.is_inherited() {
            if let Some(parent) = &self.inner.parent {
                return parent.read(key);
            }
        }
        None
    }

    pub fn has(&self, key: PropertyKey) -> bool {
        self.read(key).is_some()
    }

    /// A derived cell tracking the resolved value of `key`.
    pub fn derive(&self, key: PropertyKey) -> Derived<Option<Value>> {
        let this = self.clone();
        derived(move || this.read(key))
    }

    /// A derived cell mapping the resolved value of `key`.
    pub fn derive_with<T, F>(&self, key: PropertyKey, map: F) -> Derived<T>
    where
        T: PartialEq + 'static,
        F: Fn(Option<Value>) -> T + 'static,
    {
        let this = self.clone();
        derived(move || map(this.read(key)))
    }

    // -------------------------------------------------------------------------
    // Typed accessors
    // -------------------------------------------------------------------------

    pub fn number(&self, key: PropertyKey) -> Option<f32> {
        self.read(key).and_then(|v| v.as_number())
    }

    pub fn number_or(&self, key: PropertyKey, default: f32) -> f32 {
        self.number(key).unwrap_or(default)
    }

    pub fn dimension(&self, key: PropertyKey) -> Option<Dimension> {
        self.read(key).and_then(|v| v.as_dimension())
    }

    pub fn color(&self, key: PropertyKey) -> Option<Color> {
        self.read(key).and_then(|v| v.as_color())
    }

    pub fn bool_or(&self, key: PropertyKey, default: bool) -> bool {
        self.read(key).and_then(|v| v.as_bool()).unwrap_or(default)
    }

    pub fn string(&self, key: PropertyKey) -> Option<String> {
        match self.read(key)? {
            Value::Str(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Keyword value; unknown or missing keywords give the keyword's default.
    pub fn keyword<K: Keyword>(&self, key: PropertyKey) -> K {
        self.read(key).and_then(|v| v.as_keyword::<K>()).unwrap_or_default()
    }
}

fn ingest(
    index: &mut HashMap<PropertyKey, Vec<Candidate>>,
    transformers: &Transformers,
    source: &PropertySource,
    source_index: usize,
    conditions: &[Condition],
    variant: usize,
    counter: &mut usize,
) {
    let important = conditions.contains(&Condition::Important);
    let conditional = !conditions.is_empty();

    for (seq, (key, value)) in source.entries().iter().enumerate() {
        let rank = Rank { important, source: source_index, conditional, variant, seq, expansion: 0 };
        let mut push = |key: PropertyKey, entry: Entry, expansion: usize| {
            index.entry(key).or_default().push(Candidate {
                rank: Rank { expansion, ..rank },
                conditions: conditions.to_vec(),
                entry,
            });
        };

        push(*key, Entry::Value(value.clone()), 0);
        if let Some(transform) = transformers.get(*key) {
            for (i, (out_key, entry)) in transform(value).into_iter().enumerate() {
                push(out_key, entry, i + 1);
            }
        }
    }

    for nested in source.variants() {
        *counter += 1;
        let mut nested_conditions = conditions.to_vec();
        nested_conditions.push(nested.condition);
        let variant_index = *counter;
        ingest(index, transformers, &nested.source, source_index, &nested_conditions, variant_index, counter);
    }
}
