//! Memoization for parser calls, scoped by [`context::cache_size`].
//!
//! Keyed on `(input identity, position, parser identity)`: the position a
//! parser is called at, which input buffer it's called against, and which
//! parser is being called, together fully determine the result of a pure
//! parse function (§4.3, §8 cache transparency). `DESIGN.md` traces why
//! this is keyed on position rather than `spec.md`'s `previous_tag` gloss,
//! against `yapcl/cache.py`'s `wrapper`, which keys on `data[2]`, the
//! triple's position slot, per `example_math.py`'s `RESULT/TAG/INDEX`
//! layout.
//!
//! The table itself follows `yapcl/cache.py` exactly: `capacity` slots are
//! pre-populated with unique sentinel keys so eviction never has to
//! special-case "the table isn't full yet" (§4.3 Initialization), a cache
//! hit swaps the hit entry one slot toward the high end (§4.3 Hit
//! protocol), and a miss evicts by a cubic-biased random index
//! `round(r^3 * (capacity - 1))`, strongly favoring low (cold) slots.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use rand::Rng;

use crate::error::Expected;
use crate::{ParseError, ParseTree, ParserId};

/// A lookup key into one scope's cache table: either a real call site, or
/// one of the `capacity` distinct sentinels the table is initialized with.
/// Splitting sentinels into their own variant (rather than reusing the
/// source's "object identity" trick) guarantees a sentinel can never
/// collide with a real `(input pointer, position, parser id)` triple.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
enum CacheKey {
    Sentinel(usize),
    Real(usize, usize, ParserId),
}

type CacheValue = Result<ParseTree<'static>, ParseError>;

pub(crate) struct CacheInner {
    capacity: usize,
    /// `slots[i]` is the key currently occupying table position `i`.
    slots: Vec<CacheKey>,
    /// Every live key's value and the slot it currently occupies.
    map: HashMap<CacheKey, (CacheValue, usize)>,
    hits: u64,
    misses: u64,
}

fn sentinel_value() -> CacheValue {
    Err(ParseError::new(Expected::named("<cache sentinel>"), 0))
}

impl CacheInner {
    pub(crate) fn new(capacity: usize) -> Self {
        let mut inner = CacheInner {
            capacity,
            slots: Vec::with_capacity(capacity),
            map: HashMap::with_capacity(capacity),
            hits: 0,
            misses: 0,
        };
        inner.populate_sentinels();
        inner
    }

    fn populate_sentinels(&mut self) {
        for i in 0..self.capacity {
            let key = CacheKey::Sentinel(i);
            self.slots.push(key);
            self.map.insert(key, (sentinel_value(), i));
        }
    }

    /// Hit protocol (§4.3): promotes the hit entry one slot toward the
    /// high end by swapping `slots[index]` with `slots[min(capacity-1,
    /// index+1)]`. Matching the source, only the hit entry's own
    /// `slot_index` bookkeeping is updated after the swap, the entry
    /// that got displaced into the vacated slot keeps believing it's at
    /// its old index until it is itself hit or evicted. This doesn't
    /// threaten cache transparency (§8): lookups go through `map` by key,
    /// never by trusting a stale `slot_index`, so a returned value is
    /// always the one recorded for that exact key regardless of bookkeeping
    /// drift; only the *eviction* target (chosen by scanning `slots`) can
    /// end up less perfectly cold-biased than with a fully accurate index.
    fn get(&mut self, key: CacheKey) -> Option<CacheValue> {
        if self.capacity == 0 {
            return None;
        }
        let (value, index) = match self.map.get(&key) {
            Some(entry) => (entry.0.clone(), entry.1),
            None => {
                self.misses += 1;
                return None;
            }
        };
        self.hits += 1;
        let target = (index + 1).min(self.capacity - 1);
        let displaced = self.slots[target];
        self.slots[target] = key;
        self.slots[index] = displaced;
        if let Some(entry) = self.map.get_mut(&key) {
            entry.1 = target;
        }
        Some(value)
    }

    fn insert(&mut self, key: CacheKey, value: CacheValue) {
        if self.capacity == 0 {
            return;
        }
        let r: f64 = rand::thread_rng().gen_range(0.0..1.0);
        let index = ((r * r * r) * (self.capacity - 1) as f64).round() as usize;
        let index = index.min(self.capacity - 1);
        let evicted = self.slots[index];
        self.map.remove(&evicted);
        self.slots[index] = key;
        self.map.insert(key, (value, index));
    }

    fn erase(&mut self) {
        self.slots.clear();
        self.map.clear();
        self.populate_sentinels();
    }
}

/// A handle onto one `cache_size` scope's shared table, for inspecting hit
/// and miss counts or clearing it early (the source's `CacheStats`).
#[derive(Clone)]
pub struct CacheStats {
    inner: Rc<RefCell<CacheInner>>,
}

impl CacheStats {
    pub(crate) fn new(inner: Rc<RefCell<CacheInner>>) -> Self {
        CacheStats { inner }
    }

    pub fn hits(&self) -> u64 {
        self.inner.borrow().hits
    }

    pub fn misses(&self) -> u64 {
        self.inner.borrow().misses
    }

    /// Number of slots currently holding a real (non-sentinel) entry.
    pub fn len(&self) -> usize {
        self.inner
            .borrow()
            .slots
            .iter()
            .filter(|k| !matches!(k, CacheKey::Sentinel(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.inner.borrow().capacity
    }

    /// Drops every memoized entry, returning the table to its initial
    /// all-sentinel state (§4.3), without resetting the hit/miss counters
    /// (matching `yapcl.cache.CacheStats.erase`, which clears `query` and
    /// `mapping` but never touches the counters living alongside them).
    pub fn erase(&self) {
        self.inner.borrow_mut().erase();
    }
}

/// Wraps `func` with a memoizing lookup against the currently active
/// `cache_size` scope, if any. Called once at construction time
/// ([`Parser::build`](crate::Parser::build)); a parser built outside any
/// `cache_size` scope is never memoized, matching the scoped semantics of
/// "memoize parsers built in this block" rather than a single process-wide
/// cache.
pub(crate) fn wrap_if_cached(id: ParserId, func: Rc<crate::ParseFn>) -> Rc<crate::ParseFn> {
    match crate::context::active_cache_frame() {
        Some(table) => Rc::new(move |state, input| {
            let key = CacheKey::Real(input.as_ptr() as usize, state.position, id);
            if let Some(hit) = table.borrow_mut().get(key) {
                return hit.map(promote);
            }
            let result = func(state, input);
            table.borrow_mut().insert(key, result.clone().map(ParseTree::into_owned));
            result
        }),
        None => func,
    }
}

/// A `ParseTree<'static>` has no borrows tied to any particular input, so it
/// can stand in for a `ParseTree<'s>` for any `'s` a caller needs.
fn promote<'s>(tree: ParseTree<'static>) -> ParseTree<'s> {
    tree
}
