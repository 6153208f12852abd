//! Ambient, scoped configuration for parser construction.
//!
//! The source models "skip whitespace between these tokens", "memoize
//! parsers built here", and "trace parsers built here" as Python context
//! managers (`with ignore(whitespace): ...`) that push state a global
//! registry consults while the `with` block's body runs. Rust has no
//! `with` statement; the idiomatic replacement is a scoped-closure API
//! backed by a `thread_local!` stack, pushed before the closure runs and
//! popped by an RAII guard so a panicking grammar still leaves the stack
//! balanced.

use std::cell::RefCell;
use std::panic::Location;
use std::rc::Rc;
use std::thread::LocalKey;

use crate::cache::CacheInner;
use crate::{Parser, branch};

thread_local! {
    static IGNORE_STACK: RefCell<Vec<Option<Parser>>> = RefCell::new(Vec::new());
    static CACHE_STACK: RefCell<Vec<Rc<RefCell<CacheInner>>>> = RefCell::new(Vec::new());
    static TRACE_STACK: RefCell<Vec<TraceScope>> = RefCell::new(Vec::new());
}

fn scoped<T: 'static, R>(stack: &'static LocalKey<RefCell<Vec<T>>>, value: T, body: impl FnOnce() -> R) -> R {
    stack.with(|s| s.borrow_mut().push(value));

    struct Guard<T: 'static>(&'static LocalKey<RefCell<Vec<T>>>);
    impl<T: 'static> Drop for Guard<T> {
        fn drop(&mut self) {
            self.0.with(|s| {
                s.borrow_mut().pop();
            });
        }
    }
    let _guard = Guard(stack);

    body()
}

/// Runs `body`, skipping any of `parsers` (matched via `either`) between the
/// elements of every `seq` that executes while it runs, regardless of when
/// that `seq` was built. Passing an empty list disables skipping for the
/// duration of `body`, overriding an outer `ignore` scope (the source's
/// `ignore()` called with no arguments). A grammar assembled once (e.g.
/// behind a [`RecursionContainer`](crate::RecursionContainer)) and parsed
/// under different `ignore` scopes on different calls picks up whichever
/// scope is active for each call.
pub fn ignore<R>(parsers: impl IntoIterator<Item = Parser>, body: impl FnOnce() -> R) -> R {
    let parsers: Vec<Parser> = parsers.into_iter().collect();
    let combined = if parsers.is_empty() { None } else { Some(branch::either(parsers)) };
    scoped(&IGNORE_STACK, combined, body)
}

pub(crate) fn current_ignore() -> Option<Parser> {
    IGNORE_STACK.with(|s| s.borrow().last().cloned().flatten())
}

/// Runs the active ignore parser (if any) from `cursor` and folds its
/// position advance back in, swallowing a non-match rather than failing
/// (§4.5: the ignore parser is failure-tolerant, and only its position
/// advance is kept, its own value and tag are discarded). Called once
/// before each child of `seq`/`many`/`sepby`/`leftassoc` and once more
/// after the last child.
pub(crate) fn skip_ignore<'s>(cursor: &mut crate::ParseTree<'s>, input: &'s str) {
    if let Some(ignored) = current_ignore() {
        if let Ok(skip) = ignored.call(cursor, input) {
            cursor.position = skip.position;
        }
    }
}

/// Runs `body`, memoizing every parser built within it in a shared cache of
/// at most `size` entries (§4.3), evicted by a cubic-biased random policy
/// when full. `body` receives a [`CacheStats`](crate::cache::CacheStats)
/// handle for inspecting hit/miss counts or forcing an early `erase()`.
pub fn cache_size<R>(size: usize, body: impl FnOnce(&crate::cache::CacheStats) -> R) -> R {
    let inner = Rc::new(RefCell::new(CacheInner::new(size)));
    let stats = crate::cache::CacheStats::new(inner.clone());
    scoped(&CACHE_STACK, inner, || body(&stats))
}

pub(crate) fn active_cache_frame() -> Option<Rc<RefCell<CacheInner>>> {
    CACHE_STACK.with(|s| s.borrow().last().cloned())
}

#[derive(Clone, Copy)]
pub(crate) struct TraceScope {
    pub file: &'static str,
    pub code_context: usize,
    pub max_trace_lines: usize,
}

/// Runs `body`, marking every parser constructed within it (at a call site
/// in the same source file as this call) as traced: the registered
/// [`debug::TraceHook`](crate::debug::TraceHook), if any, is invoked around
/// every call to such a parser. `code_context` and `max_trace_lines` are
/// forwarded to the hook for its own rendering budget; this crate does not
/// interpret them itself (§"Explicitly still out of scope").
#[track_caller]
pub fn trace<R>(code_context: usize, max_trace_lines: usize, body: impl FnOnce() -> R) -> R {
    let file = Location::caller().file();
    scoped(
        &TRACE_STACK,
        TraceScope {
            file,
            code_context,
            max_trace_lines,
        },
        body,
    )
}

pub(crate) fn active_trace() -> Option<TraceScope> {
    TRACE_STACK.with(|s| s.borrow().last().copied())
}
