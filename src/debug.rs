//! The hook contract an external tracer or visualizer attaches to.
//!
//! The source's `trace_parser`/`pretty_print` (an interactive ANSI debugger
//! and a parse-tree pretty-printer) are collaborators outside this crate's
//! core and are not implemented here. What the core does provide is the
//! seam they'd attach to: a single process-wide hook invoked around every
//! call to a parser built inside a [`context::trace`] scope, carrying
//! enough information (which parser, where it started, where it ended or
//! why it failed) for a visualizer to render without this crate knowing
//! anything about rendering.

use std::cell::RefCell;
use std::panic::Location;
use std::rc::Rc;

use crate::{ParseError, ParserId};

/// One call to a traced parser, reported after the call completes.
pub struct TraceEvent {
    pub parser_id: ParserId,
    pub parser_name: Rc<str>,
    pub position_before: usize,
    pub position_after: Option<usize>,
    pub error: Option<ParseError>,
}

/// Implemented by anything that wants to observe traced parser calls.
/// `Fn(&TraceEvent)` closures implement this via the blanket impl below, so
/// `set_trace_hook(|event| { ... })` is enough for most uses.
pub trait TraceHook {
    fn on_call(&self, event: &TraceEvent);
}

impl<F: Fn(&TraceEvent)> TraceHook for F {
    fn on_call(&self, event: &TraceEvent) {
        self(event)
    }
}

thread_local! {
    static HOOK: RefCell<Option<Rc<dyn TraceHook>>> = RefCell::new(None);
}

/// Registers the process's trace hook, replacing any previously registered
/// one. There is exactly one hook per thread, mirroring the source's single
/// global debugger attachment point.
pub fn set_trace_hook(hook: impl TraceHook + 'static) {
    HOOK.with(|h| *h.borrow_mut() = Some(Rc::new(hook)));
}

pub fn clear_trace_hook() {
    HOOK.with(|h| *h.borrow_mut() = None);
}

/// Wraps `func` so that, if its construction site (`caller`) lies in the
/// file an active `trace()` scope was opened from, every call reports a
/// [`TraceEvent`] to the registered hook. Called once at construction time;
/// a parser built outside any `trace()` scope, or in a different file, is
/// never instrumented.
#[track_caller]
pub(crate) fn wrap_if_traced(id: ParserId, name: Rc<str>, func: Rc<crate::ParseFn>) -> Rc<crate::ParseFn> {
    let caller = Location::caller();
    match crate::context::active_trace() {
        Some(scope) if scope.file == caller.file() => Rc::new(move |state, input| {
            let position_before = state.position;
            let result = func(state, input);
            HOOK.with(|h| {
                if let Some(hook) = h.borrow().as_ref() {
                    let event = TraceEvent {
                        parser_id: id,
                        parser_name: name.clone(),
                        position_before,
                        position_after: result.as_ref().ok().map(|t| t.position),
                        error: result.as_ref().err().cloned(),
                    };
                    hook.on_call(&event);
                }
            });
            result
        }),
        _ => func,
    }
}
