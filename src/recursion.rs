//! Forward references for mutually recursive grammars.
//!
//! A factor that refers to a value that refers to a parenthesized term that
//! refers back to a factor can't be built bottom-up in a single expression.
//! `RecursionContainer` hands out a named placeholder parser up front
//! ([`declare`](RecursionContainer::declare)); grammar code is free to
//! build on top of it immediately, and the placeholder's real parser is
//! supplied once it's available ([`define`](RecursionContainer::define)).
//! Calling a placeholder before it's been defined is a programmer error,
//! not a parse failure, and panics (§ ambient error-handling policy).

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::{Parser, Shape};

/// A registry of named forward-reference parsers.
#[derive(Clone, Default)]
pub struct RecursionContainer {
    slots: Rc<RefCell<HashMap<String, Parser>>>,
}

impl RecursionContainer {
    pub fn new() -> Self {
        RecursionContainer::default()
    }

    /// Returns a parser that, once called, looks up `name`'s real
    /// definition and forwards to it. Build grammar rules that refer to
    /// `name` against this placeholder; call [`define`](Self::define) once
    /// the real rule is assembled.
    #[track_caller]
    pub fn declare(&self, name: impl Into<String>) -> Parser {
        let name = name.into();
        let slots = self.slots.clone();
        let display_name: std::rc::Rc<str> = format!("recursive({name})").into();
        Parser::build(display_name, Shape::Plain, move |state, input| {
            let resolved = slots
                .borrow()
                .get(&name)
                .cloned()
                .unwrap_or_else(|| panic!("recursive parser {name:?} was called before being defined"));
            resolved.call(state, input)
        })
    }

    /// Supplies the real parser for a name previously handed out by
    /// [`declare`](Self::declare). Defining the same name twice is a
    /// programmer error and panics rather than silently rebinding a
    /// placeholder other parsers may already hold a reference to.
    pub fn define(&self, name: impl Into<String>, parser: Parser) {
        let name = name.into();
        let mut slots = self.slots.borrow_mut();
        assert!(
            !slots.contains_key(&name),
            "recursive parser {name:?} was already defined"
        );
        slots.insert(name, parser);
    }
}
