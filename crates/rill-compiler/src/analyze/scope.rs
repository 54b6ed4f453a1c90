//! The scope stack: one hash table per open block.
//!
//! Pushed on `Block` entry, popped on exit. Insertion goes to the top frame
//! only; lookup walks from the top frame to the root, so inner declarations
//! shadow outer ones. The bottom frame holds the globals.

use std::collections::HashMap;

use rill_core::Name;

use crate::types::TypeId;

#[derive(Debug, Default)]
pub struct ScopeStack {
    frames: Vec<HashMap<Name, TypeId>>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self) {
        self.frames.push(HashMap::new());
    }

    pub fn pop(&mut self) {
        self.frames.pop();
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Inserts into the top frame.
    ///
    /// # Panics
    /// Panics if no frame is open.
    pub fn insert(&mut self, name: Name, ty: TypeId) {
        self.frames
            .last_mut()
            .expect("scope stack has an open frame")
            .insert(name, ty);
    }

    /// Walks frames from the top down.
    pub fn lookup(&self, name: Name) -> Option<TypeId> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(&name).copied())
    }
}
