//! Abilities and the per-actor registry that holds them

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

/// A capability an actor can be granted, usually wrapping a collaborator
/// (database, API client, browser session).
///
/// The registry is keyed by the implementing type, so an actor holds at most
/// one instance of each ability type.
pub trait Ability: Send + Sync + 'static {
    /// Name used in registry listings and missing-ability errors
    const NAME: &'static str;
}

struct Registered {
    name: &'static str,
    ability: Box<dyn Any + Send + Sync>,
}

/// Flat map from ability type to the bound instance
#[derive(Default)]
pub struct AbilityRegistry {
    entries: HashMap<TypeId, Registered>,
}

impl AbilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `ability`, returning true if it replaced an earlier binding of the
    /// same type
    pub fn insert<A: Ability>(&mut self, ability: A) -> bool {
        self.entries
            .insert(
                TypeId::of::<A>(),
                Registered {
                    name: A::NAME,
                    ability: Box::new(ability),
                },
            )
            .is_some()
    }

    pub fn get<A: Ability>(&self) -> Option<&A> {
        self.entries
            .get(&TypeId::of::<A>())
            .and_then(|entry| entry.ability.downcast_ref::<A>())
    }

    pub fn contains<A: Ability>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<A>())
    }

    /// Registered ability names, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.entries.values().map(|entry| entry.name).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for AbilityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}
