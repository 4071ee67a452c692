/// Request-scoped registry of named object types
///
/// Object types are keyed by their deterministic name. While a type's body is
/// being built its slot holds a placeholder, so a foreign key that leads back
/// to it (directly or through other tables) gets a reference instead of
/// recursing.

use crate::error::{Result, TablegraphError};
use crate::schema::links::{HAS_LINKS, LINK};
use crate::schema::object::ObjectTypeDef;
use crate::schema::scalars::LONG;
use crate::schema::QUERY;

use indexmap::IndexMap;

#[derive(Debug)]
enum TypeSlot {
    /// Registered separately with every schema
    Support,
    Pending,
    Resolved(ObjectTypeDef),
}

/// Observable state of a name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeState {
    Unseen,
    Support,
    Pending,
    Resolved,
}

/// Outcome of `TypeRegistry::ensure`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ensured {
    /// Built by this call
    Built,
    /// Built earlier; the existing definition is reused
    Existing,
    /// Under construction further up the stack
    Pending,
}

#[derive(Debug)]
pub struct TypeRegistry {
    slots: IndexMap<String, TypeSlot>,
}

impl TypeRegistry {
    /// A registry seeded with the support types every schema carries
    pub fn new() -> Self {
        let slots = [QUERY, LONG, LINK, HAS_LINKS]
            .into_iter()
            .map(|name| (name.to_string(), TypeSlot::Support))
            .collect();
        Self { slots }
    }

    pub fn state(&self, name: &str) -> TypeState {
        match self.slots.get(name) {
            None => TypeState::Unseen,
            Some(TypeSlot::Support) => TypeState::Support,
            Some(TypeSlot::Pending) => TypeState::Pending,
            Some(TypeSlot::Resolved(_)) => TypeState::Resolved,
        }
    }

    pub fn get(&self, name: &str) -> Option<&ObjectTypeDef> {
        match self.slots.get(name) {
            Some(TypeSlot::Resolved(def)) => Some(def),
            _ => None,
        }
    }

    /// Make sure an object type named `name` exists
    ///
    /// `build` runs only when the name is unseen, with a placeholder in place so
    /// it may re-enter `ensure`. A failed build leaves the name unseen.
    pub fn ensure<F>(&mut self, name: &str, build: F) -> Result<Ensured>
    where
        F: FnOnce(&mut TypeRegistry) -> Result<ObjectTypeDef>,
    {
        match self.slots.get(name) {
            Some(TypeSlot::Resolved(_)) => {
                tracing::trace!("Type '{}' already built", name);
                return Ok(Ensured::Existing);
            }
            Some(TypeSlot::Pending) => {
                tracing::trace!("Type '{}' is under construction, referencing it", name);
                return Ok(Ensured::Pending);
            }
            Some(TypeSlot::Support) => {
                return Err(TablegraphError::SchemaBuild(format!(
                    "Type name '{}' is reserved",
                    name
                )));
            }
            None => {}
        }

        tracing::trace!("Building type '{}'", name);
        self.slots.insert(name.to_string(), TypeSlot::Pending);

        match build(self) {
            Ok(def) if def.name == name => {
                self.slots.insert(name.to_string(), TypeSlot::Resolved(def));
                Ok(Ensured::Built)
            }
            Ok(def) => {
                self.slots.shift_remove(name);
                Err(TablegraphError::SchemaBuild(format!(
                    "Type '{}' was built under the name '{}'",
                    name, def.name
                )))
            }
            Err(e) => {
                self.slots.shift_remove(name);
                Err(e)
            }
        }
    }

    /// Number of object types built so far
    pub fn len(&self) -> usize {
        self.slots
            .values()
            .filter(|slot| matches!(slot, TypeSlot::Resolved(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The built object types, in the order construction started
    ///
    /// Fails if any placeholder was never resolved.
    pub fn into_types(self) -> Result<Vec<ObjectTypeDef>> {
        let mut types = Vec::with_capacity(self.slots.len());
        for (name, slot) in self.slots {
            match slot {
                TypeSlot::Resolved(def) => types.push(def),
                TypeSlot::Support => {}
                TypeSlot::Pending => {
                    return Err(TablegraphError::SchemaBuild(format!(
                        "Type '{}' was never completed",
                        name
                    )));
                }
            }
        }
        Ok(types)
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
