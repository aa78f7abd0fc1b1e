//! Variable storage and change notification.
//!
//! The store owns every variable of a configuration. Observers subscribe to
//! a variable and are called synchronously, in subscription order, each time
//! that variable is raised. Writing a value does not raise by itself; the
//! operations decide when to raise.

use std::fmt;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::error::{EngineError, Result};

use super::value::{Value, VariableKind};
use super::variable::{Variable, VariableId};

/// Callback invoked when a variable is raised.
pub type Observer = Box<dyn FnMut(&Variable)>;

/// Handle returned by [`VariableStore::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// All variables of one configuration, plus their observers.
#[derive(Default)]
pub struct VariableStore {
    variables: Vec<Variable>,
    by_name: FxHashMap<String, VariableId>,
    observers: FxHashMap<VariableId, SmallVec<[(SubscriptionId, Observer); 2]>>,
    next_subscription: u64,
}

impl VariableStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a variable and return its id.
    ///
    /// Names must be unique within a store.
    pub fn declare(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Result<VariableId> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(EngineError::DuplicateVariable(name));
        }

        let id = VariableId::new(self.variables.len() as u32);
        self.by_name.insert(name.clone(), id);
        self.variables.push(Variable::new(name, value));
        Ok(id)
    }

    /// Look up a variable id by name.
    #[must_use]
    pub fn id_of(&self, name: &str) -> Option<VariableId> {
        self.by_name.get(name).copied()
    }

    /// Get a variable.
    pub fn get(&self, id: VariableId) -> Result<&Variable> {
        self.variables
            .get(id.index())
            .ok_or(EngineError::UnknownVariable(id))
    }

    /// Get a variable's current value.
    pub fn value(&self, id: VariableId) -> Result<Value> {
        self.get(id).map(Variable::value)
    }

    /// Get a variable's kind.
    pub fn kind(&self, id: VariableId) -> Result<VariableKind> {
        self.get(id).map(Variable::kind)
    }

    /// Write a value without raising.
    ///
    /// The value must have the variable's kind.
    pub fn set(&mut self, id: VariableId, value: impl Into<Value>) -> Result<()> {
        self.variables
            .get_mut(id.index())
            .ok_or(EngineError::UnknownVariable(id))?
            .assign(value.into())
    }

    /// Register an observer for a variable.
    pub fn subscribe(
        &mut self,
        id: VariableId,
        observer: impl FnMut(&Variable) + 'static,
    ) -> Result<SubscriptionId> {
        self.get(id)?;

        let subscription = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers
            .entry(id)
            .or_default()
            .push((subscription, Box::new(observer)));
        Ok(subscription)
    }

    /// Remove an observer. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, subscription: SubscriptionId) -> bool {
        for list in self.observers.values_mut() {
            if let Some(pos) = list.iter().position(|(s, _)| *s == subscription) {
                drop(list.remove(pos));
                return true;
            }
        }
        false
    }

    /// Number of observers attached to a variable.
    #[must_use]
    pub fn observer_count(&self, id: VariableId) -> usize {
        self.observers.get(&id).map_or(0, SmallVec::len)
    }

    /// Fire the variable's change notification.
    pub fn raise(&mut self, id: VariableId) -> Result<()> {
        let variable = self
            .variables
            .get(id.index())
            .ok_or(EngineError::UnknownVariable(id))?;

        if let Some(observers) = self.observers.get_mut(&id) {
            for (_, observer) in observers.iter_mut() {
                observer(variable);
            }
        }
        Ok(())
    }

    /// Number of variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Iterate over variables in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (VariableId, &Variable)> {
        self.variables
            .iter()
            .enumerate()
            .map(|(i, v)| (VariableId::new(i as u32), v))
    }
}

impl fmt::Debug for VariableStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableStore")
            .field("variables", &self.variables)
            .field(
                "observers",
                &self.observers.values().map(SmallVec::len).sum::<usize>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_declare_and_lookup() {
        let mut store = VariableStore::new();
        let a = store.declare("A", 1).unwrap();
        let b = store.declare("B", true).unwrap();

        assert_eq!(a, VariableId::new(0));
        assert_eq!(b, VariableId::new(1));
        assert_eq!(store.id_of("B"), Some(b));
        assert_eq!(store.id_of("C"), None);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut store = VariableStore::new();
        store.declare("A", 1).unwrap();
        assert_eq!(
            store.declare("A", 2.0f32),
            Err(EngineError::DuplicateVariable("A".to_string()))
        );
    }

    #[test]
    fn test_unknown_variable() {
        let mut store = VariableStore::new();
        let missing = VariableId::new(9);
        assert_eq!(store.value(missing), Err(EngineError::UnknownVariable(missing)));
        assert!(store.set(missing, 1).is_err());
        assert!(store.raise(missing).is_err());
    }

    #[test]
    fn test_set_is_kind_checked() {
        let mut store = VariableStore::new();
        let id = store.declare("Flag", false).unwrap();

        store.set(id, true).unwrap();
        assert_eq!(store.value(id), Ok(Value::Bool(true)));
        assert!(store.set(id, 5).is_err());
        assert_eq!(store.value(id), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_raise_calls_observers_in_subscription_order() {
        let mut store = VariableStore::new();
        let id = store.declare("Gold", 10).unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let log = Rc::clone(&log);
            store
                .subscribe(id, move |v| log.borrow_mut().push(format!("{tag}: {v}")))
                .unwrap();
        }

        store.set(id, 12).unwrap();
        assert!(log.borrow().is_empty(), "set must not raise");

        store.raise(id).unwrap();
        assert_eq!(
            *log.borrow(),
            vec!["first: Gold = 12", "second: Gold = 12", "third: Gold = 12"]
        );
    }

    #[test]
    fn test_unsubscribe() {
        let mut store = VariableStore::new();
        let id = store.declare("Gold", 10).unwrap();
        let count = Rc::new(RefCell::new(0));

        let c = Rc::clone(&count);
        let sub = store.subscribe(id, move |_| *c.borrow_mut() += 1).unwrap();
        assert_eq!(store.observer_count(id), 1);

        store.raise(id).unwrap();
        assert!(store.unsubscribe(sub));
        assert!(!store.unsubscribe(sub));
        store.raise(id).unwrap();

        assert_eq!(*count.borrow(), 1);
        assert_eq!(store.observer_count(id), 0);
    }

    #[test]
    fn test_unsubscribe_releases_the_observer() {
        let mut store = VariableStore::new();
        let id = store.declare("Gold", 10).unwrap();
        let count = Rc::new(RefCell::new(0));

        let c = Rc::clone(&count);
        let sub = store.subscribe(id, move |_| *c.borrow_mut() += 1).unwrap();
        assert_eq!(Rc::strong_count(&count), 2);

        assert!(store.unsubscribe(sub));
        assert_eq!(Rc::strong_count(&count), 1);
    }

    #[test]
    fn test_observers_are_per_variable() {
        let mut store = VariableStore::new();
        let a = store.declare("A", 1).unwrap();
        let b = store.declare("B", 2).unwrap();
        let hits = Rc::new(RefCell::new(Vec::new()));

        let h = Rc::clone(&hits);
        store.subscribe(a, move |v| h.borrow_mut().push(v.name().to_string())).unwrap();

        store.raise(b).unwrap();
        store.raise(a).unwrap();
        assert_eq!(*hits.borrow(), vec!["A"]);
    }
}
