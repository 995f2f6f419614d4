//! # Navigation State
//!
//! Immutable key/value context handed from page to page.
//!
//! ```text
//! State ──put_string()──► State'      (receiver untouched)
//!   │
//!   └─start_transaction()──► Transaction ──put_*()…──► commit() ──► State'
//! ```
//!
//! Every `put_*` on a [`State`] copies the mapping and returns a new value.
//! A [`Transaction`] copies once, takes any number of writes in place, and
//! produces one new `State` on `commit()`.
//!
//! Cloning a `State` is cheap: the mapping sits behind an `Rc` and is only
//! copied when written.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;

/// A single stored value.
#[derive(Clone)]
pub enum Value {
    Str(String),
    Int(i64),
    Object(Rc<dyn Any>),
}

impl Value {
    fn kind(&self) -> ValueKind {
        match self {
            Value::Str(_) => ValueKind::Str,
            Value::Int(_) => ValueKind::Int,
            Value::Object(_) => ValueKind::Object,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Object(_) => write!(f, "<object>"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Str,
    Int,
    Object,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Str => "string",
            ValueKind::Int => "int",
            ValueKind::Object => "object",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("state has no value for key `{key}`")]
    Missing { key: String },
    #[error("state value for key `{key}` is {found}, expected {expected}")]
    WrongKind {
        key: String,
        expected: ValueKind,
        found: ValueKind,
    },
}

type Map = BTreeMap<String, Value>;

/// Immutable, copy-on-write key/value context.
#[derive(Clone, Default, PartialEq)]
pub struct State {
    map: Rc<Map>,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }

    /// Raw lookup without kind checking.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.map.get(key)
    }

    pub fn get_string(&self, key: &str) -> Result<&str, StateError> {
        match self.lookup(key, ValueKind::Str)? {
            Value::Str(s) => Ok(s),
            _ => unreachable!("kind checked by lookup"),
        }
    }

    pub fn get_int(&self, key: &str) -> Result<i64, StateError> {
        match self.lookup(key, ValueKind::Int)? {
            Value::Int(i) => Ok(*i),
            _ => unreachable!("kind checked by lookup"),
        }
    }

    /// Fetch a stored object by its concrete type.
    ///
    /// Fails with `WrongKind` both when the value is not an object and when
    /// it is an object of a different type.
    pub fn get_object<T: Any>(&self, key: &str) -> Result<Rc<T>, StateError> {
        match self.lookup(key, ValueKind::Object)? {
            Value::Object(obj) => Rc::clone(obj)
                .downcast::<T>()
                .map_err(|_| StateError::WrongKind {
                    key: key.to_string(),
                    expected: ValueKind::Object,
                    found: ValueKind::Object,
                }),
            _ => unreachable!("kind checked by lookup"),
        }
    }

    pub fn put_string(&self, key: impl Into<String>, value: impl Into<String>) -> State {
        self.with(key.into(), Value::Str(value.into()))
    }

    pub fn put_int(&self, key: impl Into<String>, value: i64) -> State {
        self.with(key.into(), Value::Int(value))
    }

    pub fn put_object<T: Any>(&self, key: impl Into<String>, value: T) -> State {
        self.with(key.into(), Value::Object(Rc::new(value)))
    }

    /// Open a batch of writes over a private copy of this mapping.
    pub fn start_transaction(&self) -> Transaction {
        Transaction {
            map: (*self.map).clone(),
        }
    }

    fn with(&self, key: String, value: Value) -> State {
        let mut map = (*self.map).clone();
        map.insert(key, value);
        State { map: Rc::new(map) }
    }

    fn lookup(&self, key: &str, expected: ValueKind) -> Result<&Value, StateError> {
        let value = self.map.get(key).ok_or_else(|| StateError::Missing {
            key: key.to_string(),
        })?;
        if value.kind() != expected {
            return Err(StateError::WrongKind {
                key: key.to_string(),
                expected,
                found: value.kind(),
            });
        }
        Ok(value)
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.map.iter()).finish()
    }
}

/// Staging buffer for several writes that end up in a single new [`State`].
#[derive(Debug)]
#[must_use = "a transaction does nothing until commit() is called"]
pub struct Transaction {
    map: Map,
}

impl Transaction {
    pub fn put_string(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.map.insert(key.into(), Value::Str(value.into()));
        self
    }

    pub fn put_int(&mut self, key: impl Into<String>, value: i64) -> &mut Self {
        self.map.insert(key.into(), Value::Int(value));
        self
    }

    pub fn put_object<T: Any>(&mut self, key: impl Into<String>, value: T) -> &mut Self {
        self.map.insert(key.into(), Value::Object(Rc::new(value)));
        self
    }

    pub fn commit(&self) -> State {
        State {
            map: Rc::new(self.map.clone()),
        }
    }
}
