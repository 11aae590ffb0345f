//! Field bindings and scalar/delegate dispatch.
//!
//! A [`FieldBinding`] pairs a name with a mutable borrow of one live field.
//! The strategy is fixed when the field is bound: types that carry their own
//! save/load (anything [`Syncable`]) delegate to it, everything else is a
//! scalar transcoded directly through serde.

use crate::aggregate::Syncable;
use crate::error::{SyncError, SyncResult};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::trace;

/// How a bound field is written to and read from its node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// The value is written as a native scalar node.
    Scalar,
    /// The field's own `save`/`load` produces and consumes the node.
    Delegate,
}

/// A value that can sit behind a [`FieldBinding`].
///
/// Implemented for the primitive scalars and `String`, and for every
/// [`Syncable`] type (aggregates and containers).
pub trait Field {
    fn strategy(&self) -> Strategy;

    /// Writes the current value into `node`, replacing whatever was there.
    fn save_field(&mut self, node: &mut Value) -> SyncResult<()>;

    /// Reads `node` into the value in place.
    fn load_field(&mut self, node: &Value) -> SyncResult<()>;
}

impl<T: Syncable> Field for T {
    fn strategy(&self) -> Strategy {
        Strategy::Delegate
    }

    fn save_field(&mut self, node: &mut Value) -> SyncResult<()> {
        self.save(node)
    }

    fn load_field(&mut self, node: &Value) -> SyncResult<()> {
        self.load(node)
    }
}

macro_rules! scalar_field {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Field for $ty {
                fn strategy(&self) -> Strategy {
                    Strategy::Scalar
                }

                fn save_field(&mut self, node: &mut Value) -> SyncResult<()> {
                    *node = serde_json::to_value(&*self)
                        .map_err(|e| SyncError::TypeMismatch(e.to_string()))?;
                    Ok(())
                }

                fn load_field(&mut self, node: &Value) -> SyncResult<()> {
                    *self = <$ty>::deserialize(node)
                        .map_err(|e| SyncError::TypeMismatch(e.to_string()))?;
                    Ok(())
                }
            }
        )*
    };
}

scalar_field!(
    bool, char, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, String,
);

macro_rules! float_field {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Field for $ty {
                fn strategy(&self) -> Strategy {
                    Strategy::Scalar
                }

                /// NaN and infinities have no JSON number form and are rejected.
                fn save_field(&mut self, node: &mut Value) -> SyncResult<()> {
                    let number = serde_json::Number::from_f64(f64::from(*self)).ok_or_else(|| {
                        SyncError::TypeMismatch(format!("non-finite {} {}", stringify!($ty), self))
                    })?;
                    *node = Value::Number(number);
                    Ok(())
                }

                fn load_field(&mut self, node: &Value) -> SyncResult<()> {
                    *self = <$ty>::deserialize(node)
                        .map_err(|e| SyncError::TypeMismatch(e.to_string()))?;
                    Ok(())
                }
            }
        )*
    };
}

float_field!(f32, f64);

/// A named association between one live field and its strategy.
///
/// Only valid for the save or load call that created it.
pub struct FieldBinding<'a> {
    name: String,
    strategy: Strategy,
    field: &'a mut dyn Field,
}

impl<'a> FieldBinding<'a> {
    /// Binds `field` under `name`, fixing its strategy.
    pub fn new<F: Field + 'a>(name: impl Into<String>, field: &'a mut F) -> Self {
        let strategy = field.strategy();
        Self {
            name: name.into(),
            strategy,
            field,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Writes the bound field into `node`.
    pub fn save(&mut self, node: &mut Value) -> SyncResult<()> {
        trace!(field = %self.name, strategy = ?self.strategy, "saving field");
        self.field.save_field(node)
    }

    /// Reads the bound field from `node`.
    pub fn load(&mut self, node: &Value) -> SyncResult<()> {
        trace!(field = %self.name, strategy = ?self.strategy, "loading field");
        self.field.load_field(node)
    }
}

impl std::fmt::Debug for FieldBinding<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldBinding")
            .field("name", &self.name)
            .field("strategy", &self.strategy)
            .finish()
    }
}

/// The ordered binding list an aggregate fills in `declare`.
///
/// Built fresh for every save or load call and dropped when the call's
/// dispatch finishes.
#[derive(Debug, Default)]
pub struct Fields<'a> {
    bindings: Vec<FieldBinding<'a>>,
    duplicate: Option<String>,
}

impl<'a> Fields<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `field` under `name`.
    ///
    /// Names must be unique within one declaration; a repeated name makes
    /// the enclosing save or load fail with `DuplicateField`.
    pub fn bind<F: Field + 'a>(&mut self, name: impl Into<String>, field: &'a mut F) -> &mut Self {
        let binding = FieldBinding::new(name, field);
        if self.duplicate.is_none() && self.bindings.iter().any(|b| b.name == binding.name) {
            self.duplicate = Some(binding.name.clone());
        }
        self.bindings.push(binding);
        self
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Binding names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.iter().map(FieldBinding::name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldBinding<'a>> {
        self.bindings.iter()
    }

    fn check_unique(&self) -> SyncResult<()> {
        match &self.duplicate {
            Some(name) => Err(SyncError::DuplicateField(name.clone())),
            None => Ok(()),
        }
    }

    /// Saves every binding, in registration order, into a fresh object.
    pub(crate) fn save_all(&mut self) -> SyncResult<Map<String, Value>> {
        self.check_unique()?;
        let mut object = Map::new();
        for binding in &mut self.bindings {
            let mut child = Value::Null;
            binding.save(&mut child)?;
            object.insert(binding.name.clone(), child);
        }
        Ok(object)
    }

    /// Loads every binding, in registration order, from `object`.
    ///
    /// A declared name absent from `object` is a `MissingKey` failure.
    /// Keys nobody declared are ignored.
    pub(crate) fn load_all(&mut self, object: &Map<String, Value>) -> SyncResult<()> {
        self.check_unique()?;
        for binding in &mut self.bindings {
            let child = object
                .get(&binding.name)
                .ok_or_else(|| SyncError::MissingKey(binding.name.clone()))?;
            binding.load(child)?;
        }
        Ok(())
    }
}
