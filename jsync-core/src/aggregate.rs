//! The save/load capability and the declare → dispatch → hook lifecycle.

use crate::binding::Fields;
use crate::document;
use crate::error::SyncResult;
use serde_json::Value;
use tracing::debug;

/// Anything that can write itself into a document node and read itself back.
///
/// Aggregates get this through [`Aggregate`]; containers implement it
/// directly. A field whose type is `Syncable` is bound with the delegate
/// strategy.
pub trait Syncable {
    /// Replaces `node` with this value's document shape.
    fn save(&mut self, node: &mut Value) -> SyncResult<()>;

    /// Populates this value in place from `node`.
    fn load(&mut self, node: &Value) -> SyncResult<()>;
}

/// An object that exposes a named set of fields as a document object.
///
/// `declare` runs at the start of every save and load and binds the fields
/// of the instance being operated on. Nothing is cached between calls, so
/// the declared set may depend on the instance's current state, and a type
/// that embeds a base aggregate extends it by calling the base's `declare`
/// before binding its own fields:
///
/// ```
/// use jsync_core::{Aggregate, Fields};
///
/// #[derive(Default)]
/// struct Named {
///     name: String,
/// }
///
/// impl Aggregate for Named {
///     fn declare<'a>(&'a mut self, fields: &mut Fields<'a>) {
///         fields.bind("name", &mut self.name);
///     }
/// }
///
/// #[derive(Default)]
/// struct Dog {
///     base: Named,
///     bark: u32,
/// }
///
/// impl Aggregate for Dog {
///     fn declare<'a>(&'a mut self, fields: &mut Fields<'a>) {
///         self.base.declare(fields);
///         fields.bind("bark", &mut self.bark);
///     }
/// }
/// ```
pub trait Aggregate {
    /// Binds the fields to save or load, in document order.
    fn declare<'a>(&'a mut self, fields: &mut Fields<'a>);

    /// Called after every field has been saved.
    fn after_save(&mut self) {}

    /// Called after every field has been loaded.
    fn after_load(&mut self) {}

    /// Derived setup that needs fully loaded state. Runs after `after_load`.
    fn initialize(&mut self) -> SyncResult<()> {
        Ok(())
    }
}

impl<T: Aggregate> Syncable for T {
    fn save(&mut self, node: &mut Value) -> SyncResult<()> {
        let object = {
            let mut fields = Fields::new();
            self.declare(&mut fields);
            debug!(
                aggregate = std::any::type_name::<T>(),
                fields = fields.len(),
                "saving aggregate"
            );
            fields.save_all()?
        };
        *node = Value::Object(object);
        self.after_save();
        Ok(())
    }

    fn load(&mut self, node: &Value) -> SyncResult<()> {
        let object = document::expect_object(node)?;
        {
            let mut fields = Fields::new();
            self.declare(&mut fields);
            debug!(
                aggregate = std::any::type_name::<T>(),
                fields = fields.len(),
                "loading aggregate"
            );
            fields.load_all(object)?;
        }
        self.after_load();
        self.initialize()
    }
}
