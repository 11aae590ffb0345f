//! A small polymorphic hierarchy: every animal shares a name, each kind
//! adds one feature of its own.

use jsync_core::{Aggregate, Fields, Handle, Syncable};
use std::cell::RefCell;
use std::rc::Rc;

pub const DOG: &str = "Dog";
pub const CAT: &str = "Cat";

#[derive(Debug, Clone, PartialEq)]
pub struct AnimalBase {
    pub name: String,
}

impl Default for AnimalBase {
    fn default() -> Self {
        Self {
            name: "unnamed".to_string(),
        }
    }
}

impl Aggregate for AnimalBase {
    fn declare<'a>(&'a mut self, fields: &mut Fields<'a>) {
        fields.bind("name", &mut self.name);
    }
}

pub trait Animal: Syncable {
    /// The discriminator this kind is saved under.
    fn kind(&self) -> &'static str;
    fn name(&self) -> &str;
    fn set_name(&mut self, name: &str);
    fn describe(&self) -> String {
        format!("{}({})", self.name(), self.kind())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dog {
    pub base: AnimalBase,
    pub tricks: u32,
}

impl Aggregate for Dog {
    fn declare<'a>(&'a mut self, fields: &mut Fields<'a>) {
        self.base.declare(fields);
        fields.bind("tricks", &mut self.tricks);
    }
}

impl Animal for Dog {
    fn kind(&self) -> &'static str {
        DOG
    }

    fn name(&self) -> &str {
        &self.base.name
    }

    fn set_name(&mut self, name: &str) {
        self.base.name = name.to_string();
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cat {
    pub base: AnimalBase,
    pub lives: u8,
}

impl Aggregate for Cat {
    fn declare<'a>(&'a mut self, fields: &mut Fields<'a>) {
        self.base.declare(fields);
        fields.bind("lives", &mut self.lives);
    }
}

impl Animal for Cat {
    fn kind(&self) -> &'static str {
        CAT
    }

    fn name(&self) -> &str {
        &self.base.name
    }

    fn set_name(&mut self, name: &str) {
        self.base.name = name.to_string();
    }
}

/// Builds an animal for a saved discriminator.
pub fn factory(discriminator: &str) -> Option<Handle<dyn Animal>> {
    match discriminator {
        DOG => Some(Rc::new(RefCell::new(Dog::default()))),
        CAT => Some(Rc::new(RefCell::new(Cat::default()))),
        _ => None,
    }
}
