//! Shared fixtures for jsync-core tests.

#![allow(dead_code)]

use jsync_core::{Aggregate, Fields, Handle, Syncable};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
    pub name: String,
}

impl Point {
    pub fn new(x: i32, y: i32, name: &str) -> Self {
        Self {
            x,
            y,
            name: name.to_string(),
        }
    }
}

impl Aggregate for Point {
    fn declare<'a>(&'a mut self, fields: &mut Fields<'a>) {
        fields
            .bind("x", &mut self.x)
            .bind("y", &mut self.y)
            .bind("name", &mut self.name);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Line {
    pub a: Point,
    pub b: Point,
}

impl Aggregate for Line {
    fn declare<'a>(&'a mut self, fields: &mut Fields<'a>) {
        fields.bind("a", &mut self.a).bind("b", &mut self.b);
    }
}

/// State shared by every animal kind.
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
    fn kind(&self) -> &'static str;
    fn name(&self) -> &str;
    fn feature(&self) -> i32;
    fn set_name(&mut self, name: &str);
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dog {
    pub base: AnimalBase,
    pub dog_feature: i32,
}

impl Aggregate for Dog {
    fn declare<'a>(&'a mut self, fields: &mut Fields<'a>) {
        self.base.declare(fields);
        fields.bind("dog_feature", &mut self.dog_feature);
    }
}

impl Animal for Dog {
    fn kind(&self) -> &'static str {
        "Dog"
    }

    fn name(&self) -> &str {
        &self.base.name
    }

    fn feature(&self) -> i32 {
        self.dog_feature
    }

    fn set_name(&mut self, name: &str) {
        self.base.name = name.to_string();
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cat {
    pub base: AnimalBase,
    pub cat_feature: i32,
}

impl Aggregate for Cat {
    fn declare<'a>(&'a mut self, fields: &mut Fields<'a>) {
        self.base.declare(fields);
        fields.bind("cat_feature", &mut self.cat_feature);
    }
}

impl Animal for Cat {
    fn kind(&self) -> &'static str {
        "Cat"
    }

    fn name(&self) -> &str {
        &self.base.name
    }

    fn feature(&self) -> i32 {
        self.cat_feature
    }

    fn set_name(&mut self, name: &str) {
        self.base.name = name.to_string();
    }
}

pub fn dog(name: &str, feature: i32) -> Dog {
    Dog {
        base: AnimalBase {
            name: name.to_string(),
        },
        dog_feature: feature,
    }
}

pub fn cat(name: &str, feature: i32) -> Cat {
    Cat {
        base: AnimalBase {
            name: name.to_string(),
        },
        cat_feature: feature,
    }
}

/// Builds Dogs and Cats; anything else is unknown.
pub fn animal_factory(discriminator: &str) -> Option<Handle<dyn Animal>> {
    match discriminator {
        "Dog" => Some(Rc::new(RefCell::new(Dog::default()))),
        "Cat" => Some(Rc::new(RefCell::new(Cat::default()))),
        _ => None,
    }
}

pub fn handle<A: Animal + 'static>(animal: A) -> Handle<dyn Animal> {
    Rc::new(RefCell::new(animal))
}
