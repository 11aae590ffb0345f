mod common;

use common::{Animal, animal_factory, cat, dog, handle};
use jsync_core::{
    Aggregate, Fields, Handle, PolymorphicAssociative, PolymorphicSequence, SyncError, Syncable,
    document,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn summary(handle: &Handle<dyn Animal>) -> (&'static str, String, i32) {
    let animal = handle.borrow();
    (animal.kind(), animal.name().to_string(), animal.feature())
}

// ── PolymorphicSequence ──────────────────────────────────────────

#[test]
fn sequence_saves_type_and_data() {
    let mut animals = PolymorphicSequence::<dyn Animal>::new();
    animals.push(handle(dog("Rex", 11)), "Dog");
    animals.push(handle(cat("Tom", 22)), "Cat");

    let doc = document::to_document(&mut animals).unwrap();
    assert_eq!(
        doc,
        json!([
            {"type": "Dog", "data": {"name": "Rex", "dog_feature": 11}},
            {"type": "Cat", "data": {"name": "Tom", "cat_feature": 22}},
        ])
    );
    let keys: Vec<&str> = doc[0].as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["type", "data"]);
}

#[test]
fn sequence_reloads_concrete_kinds() {
    let mut animals = PolymorphicSequence::<dyn Animal>::new();
    animals.push(handle(dog("Rex", 11)), "Dog");
    animals.push(handle(cat("Tom", 22)), "Cat");
    animals.push(handle(dog("Fido", 33)), "Dog");
    let doc = document::to_document(&mut animals).unwrap();

    let mut loaded = PolymorphicSequence::with_factory(animal_factory);
    loaded.load(&doc).unwrap();

    let got: Vec<_> = loaded.iter().map(|e| summary(e.handle())).collect();
    assert_eq!(
        got,
        vec![
            ("Dog", "Rex".to_string(), 11),
            ("Cat", "Tom".to_string(), 22),
            ("Dog", "Fido".to_string(), 33),
        ]
    );
    let tags: Vec<&str> = loaded.iter().map(|e| e.discriminator()).collect();
    assert_eq!(tags, vec!["Dog", "Cat", "Dog"]);
}

#[test]
fn load_without_factory_is_missing_factory() {
    let mut animals = PolymorphicSequence::<dyn Animal>::new();
    let err = animals
        .load(&json!([{"type": "Dog", "data": {"name": "a", "dog_feature": 1}}]))
        .unwrap_err();
    assert!(matches!(err, SyncError::MissingFactory));
}

#[test]
fn missing_factory_is_reported_even_for_empty_documents() {
    let mut animals = PolymorphicSequence::<dyn Animal>::new();
    assert!(matches!(animals.load(&json!([])), Err(SyncError::MissingFactory)));
}

#[test]
fn unknown_discriminator_is_reported() {
    let mut animals = PolymorphicSequence::with_factory(animal_factory);
    let err = animals
        .load(&json!([{"type": "Bird", "data": {"name": "Tweety"}}]))
        .unwrap_err();
    assert!(matches!(err, SyncError::UnknownDiscriminator(ref d) if d == "Bird"));
}

#[test]
fn push_from_factory_requires_factory() {
    let mut animals = PolymorphicSequence::<dyn Animal>::new();
    assert!(matches!(
        animals.push_from_factory("Dog"),
        Err(SyncError::MissingFactory)
    ));
    assert!(animals.is_empty());
}

#[test]
fn push_from_factory_rejects_unknown_discriminator() {
    let mut animals = PolymorphicSequence::with_factory(animal_factory);
    assert!(matches!(
        animals.push_from_factory("Fish"),
        Err(SyncError::UnknownDiscriminator(ref d)) if d == "Fish"
    ));
    assert!(animals.is_empty());
}

#[test]
fn push_from_factory_returns_a_live_handle() {
    let mut animals = PolymorphicSequence::with_factory(animal_factory);
    let rex = animals.push_from_factory("Dog").unwrap();
    rex.borrow_mut().set_name("Rex");

    let doc = document::to_document(&mut animals).unwrap();
    assert_eq!(doc, json!([{"type": "Dog", "data": {"name": "Rex", "dog_feature": 0}}]));
}

#[test]
fn retained_handle_outlives_clear() {
    let mut animals = PolymorphicSequence::with_factory(animal_factory);
    let kept = animals.push_from_factory("Cat").unwrap();
    kept.borrow_mut().set_name("Kept");
    assert_eq!(Rc::strong_count(&kept), 2);

    animals.load(&json!([])).unwrap();
    assert!(animals.is_empty());
    assert_eq!(Rc::strong_count(&kept), 1);
    assert_eq!(kept.borrow().name(), "Kept");
}

#[test]
fn load_replaces_previous_entries() {
    let mut animals = PolymorphicSequence::with_factory(animal_factory);
    animals.push(handle(dog("Old", 1)), "Dog");
    animals.push(handle(dog("Older", 2)), "Dog");

    animals
        .load(&json!([{"type": "Cat", "data": {"name": "New", "cat_feature": 3}}]))
        .unwrap();
    assert_eq!(animals.len(), 1);
    assert_eq!(summary(animals.get(0).unwrap().handle()), ("Cat", "New".to_string(), 3));
}

#[test]
fn borrowed_handle_is_busy() {
    let mut animals = PolymorphicSequence::with_factory(animal_factory);
    let rex = animals.push_from_factory("Dog").unwrap();
    let _reading = rex.borrow();
    let err = document::to_document(&mut animals).unwrap_err();
    assert!(matches!(err, SyncError::HandleBusy(ref d) if d == "Dog"));
}

#[test]
fn malformed_entries_are_rejected() {
    let mut animals = PolymorphicSequence::with_factory(animal_factory);

    let err = animals.load(&json!([{"data": {}}])).unwrap_err();
    assert!(matches!(err, SyncError::MissingKey(ref k) if k == "type"));

    let err = animals.load(&json!([{"type": 5, "data": {}}])).unwrap_err();
    assert!(matches!(err, SyncError::TypeMismatch(_)));

    let err = animals.load(&json!([{"type": "Dog"}])).unwrap_err();
    assert!(matches!(err, SyncError::MissingKey(ref k) if k == "data"));

    let err = animals.load(&json!({"type": "Dog"})).unwrap_err();
    assert!(matches!(err, SyncError::TypeMismatch(_)));
}

#[test]
fn element_errors_propagate_unchanged() {
    let mut animals = PolymorphicSequence::with_factory(animal_factory);
    let err = animals
        .load(&json!([{"type": "Dog", "data": {"name": "Rex"}}]))
        .unwrap_err();
    assert!(matches!(err, SyncError::MissingKey(ref k) if k == "dog_feature"));
}

#[test]
fn factory_runs_once_per_loaded_entry() {
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let mut animals = PolymorphicSequence::with_factory(move |tag: &str| {
        counter.set(counter.get() + 1);
        animal_factory(tag)
    });

    animals
        .load(&json!([
            {"type": "Dog", "data": {"name": "a", "dog_feature": 1}},
            {"type": "Cat", "data": {"name": "b", "cat_feature": 2}},
        ]))
        .unwrap();
    assert_eq!(calls.get(), 2);
}

#[test]
fn factory_can_be_set_after_construction() {
    let mut animals = PolymorphicSequence::<dyn Animal>::new();
    assert!(!animals.has_factory());
    animals.set_factory(animal_factory);
    assert!(animals.has_factory());
    assert!(animals.push_from_factory("Dog").is_ok());
}

// ── PolymorphicAssociative ───────────────────────────────────────

#[test]
fn associative_saves_key_type_value() {
    let mut zoo = PolymorphicAssociative::<i32, dyn Animal>::new();
    zoo.insert(1, handle(cat("Tom", 2)), "Cat");
    zoo.insert(0, handle(dog("Rex", 1)), "Dog");

    let doc = document::to_document(&mut zoo).unwrap();
    assert_eq!(
        doc,
        json!([
            {"key": 0, "type": "Dog", "value": {"name": "Rex", "dog_feature": 1}},
            {"key": 1, "type": "Cat", "value": {"name": "Tom", "cat_feature": 2}},
        ])
    );
    let keys: Vec<&str> = doc[0].as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["key", "type", "value"]);
}

#[test]
fn associative_reloads_concrete_kinds_by_key() {
    let mut zoo = PolymorphicAssociative::<String, dyn Animal>::new();
    zoo.insert("cat".into(), handle(cat("Tom", 2)), "Cat");
    zoo.insert("dog".into(), handle(dog("Rex", 1)), "Dog");
    let doc = document::to_document(&mut zoo).unwrap();

    let mut loaded = PolymorphicAssociative::<String, dyn Animal>::with_factory(animal_factory);
    loaded.load(&doc).unwrap();
    assert_eq!(loaded.len(), 2);

    let dog_entry = loaded.get(&"dog".to_string()).unwrap();
    assert_eq!(dog_entry.discriminator(), "Dog");
    assert_eq!(summary(dog_entry.handle()), ("Dog", "Rex".to_string(), 1));

    let cat_entry = loaded.get(&"cat".to_string()).unwrap();
    assert_eq!(summary(cat_entry.handle()), ("Cat", "Tom".to_string(), 2));
}

#[test]
fn associative_duplicate_keys_keep_the_last_entry() {
    let mut zoo = PolymorphicAssociative::<i32, dyn Animal>::with_factory(animal_factory);
    zoo.load(&json!([
        {"key": 5, "type": "Dog", "value": {"name": "first", "dog_feature": 1}},
        {"key": 5, "type": "Cat", "value": {"name": "last", "cat_feature": 2}},
    ]))
    .unwrap();
    assert_eq!(zoo.len(), 1);
    assert_eq!(summary(zoo.get(&5).unwrap().handle()), ("Cat", "last".to_string(), 2));
}

#[test]
fn associative_failures_are_distinguishable() {
    let doc = json!([{"key": 1, "type": "Bird", "value": {"name": "x"}}]);

    let mut without = PolymorphicAssociative::<i32, dyn Animal>::new();
    assert!(matches!(without.load(&doc), Err(SyncError::MissingFactory)));

    let mut with = PolymorphicAssociative::<i32, dyn Animal>::with_factory(animal_factory);
    assert!(matches!(
        with.load(&doc),
        Err(SyncError::UnknownDiscriminator(ref d)) if d == "Bird"
    ));
}

#[test]
fn associative_push_from_factory_replaces_existing_key() {
    let mut zoo = PolymorphicAssociative::<i32, dyn Animal>::with_factory(animal_factory);
    let first = zoo.push_from_factory(1, "Dog").unwrap();
    let second = zoo.push_from_factory(1, "Cat").unwrap();
    assert_eq!(zoo.len(), 1);
    assert_eq!(Rc::strong_count(&first), 1);
    assert_eq!(Rc::strong_count(&second), 2);
    assert_eq!(zoo.get(&1).unwrap().discriminator(), "Cat");
}

#[test]
fn associative_factory_can_be_set_after_construction() {
    let mut zoo = PolymorphicAssociative::<i32, dyn Animal>::new();
    assert!(!zoo.has_factory());
    zoo.set_factory(animal_factory);
    assert!(zoo.has_factory());
    assert!(zoo.push_from_factory(3, "Cat").is_ok());
}

#[test]
fn associative_requires_the_key_node() {
    let mut zoo = PolymorphicAssociative::<i32, dyn Animal>::with_factory(animal_factory);
    let err = zoo
        .load(&json!([{"type": "Dog", "value": {"name": "a", "dog_feature": 1}}]))
        .unwrap_err();
    assert!(matches!(err, SyncError::MissingKey(ref k) if k == "key"));
}

// ── Polymorphic containers inside aggregates ─────────────────────

struct Shelter {
    keeper: String,
    animals: PolymorphicSequence<dyn Animal>,
}

impl Default for Shelter {
    fn default() -> Self {
        Self {
            keeper: String::new(),
            animals: PolymorphicSequence::with_factory(animal_factory),
        }
    }
}

impl Aggregate for Shelter {
    fn declare<'a>(&'a mut self, fields: &mut Fields<'a>) {
        fields
            .bind("keeper", &mut self.keeper)
            .bind("animals", &mut self.animals);
    }
}

#[test]
fn polymorphic_field_round_trips_through_aggregate() {
    let mut shelter = Shelter {
        keeper: "Sam".into(),
        ..Default::default()
    };
    shelter.animals.push(handle(dog("Rex", 4)), "Dog");
    shelter.animals.push(handle(cat("Tom", 5)), "Cat");

    let doc = document::to_document(&mut shelter).unwrap();
    let mut loaded = Shelter::default();
    loaded.load(&doc).unwrap();

    assert_eq!(loaded.keeper, "Sam");
    let got: Vec<_> = loaded.animals.iter().map(|e| summary(e.handle())).collect();
    assert_eq!(
        got,
        vec![("Dog", "Rex".to_string(), 4), ("Cat", "Tom".to_string(), 5)]
    );
}

#[test]
fn handles_can_be_shared_between_containers() {
    let shared: Handle<dyn Animal> = Rc::new(RefCell::new(dog("Both", 9)));
    let mut first = PolymorphicSequence::<dyn Animal>::new();
    let mut second = PolymorphicSequence::<dyn Animal>::new();
    first.push(Rc::clone(&shared), "Dog");
    second.push(Rc::clone(&shared), "Dog");

    shared.borrow_mut().set_name("Renamed");
    assert_eq!(
        document::to_document(&mut first).unwrap(),
        document::to_document(&mut second).unwrap()
    );
    drop(first);
    assert_eq!(Rc::strong_count(&shared), 2);
}
