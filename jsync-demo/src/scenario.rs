//! Save-to-file, load-into-fresh-instance runs for each demo object graph.

use crate::animals::{self, Animal, CAT, DOG};
use crate::shapes::{Line, Point};
use anyhow::{Context, Result};
use jsync_core::{DocumentFormat, PolymorphicAssociative, PolymorphicSequence, Syncable, document};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// What a scenario saved and what came back from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub saved: Vec<String>,
    pub loaded: Vec<String>,
}

impl Outcome {
    pub fn matches(&self) -> bool {
        self.saved == self.loaded
    }
}

/// Saves `root` and writes the rendered document to `path`.
pub fn write_document<S: Syncable + ?Sized>(
    path: &Path,
    root: &mut S,
    format: &DocumentFormat,
) -> Result<()> {
    let text = document::to_string(root, format).context("failed to save document")?;
    fs::write(path, &text).with_context(|| format!("failed to write {}", path.display()))?;
    debug!(path = %path.display(), bytes = text.len(), "document written");
    Ok(())
}

/// Reads `path` and loads `root` from it.
pub fn read_document<S: Syncable + ?Sized>(path: &Path, root: &mut S) -> Result<()> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    document::from_slice(root, &bytes)
        .with_context(|| format!("failed to load {}", path.display()))?;
    debug!(path = %path.display(), bytes = bytes.len(), "document loaded");
    Ok(())
}

/// A line between two points.
pub fn run_line(path: &Path, format: &DocumentFormat) -> Result<Outcome> {
    let mut line = Line::new(Point::new(100, 200), Point::new(300, 400));
    info!("Saving line: {}", line);
    write_document(path, &mut line, format)?;

    let mut loaded = Line::default();
    read_document(path, &mut loaded)?;
    info!("Loaded line: {}", loaded);

    Ok(Outcome {
        saved: vec![line.to_string()],
        loaded: vec![loaded.to_string()],
    })
}

/// A polymorphic list of dogs and cats.
pub fn run_animals(path: &Path, format: &DocumentFormat) -> Result<Outcome> {
    let mut pets = PolymorphicSequence::with_factory(animals::factory);
    for (kind, name) in [(DOG, "Rex"), (CAT, "Tom"), (DOG, "Fido")] {
        pets.push_from_factory(kind)?.borrow_mut().set_name(name);
    }
    let saved = describe_all(pets.iter().map(|e| e.handle()));
    info!(pets = ?saved, "Saving animals");
    write_document(path, &mut pets, format)?;

    let mut loaded = PolymorphicSequence::with_factory(animals::factory);
    read_document(path, &mut loaded)?;
    let loaded = describe_all(loaded.iter().map(|e| e.handle()));
    info!(pets = ?loaded, "Loaded animals");

    Ok(Outcome { saved, loaded })
}

/// A polymorphic map of enclosure number to animal.
pub fn run_zoo(path: &Path, format: &DocumentFormat) -> Result<Outcome> {
    let mut zoo = PolymorphicAssociative::<u32, dyn Animal>::with_factory(animals::factory);
    zoo.push_from_factory(0, DOG)?.borrow_mut().set_name("Rex");
    zoo.push_from_factory(1, CAT)?.borrow_mut().set_name("Tom");
    let saved = describe_keyed(&zoo);
    info!(zoo = ?saved, "Saving zoo");
    write_document(path, &mut zoo, format)?;

    let mut loaded = PolymorphicAssociative::<u32, dyn Animal>::with_factory(animals::factory);
    read_document(path, &mut loaded)?;
    let loaded = describe_keyed(&loaded);
    info!(zoo = ?loaded, "Loaded zoo");

    Ok(Outcome { saved, loaded })
}

fn describe_all<'a>(
    handles: impl Iterator<Item = &'a jsync_core::Handle<dyn Animal>>,
) -> Vec<String> {
    handles.map(|h| h.borrow().describe()).collect()
}

fn describe_keyed(zoo: &PolymorphicAssociative<u32, dyn Animal>) -> Vec<String> {
    zoo.iter()
        .map(|(id, entry)| format!("id {id}: {}", entry.handle().borrow().describe()))
        .collect()
}
