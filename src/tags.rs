use crate::note::Note;
use crate::render::RenderError;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone)]
pub struct Tag {
    pub name: String,
    pub notes: Vec<Arc<Note>>,
}

/// Per-run tag aggregation. `tag_list` is the snapshot cached by
/// `normalize_and_sort` and is stale until that refresh has run.
#[derive(Default)]
pub struct TagManager {
    tags: RwLock<HashMap<String, Tag>>,
    tag_list: RwLock<Vec<Tag>>,
}

impl TagManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_tags_from_note(&self, note: &Arc<Note>) {
        for name in &note.tags {
            let mut tags = self.tags.write().unwrap();
            match tags.get_mut(name) {
                Some(tag) => tag.notes.push(Arc::clone(note)),
                None => {
                    tags.insert(
                        name.clone(),
                        Tag {
                            name: name.clone(),
                            notes: vec![Arc::clone(note)],
                        },
                    );
                }
            }
        }
    }

    /// Colliding buckets merge in lexicographic order of their original
    /// names, independent of insertion interleaving.
    pub fn normalize_and_sort(&self) -> Vec<Tag> {
        let mut tags = self.tags.write().unwrap();
        let mut names: Vec<String> = tags.keys().cloned().collect();
        names.sort();

        let mut normalized: HashMap<String, Tag> = HashMap::new();
        for name in names {
            let Some(bucket) = tags.remove(&name) else {
                continue;
            };
            let title = title_case(&name);
            match normalized.get_mut(&title) {
                Some(existing) => existing.notes.extend(bucket.notes),
                None => {
                    normalized.insert(
                        title.clone(),
                        Tag {
                            name: title,
                            notes: bucket.notes,
                        },
                    );
                }
            }
        }
        *tags = normalized;

        let mut list: Vec<Tag> = tags.values().cloned().collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        *self.tag_list.write().unwrap() = list.clone();
        list
    }

    pub fn sorted_tags(&self) -> Vec<Tag> {
        self.tag_list.read().unwrap().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.tag_list.read().unwrap().is_empty()
    }

    pub fn write_all_indexes<F>(&self, mut write_fn: F) -> Result<(), RenderError>
    where
        F: FnMut(&Tag) -> Result<(), RenderError>,
    {
        // Clone the snapshot so no lock is held across rendering or I/O.
        let snapshot = self.tag_list.read().unwrap().clone();
        for tag in &snapshot {
            write_fn(tag)?;
        }
        Ok(())
    }
}

/// Uppercase the first character, lowercase the rest.
pub fn title_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => {
            let mut out: String = first.to_uppercase().collect();
            out.push_str(&chars.as_str().to_lowercase());
            out
        }
        None => String::new(),
    }
}
