use crate::note::CREATED_FMT;
use crate::tags::Tag;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const MAIN_INDEX_FILE: &str = "1. Index.md";

#[derive(Debug, Error)]
#[error("unable to write index {}: {}", .path.display(), .source)]
pub struct RenderError {
    pub path: PathBuf,
    pub source: io::Error,
}

pub fn render_tag_index(tag: &Tag) -> String {
    let mut notes = tag.notes.clone();
    // Stable sort; equal timestamps keep their bucket order.
    notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let mut out = format!("# {}\n\n", tag.name);
    for note in &notes {
        out.push_str(&format!(
            "- [[{}]] (created {})\n",
            note.display_name,
            note.created_at.format(CREATED_FMT)
        ));
    }
    out
}

pub fn render_main_index(tags: &[Tag]) -> String {
    let mut out = String::from("# Index\n\n");
    for tag in tags {
        out.push_str(&format!("- [[{}]]\n", tag.name));
    }
    out
}

pub fn write_tag_index(tag: &Tag, dir: &Path) -> Result<(), RenderError> {
    let path = dir.join(format!("{}.md", tag.name));
    fs::write(&path, render_tag_index(tag)).map_err(|source| RenderError { path, source })
}

pub fn write_main_index(tags: &[Tag], dir: &Path) -> Result<(), RenderError> {
    let path = dir.join(MAIN_INDEX_FILE);
    fs::write(&path, render_main_index(tags)).map_err(|source| RenderError { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::Note;
    use chrono::NaiveDateTime;
    use std::sync::Arc;

    fn note(name: &str, created: &str) -> Arc<Note> {
        Arc::new(Note {
            file_name: format!("{name}.md"),
            display_name: name.to_string(),
            tags: Vec::new(),
            created_at: NaiveDateTime::parse_from_str(created, CREATED_FMT).unwrap(),
        })
    }

    #[test]
    fn tag_index_lists_notes_newest_first() {
        let tag = Tag {
            name: "Go".to_string(),
            notes: vec![
                note("a", "2024-01-01 09:00"),
                note("b", "2024-02-01 09:00"),
            ],
        };
        assert_eq!(
            render_tag_index(&tag),
            "# Go\n\n\
             - [[b]] (created 2024-02-01 09:00)\n\
             - [[a]] (created 2024-01-01 09:00)\n"
        );
    }

    #[test]
    fn equal_timestamps_keep_bucket_order() {
        let tag = Tag {
            name: "Go".to_string(),
            notes: vec![
                note("second", "2024-01-01 09:00"),
                note("first", "2024-01-01 09:00"),
            ],
        };
        let out = render_tag_index(&tag);
        let second = out.find("[[second]]").unwrap();
        let first = out.find("[[first]]").unwrap();
        assert!(second < first);
    }

    #[test]
    fn main_index_lists_tags_in_given_order() {
        let tags = vec![
            Tag { name: "Cli".to_string(), notes: Vec::new() },
            Tag { name: "Go".to_string(), notes: Vec::new() },
        ];
        assert_eq!(render_main_index(&tags), "# Index\n\n- [[Cli]]\n- [[Go]]\n");
    }

    #[test]
    fn rendering_is_deterministic() {
        let tag = Tag {
            name: "Go".to_string(),
            notes: vec![
                note("a", "2024-01-01 09:00"),
                note("b", "2024-01-01 09:00"),
            ],
        };
        assert_eq!(render_tag_index(&tag), render_tag_index(&tag));
    }

    #[test]
    fn empty_bucket_renders_heading_only() {
        let tag = Tag { name: "Go".to_string(), notes: Vec::new() };
        assert_eq!(render_tag_index(&tag), "# Go\n\n");
    }
}
