use rayon::prelude::*;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use yansi::Paint;

pub mod note;
pub mod render;
pub mod tags;

pub use note::{ExtractError, Note};
pub use render::RenderError;
pub use tags::{Tag, TagManager};

pub const DEFAULT_INDEX_DIR: &str = "Index";

#[derive(Debug, Error)]
pub enum IndexError {
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("notes directory {} is not a directory", .path.display())]
    NotesDir { path: PathBuf },
    #[error("unable to read notes directory {}: {}", .path.display(), .source)]
    ReadDir { path: PathBuf, source: io::Error },
    #[error("unable to create index directory {}: {}", .path.display(), .source)]
    IndexDir { path: PathBuf, source: io::Error },
}

pub fn entry() -> Result<(), Box<dyn std::error::Error>> {
    let mut args: Vec<String> = env::args().skip(1).collect();

    // Bare `tag_index` (or flags only) runs a full index build.
    let cmd = match args.first() {
        Some(first) if !first.starts_with('-') => args.remove(0),
        _ => "index".to_string(),
    };

    match cmd.as_str() {
        "index" => run_index(args)?,
        "tags" => run_tags(args)?,
        "path" => {
            let opts = Options::parse(args)?;
            println!("{}", opts.notes_dir()?.display());
        }
        "help" => print_help(),
        other => {
            eprintln!("Unknown command: {other}");
            print_help();
        }
    }

    Ok(())
}

fn print_help() {
    println!(
        "\
Tag Index CLI
Usage:
  tag_index [index] [-d|--dir <path>] [--out <name>]
                                  Rebuild every tag index plus the master index
  tag_index tags [-d|--dir <path>]
                                  List tags with note counts; writes nothing
  tag_index path [-d|--dir <path>]
                                  Show the resolved notes directory
  tag_index help                  Show this message

Environment:
  TAG_INDEX_DIR                   Override the notes directory (default: current directory)
  NO_COLOR                        Disable colored output
"
    );
}

struct Options {
    dir: Option<PathBuf>,
    out: String,
}

impl Options {
    fn parse(args: Vec<String>) -> Result<Options, Box<dyn std::error::Error>> {
        let mut opts = Options {
            dir: None,
            out: DEFAULT_INDEX_DIR.to_string(),
        };
        let mut iter = args.into_iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "-d" | "--dir" => match iter.next() {
                    Some(v) => opts.dir = Some(PathBuf::from(v)),
                    None => return Err("Provide a path after -d/--dir".into()),
                },
                "--out" => match iter.next() {
                    Some(v) => opts.out = v,
                    None => return Err("Provide a directory name after --out".into()),
                },
                other => {
                    return Err(format!("Unknown flag: {other}").into());
                }
            }
        }
        Ok(opts)
    }

    fn notes_dir(&self) -> Result<PathBuf, IndexError> {
        let dir = match &self.dir {
            Some(d) => d.clone(),
            None => match env::var("TAG_INDEX_DIR") {
                Ok(d) => PathBuf::from(d),
                Err(_) => PathBuf::from("."),
            },
        };
        if !dir.is_dir() {
            return Err(IndexError::NotesDir { path: dir });
        }
        Ok(dir)
    }
}

fn run_index(args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let opts = Options::parse(args)?;
    let (scanned, sorted, out_dir) = build_indexes(&opts)?;

    let use_color = env::var("NO_COLOR").is_err();
    println!(
        "Indexed {} notes across {} tags into {}",
        paint_count(&scanned.to_string(), use_color),
        paint_count(&sorted.len().to_string(), use_color),
        out_dir.display()
    );
    Ok(())
}

fn build_indexes(opts: &Options) -> Result<(usize, Vec<Tag>, PathBuf), IndexError> {
    let dir = opts.notes_dir()?;
    let out_dir = dir.join(&opts.out);
    ensure_dir(&out_dir).map_err(|source| IndexError::IndexDir {
        path: out_dir.clone(),
        source,
    })?;

    let (scanned, manager) = aggregate(&dir)?;

    // Insertion is complete once `aggregate` returns; only then is the
    // snapshot normalized and handed to the renderer. The master index
    // is written last.
    let sorted = manager.normalize_and_sort();
    manager.write_all_indexes(|tag| render::write_tag_index(tag, &out_dir))?;
    render::write_main_index(&sorted, &out_dir)?;
    Ok((scanned, sorted, out_dir))
}

fn run_tags(args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let opts = Options::parse(args)?;
    let dir = opts.notes_dir()?;

    let (_, manager) = aggregate(&dir)?;
    let sorted = manager.normalize_and_sort();
    if manager.is_empty() {
        println!("No tags found.");
        return Ok(());
    }

    let use_color = env::var("NO_COLOR").is_err();
    for tag in &sorted {
        let newest = tag
            .notes
            .iter()
            .map(|n| n.created_at)
            .max()
            .map(|ts| ts.format(note::CREATED_FMT).to_string())
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "{:20} | notes {:4} | newest {}",
            tag.name,
            tag.notes.len(),
            paint_timestamp(&newest, use_color)
        );
    }
    Ok(())
}

fn aggregate(dir: &Path) -> Result<(usize, TagManager), IndexError> {
    let files = list_note_files(dir).map_err(|source| IndexError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let manager = TagManager::new();
    scan_notes(&files, &manager)?;
    Ok((files.len(), manager))
}

fn scan_notes(files: &[PathBuf], manager: &TagManager) -> Result<(), ExtractError> {
    let notes = files
        .par_iter()
        .map(|path| Note::from_path(path).map(Arc::new))
        .collect::<Result<Vec<_>, _>>()?;
    // Insert in file order; render-time tie-breaks follow insertion order.
    for note in &notes {
        manager.add_tags_from_note(note);
    }
    Ok(())
}

fn ensure_dir(path: &Path) -> io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

fn list_note_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file()
            && entry.path().extension().and_then(|s| s.to_str()) == Some("md")
        {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

fn paint_count(text: &str, use_color: bool) -> String {
    if use_color {
        Paint::rgb(text, 148, 226, 213).bold().to_string()
    } else {
        text.to_string()
    }
}

fn paint_timestamp(ts: &str, use_color: bool) -> String {
    if use_color {
        Paint::rgb(ts, 137, 180, 250).to_string()
    } else {
        ts.to_string()
    }
}
