//! Binary entry point. All command handling lives in the library so the
//! end-to-end tests drive the same code path as the installed binary.

fn main() {
    if let Err(err) = tag_index::entry() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
