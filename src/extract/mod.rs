pub mod reader;

pub use reader::{load_source_file, SourceFile, SourceKind};
