pub mod design;
pub mod verify;

use crate::error::Result;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Opens `path` for writing, or stdout when no path is given.
pub(crate) fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    let writer: Box<dyn Write> = match path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    };
    Ok(writer)
}
