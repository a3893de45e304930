use std::{fmt, path::PathBuf};

/// Snapshot of one directory level: its absolute path and its entries
/// partitioned into subdirectories and files.
///
/// The rendered form is the success reply sent after every command:
///
/// ```text
/// Current Directory: /srv:
/// |
/// -- docs
/// -- notes.txt
/// ```
///
/// Subdirectories always precede files. The `-- ` section marks are
/// emitted even for an empty partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirListing {
    pub path: PathBuf,
    pub dirs: Vec<String>,
    pub files: Vec<String>,
}

impl DirListing {
    pub fn new(path: PathBuf, dirs: Vec<String>, files: Vec<String>) -> Self {
        Self { path, dirs, files }
    }
}

fn section(f: &mut fmt::Formatter<'_>, names: &[String]) -> fmt::Result {
    f.write_str("\n-- ")?;
    f.write_str(&names.join("\n-- "))
}

impl fmt::Display for DirListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Current Directory: {}:\n|", self.path.display())?;
        section(f, &self.dirs)?;
        section(f, &self.files)
    }
}
