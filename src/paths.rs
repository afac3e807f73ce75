//! Typed paths into a backend's output layout.
//!
//! Every backend writes beneath `<root>/<backend dir>/`: one directory per
//! project plus a sibling `<name>.manifest` consumed by the install step.
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct BackendPaths {
    root: PathBuf,
    dir_name: &'static str,
}

impl BackendPaths {
    pub fn new(root: PathBuf, dir_name: &'static str) -> Self {
        Self { root, dir_name }
    }

    /// Return the `<root>/<backend dir>` path.
    pub fn backend_dir(&self) -> PathBuf {
        self.root.join(self.dir_name)
    }

    /// Return the `<backend dir>/<name>` project directory path.
    pub fn project_dir(&self, name: &str) -> PathBuf {
        self.backend_dir().join(name)
    }

    /// Return the `<backend dir>/<name>.manifest` path.
    pub fn manifest_path(&self, name: &str) -> PathBuf {
        self.backend_dir().join(format!("{name}.manifest"))
    }
}
