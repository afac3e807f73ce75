//! Shared test infrastructure for integration tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A scratch source tree plus object directory driven through `ideproj`.
pub struct TestTree {
    pub temp: TempDir,
}

impl TestTree {
    pub fn new() -> Self {
        let temp = tempfile::tempdir().expect("create temp dir");
        fs::create_dir_all(temp.path().join("src")).expect("create src");
        fs::create_dir_all(temp.path().join("obj")).expect("create obj");
        Self { temp }
    }

    pub fn topsrcdir(&self) -> PathBuf {
        self.temp.path().join("src")
    }

    pub fn topobjdir(&self) -> PathBuf {
        self.temp.path().join("obj")
    }

    pub fn config_path(&self) -> PathBuf {
        self.temp.path().join("build.json")
    }

    pub fn objects_path(&self) -> PathBuf {
        self.temp.path().join("objects.json")
    }

    pub fn write_file(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.temp.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent directory");
        }
        fs::write(&path, contents.as_bytes()).expect("write file");
        path
    }

    pub fn write_config(&self, extra: Value) {
        let mut config = json!({
            "schema_version": 1,
            "topsrcdir": self.topsrcdir(),
            "topobjdir": self.topobjdir(),
            "android_target_sdk": "23",
        });
        if let (Some(config), Some(extra)) = (config.as_object_mut(), extra.as_object()) {
            for (key, value) in extra {
                config.insert(key.clone(), value.clone());
            }
        }
        fs::write(
            self.config_path(),
            serde_json::to_vec_pretty(&config).expect("serialize config"),
        )
        .expect("write config");
    }

    /// Write one `android_project` object per description, plus an unrelated
    /// object the backends must skip.
    pub fn write_projects(&self, projects: &[Value]) {
        let mut objects = vec![json!({"kind": "jar_manifest"})];
        for project in projects {
            objects.push(json!({
                "kind": "android_project",
                "srcdir": self.topsrcdir().join("mobile/android"),
                "objdir": self.topobjdir().join("mobile/android"),
                "project": project,
            }));
        }
        fs::write(
            self.objects_path(),
            serde_json::to_vec_pretty(&objects).expect("serialize objects"),
        )
        .expect("write objects");
    }

    pub fn generate(&self, backend: &str, extra_args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_ideproj"))
            .arg("generate")
            .arg("--backend")
            .arg(backend)
            .arg("--config")
            .arg(self.config_path())
            .arg("--objects")
            .arg(self.objects_path())
            .args(extra_args)
            .output()
            .expect("run ideproj generate")
    }

    pub fn generate_ok(&self, backend: &str) -> Value {
        let output = self.generate(backend, &["--json"]);
        assert!(
            output.status.success(),
            "generate failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("parse summary JSON")
    }

    pub fn project_dir(&self, backend_dir: &str, name: &str) -> PathBuf {
        self.topobjdir().join(backend_dir).join(name)
    }
}

/// Every file under `root` with its contents, keyed by relative path.
pub fn snapshot(root: &Path) -> Vec<(String, Vec<u8>)> {
    let mut files = Vec::new();
    collect(root, root, &mut files);
    files.sort();
    files
}

fn collect(root: &Path, dir: &Path, files: &mut Vec<(String, Vec<u8>)>) {
    for entry in fs::read_dir(dir).expect("read dir") {
        let path = entry.expect("dir entry").path();
        if path.is_dir() {
            collect(root, &path, files);
        } else {
            let rel = path
                .strip_prefix(root)
                .expect("strip root")
                .to_string_lossy()
                .to_string();
            files.push((rel, fs::read(&path).expect("read file")));
        }
    }
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|err| panic!("read {}: {err}", path.display()))
}
