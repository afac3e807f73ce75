mod common;

use common::{read, TestTree};
use serde_json::json;
use std::path::Path;
use std::process::{Command, Output};

fn install_with(manifest: &Path, dest: &Path, extra_args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ideproj"))
        .arg("install")
        .arg("--manifest")
        .arg(manifest)
        .arg("--dest")
        .arg(dest)
        .args(extra_args)
        .output()
        .expect("run ideproj install")
}

fn install(manifest: &Path, dest: &Path) -> Output {
    install_with(manifest, dest, &[])
}

fn populate_sources(tree: &TestTree) {
    tree.write_file(
        "src/mobile/android/base/AndroidManifest.xml",
        "<manifest package=\"org.mozilla.gecko\" />\n",
    );
    tree.write_file(
        "src/mobile/android/base/java/org/mozilla/gecko/App.java",
        "class App {}\n",
    );
    tree.write_file("src/mobile/android/dist/libxul.so", "ELF");
}

#[test]
fn studio_manifest_installs_links_copies_and_empty_res() {
    let tree = TestTree::new();
    populate_sources(&tree);
    tree.write_config(json!({}));
    tree.write_projects(&[json!({
        "name": "Fennec",
        "package_name": "org.mozilla.gecko",
        "manifest": "base/AndroidManifest.xml",
        "classpath_entries": [{"srcdir": "base/java", "dstdir": "src/main/java"}],
        "native_libs": [{"src": "dist/libxul.so", "dst": "armeabi-v7a/libxul.so"}]
    })]);
    tree.generate_ok("android-studio");

    let manifest = tree.topobjdir().join("android_studio/Fennec.manifest");
    let project = tree.project_dir("android_studio", "Fennec");
    let output = install(&manifest, &project);
    assert!(
        output.status.success(),
        "install failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1 linked; 3 copied"), "stdout: {stdout}");

    assert!(read(&project.join("src/main/AndroidManifest.xml")).contains("org.mozilla.gecko"));
    assert_eq!(read(&project.join("src/main/jniLibs/armeabi-v7a/libxul.so")), "ELF");
    assert!(project
        .join("src/main/res/.not_an_android_resource")
        .is_file());
    assert!(project
        .join("src/main/java/org/mozilla/gecko/App.java")
        .is_file());

    #[cfg(unix)]
    {
        let meta = std::fs::symlink_metadata(project.join("src/main/java")).expect("lstat java");
        assert!(meta.file_type().is_symlink());
    }

    // Installing again replaces what the first run produced.
    let again = install(&manifest, &project);
    assert!(again.status.success());
}

#[test]
fn missing_native_library_fails_install() {
    let tree = TestTree::new();
    populate_sources(&tree);
    tree.write_config(json!({}));
    tree.write_projects(&[json!({
        "name": "Fennec",
        "package_name": "org.mozilla.gecko",
        "res": "base/java",
        "native_libs": [{"src": "dist/libmozglue.so", "dst": "armeabi-v7a/libmozglue.so"}]
    })]);
    tree.generate_ok("android-studio");

    let manifest = tree.topobjdir().join("android_studio/Fennec.manifest");
    let output = install(&manifest, &tree.project_dir("android_studio", "Fennec"));
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("missing install source"), "stderr: {stderr}");
}

#[test]
fn eclipse_manifest_links_into_project_root() {
    let tree = TestTree::new();
    populate_sources(&tree);
    tree.write_config(json!({}));
    tree.write_projects(&[json!({
        "name": "Fennec",
        "package_name": "org.mozilla.gecko",
        "manifest": "base/AndroidManifest.xml",
        "classpath_entries": [{"srcdir": "base/java", "dstdir": "src"}]
    })]);
    tree.generate_ok("android-eclipse");

    let manifest = tree.topobjdir().join("android_eclipse/Fennec.manifest");
    let project = tree.project_dir("android_eclipse", "Fennec");
    let output = install(&manifest, &project);
    assert!(
        output.status.success(),
        "install failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(read(&project.join("AndroidManifest.xml")).contains("org.mozilla.gecko"));
    assert!(project.join("src/org/mozilla/gecko/App.java").is_file());
    assert!(project.join(".classpath").is_file());
}

#[test]
fn install_report_as_json() {
    let tree = TestTree::new();
    populate_sources(&tree);
    tree.write_config(json!({}));
    tree.write_projects(&[json!({
        "name": "Fennec",
        "package_name": "org.mozilla.gecko",
        "manifest": "base/AndroidManifest.xml",
        "res": "base/java",
        "classpath_entries": [{"srcdir": "base/java", "dstdir": "src/main/java"}]
    })]);
    tree.generate_ok("android-studio");

    let manifest = tree.topobjdir().join("android_studio/Fennec.manifest");
    let output = install_with(
        &manifest,
        &tree.project_dir("android_studio", "Fennec"),
        &["--json"],
    );
    assert!(
        output.status.success(),
        "install failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("parse install report");
    assert_eq!(report["linked"], 2);
    assert_eq!(report["copied"], 1);
}
