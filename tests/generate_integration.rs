mod common;

use common::{read, snapshot, TestTree};
use serde_json::json;
use std::fs;

fn fennec() -> serde_json::Value {
    json!({
        "name": "Fennec",
        "package_name": "org.mozilla.gecko",
        "manifest": "base/AndroidManifest.xml",
        "res": "base/resources",
        "classpath_entries": [
            {"srcdir": "base/java", "dstdir": "src/main/java", "exclude_patterns": ["org/mozilla/Excluded.java"]}
        ],
        "is_library": false
    })
}

#[test]
fn eclipse_project_excludes_and_skips_library_manifest() {
    let tree = TestTree::new();
    tree.write_config(json!({}));
    let mut project = fennec();
    project["classpath_entries"] = json!([
        {"srcdir": "src", "dstdir": "src", "exclude_patterns": ["org/mozilla/Excluded.java"]}
    ]);
    tree.write_projects(&[project]);

    let summary = tree.generate_ok("android-eclipse");
    assert_eq!(summary["created_count"], 1);
    assert_eq!(summary["skipped_objects"], 1);

    let project = tree.project_dir("android_eclipse", "Fennec");
    let classpath = read(&project.join(".classpath"));
    assert!(classpath.contains(r#"excluding="org/mozilla/Excluded.java""#));
    assert!(!classpath.contains("@IDE_CLASSPATH_ENTRIES@"));
    assert!(!project.join("AndroidManifest.xml").exists());
    assert!(read(&project.join(".project")).contains("<name>Fennec</name>"));

    let manifest = read(&tree.topobjdir().join("android_eclipse/Fennec.manifest"));
    assert!(manifest.starts_with("5\n"));
    assert!(manifest.contains("AndroidManifest.xml\x1f"));
}

#[test]
fn library_projects_keep_their_manifest_template() {
    let tree = TestTree::new();
    tree.write_config(json!({}));
    let mut project = fennec();
    project["is_library"] = json!(true);
    tree.write_projects(&[project]);

    tree.generate_ok("android-eclipse");
    tree.generate_ok("android-studio");

    let eclipse = tree.project_dir("android_eclipse", "Fennec");
    assert!(read(&eclipse.join("AndroidManifest.xml")).contains(r#"package="org.mozilla.gecko""#));
    assert!(read(&eclipse.join("project.properties")).contains("android.library=true"));

    let studio = tree.project_dir("android_studio", "Fennec");
    assert!(studio.join("src/main/AndroidManifest.xml").is_file());
    assert!(read(&studio.join("build.gradle")).contains("apply plugin: 'android-library'"));
}

#[test]
fn studio_project_for_non_library_has_no_manifest() {
    let tree = TestTree::new();
    tree.write_config(json!({}));
    tree.write_projects(&[fennec()]);
    tree.generate_ok("android-studio");

    let studio = tree.project_dir("android_studio", "Fennec");
    assert!(studio.join("Fennec.iml").is_file());
    assert!(!studio.join("src/main/AndroidManifest.xml").exists());
    assert!(read(&studio.join("build.gradle")).contains("exclude 'org/mozilla/Excluded.java'"));
}

#[test]
fn studio_rejects_source_links_that_would_contain_the_manifest() {
    let tree = TestTree::new();
    tree.write_config(json!({}));
    let mut project = fennec();
    project["classpath_entries"] = json!([{"srcdir": "base/java", "dstdir": "src"}]);
    tree.write_projects(&[project]);

    let output = tree.generate("android-studio", &[]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("overlaps"), "stderr: {stderr}");
    assert!(!tree.project_dir("android_studio", "Fennec").exists());

    // Eclipse keeps the manifest at the project root, beside `src`.
    tree.generate_ok("android-eclipse");
}

#[test]
fn regeneration_is_idempotent_and_removes_strays() {
    let tree = TestTree::new();
    tree.write_config(json!({}));
    tree.write_projects(&[fennec()]);

    tree.generate_ok("android-studio");
    let project = tree.project_dir("android_studio", "Fennec");
    let first = snapshot(&project);

    fs::write(project.join("stray.txt"), b"left behind").expect("write stray");
    fs::create_dir_all(project.join("old/dir")).expect("create stale dir");
    fs::write(project.join("old/dir/file"), b"x").expect("write stale file");

    let summary = tree.generate_ok("android-studio");
    assert_eq!(summary["updated_count"], 1);
    assert_eq!(summary["projects"][0]["status"], "updated");
    assert_eq!(snapshot(&project), first);
}

#[test]
fn input_order_does_not_change_output() {
    let forward = json!({
        "name": "Fennec",
        "package_name": "org.mozilla.gecko",
        "classpath_entries": [
            {"srcdir": "base/java", "dstdir": "src/main/java", "exclude_patterns": ["b/B.java", "a/A.java"]},
            {"srcdir": "thirdparty", "dstdir": "thirdparty", "ignore_warnings": true}
        ],
        "referenced_projects": ["Resources", "Branding"],
        "included_projects": ["Omnijar", "../Branding"],
        "extra_jars": ["/jars/z.jar", "/jars/a.jar"],
        "filtered_resources": ["1.0-name-matches-false-false-*.orig", "1.0-name-matches-false-false-*.rej"]
    });
    let mut backward = forward.clone();
    for key in [
        "classpath_entries",
        "referenced_projects",
        "included_projects",
        "extra_jars",
        "filtered_resources",
    ] {
        if let Some(items) = backward[key].as_array_mut() {
            items.reverse();
        }
    }

    let render = |project: &serde_json::Value| {
        let tree = TestTree::new();
        tree.write_config(json!({}));
        tree.write_projects(&[project.clone()]);
        tree.generate_ok("android-studio");
        let project_dir = tree.project_dir("android_studio", "Fennec");
        let files: Vec<(String, String)> = snapshot(&project_dir)
            .into_iter()
            .map(|(rel, bytes)| {
                // Absolute temp paths differ between trees; compare the rest.
                let text = String::from_utf8_lossy(&bytes)
                    .replace(&tree.temp.path().display().to_string(), "<tmp>");
                (rel, text)
            })
            .collect();
        files
    };

    assert_eq!(render(&forward), render(&backward));
}

#[test]
fn every_token_is_substituted_when_inputs_are_present() {
    let tree = TestTree::new();
    tree.write_config(json!({}));
    tree.write_projects(&[json!({
        "name": "Fennec",
        "package_name": "org.mozilla.gecko",
        "classpath_entries": [
            {"srcdir": "thirdparty", "dstdir": "thirdparty", "exclude_patterns": ["x/Y.java"]}
        ],
        "referenced_projects": ["Resources"],
        "included_projects": ["Branding"],
        "extra_jars": ["/jars/robotium.jar"],
        "recursive_make_targets": ["gecko-R.jar"],
        "filtered_resources": ["1.0-name-matches-false-false-*.orig"],
        "is_library": true
    })]);

    for (backend, dir) in [
        ("android-eclipse", "android_eclipse"),
        ("android-studio", "android_studio"),
    ] {
        tree.generate_ok(backend);
        let project = tree.project_dir(dir, "Fennec");
        for (rel, bytes) in snapshot(&project) {
            let text = String::from_utf8_lossy(&bytes);
            assert!(
                !text.contains("@IDE_") && !text.contains("@ANDROID_TARGET_SDK@"),
                "{backend}: unsubstituted token left in {rel}"
            );
        }
    }

    let studio = tree.project_dir("android_studio", "Fennec");
    let project_file = read(&studio.join(".project"));
    assert!(project_file.contains("<filteredResources>"));
    assert!(project_file.contains("<id>1</id>"));
    let iml = read(&studio.join("Fennec.iml"));
    assert!(iml.contains(r#"module-name="Branding""#));
    assert!(iml.contains("jar:///jars/robotium.jar!/"));
    assert!(iml.contains(r#"<option name="LIBRARY_PROJECT" value="true" />"#));
    assert!(read(&studio.join("build.gradle")).contains("'gecko-R.jar'"));
}

#[test]
fn state_dir_overrides_output_root() {
    let tree = TestTree::new();
    tree.write_config(json!({}));
    tree.write_projects(&[fennec()]);
    let state = tree.temp.path().join("state");
    let output = tree.generate("android-eclipse", &["--state-dir", state.to_str().expect("utf-8")]);
    assert!(output.status.success());
    assert!(state.join("android_eclipse/Fennec/.classpath").is_file());
    assert!(!tree.topobjdir().join("android_eclipse").exists());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Wrote 1 Android Eclipse projects"));
}

#[test]
fn missing_template_directory_fails() {
    let tree = TestTree::new();
    tree.write_config(json!({"template_root": tree.temp.path().join("no-templates")}));
    tree.write_projects(&[fennec()]);
    let output = tree.generate("android-eclipse", &[]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("missing template directory"), "stderr: {stderr}");
}

#[test]
fn unsafe_destinations_are_rejected() {
    let tree = TestTree::new();
    tree.write_config(json!({}));
    tree.write_projects(&[json!({
        "name": "Fennec",
        "package_name": "org.mozilla.gecko",
        "classpath_entries": [{"srcdir": "src", "dstdir": "../../escape"}]
    })]);
    let output = tree.generate("android-eclipse", &[]);
    assert!(!output.status.success());
    assert!(!tree.topobjdir().join("android_eclipse/Fennec").exists());
}

#[cfg(unix)]
#[test]
fn run_build_invokes_package_and_per_project_builds() {
    let tree = TestTree::new();
    let log = tree.temp.path().join("commands.log");
    let script = tree.write_file(
        "src/record.sh",
        &format!("#!/bin/sh\necho \"$@\" >> '{}'\n", log.display()),
    );
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(&script).expect("script metadata").permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&script, perms).expect("chmod script");
    }
    tree.write_config(json!({
        "package_command": "./record.sh package",
        "build_command": "./record.sh build",
    }));
    tree.write_projects(&[fennec()]);

    let output = tree.generate("android-studio", &["--run-build"]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let lines: Vec<String> = read(&log).lines().map(str::to_string).collect();
    assert_eq!(
        lines,
        vec![
            "package".to_string(),
            "build mobile/android/ANDROID_STUDIO_PROJECT_Fennec".to_string()
        ]
    );
}
