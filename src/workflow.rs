use crate::backend::{create_backend, BackendSummary, ProjectBackend};
use crate::cli::{GenerateArgs, InstallArgs};
use crate::config::{load_config, validate_config};
use crate::frontend::{load_objects, BuildObject};
use crate::install::install_manifest;
use crate::manifest::InstallManifest;
use anyhow::{Context, Result};

pub fn run_generate(args: GenerateArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    validate_config(&config)?;
    let objects = load_objects(&args.objects)?;
    let state_root = args
        .state_dir
        .clone()
        .unwrap_or_else(|| config.topobjdir.clone());

    let backend = create_backend(args.backend, config, state_root);
    let summary = generate(backend.as_ref(), &objects, args.run_build)?;

    if args.json {
        let text = serde_json::to_string_pretty(&summary).context("serialize summary")?;
        println!("{text}");
    } else {
        println!("{}", summary.detailed());
    }
    Ok(())
}

/// Emit every Android project in `objects`, strictly in order.
pub fn generate(
    backend: &dyn ProjectBackend,
    objects: &[BuildObject],
    run_build: bool,
) -> Result<BackendSummary> {
    let mut summary = BackendSummary::new(backend.kind(), backend.paths().backend_dir());
    for object in objects {
        match object {
            BuildObject::AndroidProject(source) => {
                let outcome = backend
                    .emit(source)
                    .with_context(|| format!("emit project {}", source.project.name))?;
                summary.record(outcome);
            }
            BuildObject::Other => summary.record_skipped(),
        }
    }
    backend.finish(&summary.projects, run_build)?;
    Ok(summary)
}

pub fn run_install(args: InstallArgs) -> Result<()> {
    let manifest = InstallManifest::load(&args.manifest)?;
    if manifest.is_empty() {
        tracing::warn!(manifest = %args.manifest.display(), "manifest has no entries");
    }
    let report = install_manifest(&manifest, &args.dest)
        .with_context(|| format!("install {}", args.manifest.display()))?;
    if args.json {
        let text = serde_json::to_string_pretty(&report).context("serialize install report")?;
        println!("{text}");
    } else {
        println!(
            "Installed {} into {}; {} linked; {} copied",
            args.manifest.display(),
            args.dest.display(),
            report.linked,
            report.copied
        );
    }
    Ok(())
}
