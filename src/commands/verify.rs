use std::path::PathBuf;

use clap::Parser;

use crate::utils::{
    exec::SystemRunner,
    locate::{resolve_with_fallback, search_path},
    provisioner::Settings,
};

#[derive(Parser, Debug)]
pub struct VerifyArgs {}

pub fn run(
    _args: VerifyArgs,
    settings: Settings,
    explicit_search_path: Vec<PathBuf>,
) -> anyhow::Result<()> {
    let runner = SystemRunner::new();

    let mut search = search_path(
        &runner,
        &settings.python,
        &settings.download_dir,
        &explicit_search_path,
    )?;
    let resolution = resolve_with_fallback(&mut search, &settings.package, &settings.target_path)?;

    info!(
        "'{}' resolves from '{}'",
        settings.package,
        resolution.origin.path.display()
    );
    if resolution.appended {
        // the interpreter will not see it without help
        println!(
            "export PYTHONPATH=\"${{PYTHONPATH}}:{}\"",
            settings.target_path.display()
        );
    }
    Ok(())
}
