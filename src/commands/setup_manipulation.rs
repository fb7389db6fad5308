use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use crate::utils::{
    exec::SystemRunner,
    fetch::HttpFetcher,
    provisioner::{Provisioner, Settings},
};

#[derive(Parser, Debug)]
pub struct SetupManipulationArgs {
    /// commit of the course repository to check out
    #[arg(long)]
    manipulation_sha: String,

    /// Drake release to install first
    #[arg(long)]
    drake_version: String,

    /// Drake build to install first
    #[arg(long, default_value_t = String::from("releases"))]
    drake_build: String,

    /// write a JSON summary of the run to this file
    #[arg(long)]
    report: Option<PathBuf>,
}

pub fn run(
    args: SetupManipulationArgs,
    settings: Settings,
    explicit_search_path: Vec<PathBuf>,
) -> anyhow::Result<()> {
    let runner = SystemRunner::new();
    let fetcher = HttpFetcher::new();

    let report = Provisioner::new(settings, &runner, &fetcher).provision(
        &args.drake_version,
        &args.drake_build,
        &args.manipulation_sha,
        &explicit_search_path,
    )?;

    if let Some(file) = &args.report {
        report
            .write_json(file)
            .with_context(|| format!("saving report to '{}'", file.display()))?;
    }

    for w in &report.warnings {
        warn!("{}", w);
    }
    info!("provisioned {} at {}", report.target_path, report.head);
    Ok(())
}
