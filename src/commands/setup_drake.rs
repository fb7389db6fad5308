use clap::Parser;

use crate::utils::{
    exec::SystemRunner,
    fetch::HttpFetcher,
    provisioner::{Provisioner, Settings},
};

#[derive(Parser, Debug)]
pub struct SetupDrakeArgs {
    /// Drake release, e.g. 0.27.0 or latest
    #[arg(long)]
    drake_version: String,

    /// Drake build, e.g. releases or nightly
    #[arg(long, default_value_t = String::from("releases"))]
    drake_build: String,
}

pub fn run(args: SetupDrakeArgs, settings: Settings) -> anyhow::Result<()> {
    let runner = SystemRunner::new();
    let fetcher = HttpFetcher::new();

    Provisioner::new(settings, &runner, &fetcher)
        .setup_drake(&args.drake_version, &args.drake_build)?;

    info!("drake {} ({}) installed", args.drake_version, args.drake_build);
    Ok(())
}
