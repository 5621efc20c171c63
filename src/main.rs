mod cli;
mod config;
mod crawler;
mod dispatcher;
mod identity;
mod ledger;
mod logging;
mod outside;
mod pipeline;
mod result;
mod site;
mod web;

#[cfg(test)]
mod testing;

use clap::Parser;
use miette::{bail, Report, Result};
use tracing::{error, info, info_span};

use crate::{
    cli::Args,
    config::Settings,
    dispatcher::Dispatcher,
    logging::init_logging,
    outside::{Ffmpeg, YtDlp},
    pipeline::{performer_name, Pipeline},
    web::{HttpClient, SitePageResolver},
};

fn main() -> Result<()> {
    // Initialize the CLI & logging
    let args = Args::parse();
    init_logging(args.log_level)?;

    let config_path = match args.config {
        Some(path) => path,
        None => Settings::default_path()?,
    };
    let settings = Settings::load_or_create(&config_path)?;
    settings.ensure_folders()?;

    let (ytdlp, ffmpeg) = load_external_components()?;
    let http = HttpClient::new(&settings.base_url)?;
    let resolver = SitePageResolver::new(&http);
    let dispatcher = Dispatcher::new(
        &settings.downloads_folder,
        &settings.base_url,
        &http,
        &ytdlp,
        &ffmpeg,
    );
    let pipeline = Pipeline::new(&settings, &http, &resolver, dispatcher);

    // A failing target does not prevent the next ones from being archived
    let (mut failed_targets, mut unannotated) = (0, 0);
    for url in &args.urls {
        let span = info_span!("performer", name = %performer_name(url.as_str()));
        let _enter = span.enter();

        match pipeline.run(url) {
            Ok(summary) => {
                info!("{summary}");
                unannotated += summary.unannotated;
            }
            Err(err) => {
                let report = Report::from(err).wrap_err(format!("Could not archive {url}"));
                error!("{report:?}");
                failed_targets += 1;
            }
        }
    }

    if unannotated > 0 {
        error!("{unannotated} downloaded videos could not be annotated and were not archived");
    }
    if failed_targets > 0 || unannotated > 0 {
        bail!("{failed_targets} targets failed, {unannotated} downloads need attention");
    }

    info!("All targets completed");
    Ok(())
}

/// Load the external components
fn load_external_components() -> Result<(YtDlp, Ffmpeg)> {
    // Construct the handles concurrently as executing an external program
    // is not instantaneous. That way we can avoid adding the costs
    let ytdlp_thread = std::thread::spawn(YtDlp::new);
    let ffmpeg_thread = std::thread::spawn(Ffmpeg::new);

    let ytdlp = ytdlp_thread
        .join()
        .map_err(|_| miette::miette!("yt-dlp check panicked"))?
        .map_err(|err| Report::from(err).wrap_err("yt-dlp is required"))?;
    let ffmpeg = ffmpeg_thread
        .join()
        .map_err(|_| miette::miette!("ffmpeg check panicked"))?
        .map_err(|err| Report::from(err).wrap_err("ffmpeg is required"))?;

    Ok((ytdlp, ffmpeg))
}
