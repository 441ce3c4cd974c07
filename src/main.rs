use anyhow::{Context, Result};
use clap::Parser;

use artmuse::catalog::Catalog;
use artmuse::cli::Args;
use artmuse::inspire::Inspirer;
use artmuse::server::{self, AppState};
use artmuse::uploads::UploadStore;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let catalog = match &args.catalog {
        Some(path) => {
            log::info!("loading catalog from {}", path.display());
            Catalog::load(path)?
        }
        None => Catalog::default(),
    };
    catalog
        .validate(args.palette_size())
        .context("catalog does not fit the configured palette size")?;

    let uploads = UploadStore::open(&args.uploads_dir)?;
    log::info!("storing uploads in {}", uploads.dir().display());
    if args.seed.is_some() {
        log::warn!("fixed seed configured; every request gets the same random sequence");
    }

    let inspirer = Inspirer::new(catalog, uploads, args.palette_size());
    let app = server::router(AppState::new(inspirer, args.seed), args.max_body_bytes());
    server::serve(args.addr(), app).await
}
