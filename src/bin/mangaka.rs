//! Mangaka - interactive terminal client for MangaDex.

use color_eyre::{eyre::Result, install};
use std::sync::Arc;
use tracing::warn;

use mangaka::{
    cli::{self, Cli},
    config::Config,
    favorites::FavoritesStore,
    library::Library,
    sources::MangaDexSource,
    viewer::SystemViewer,
};

fn main() -> Result<()> {
    install()?;
    cli::init_logging();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let config = Config::from_env();
    let favorites = Arc::new(FavoritesStore::load(&config.favorites_path)?);
    let library = Library::new(
        Arc::new(MangaDexSource::with_api_base(config.api_base.clone())),
        Arc::new(SystemViewer),
        favorites,
        config,
    );

    if let Err(e) = library.sweep_read_sessions() {
        warn!(error = %e, "could not sweep old read sessions");
    }

    Cli::new(library, runtime.handle().clone()).run()
}
