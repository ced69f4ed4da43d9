use crate::app::{AppError, AppResult};
use crate::config::Config;
use axum::Router;
use error_stack::ResultExt;
use kitchen_core::{KitchenEngine, KitchenRepository};
use kitchen_routes::state::KitchenAppState;
use repositories::ConnectionDetails;
use repositories::mongodb::KitchenRepo;
use tracing::{debug, instrument};

pub mod app;
pub mod config;

/// Connects to storage and builds every route, ready for [`app::run`].
pub async fn build_routes(config: &Config) -> AppResult<Router> {
    let engine = Engine::new(build_repo(config).await?);

    let state = if config.metrics_enabled {
        KitchenAppState::new_with_metrics(engine).change_context(AppError)?
    } else {
        KitchenAppState::new_without_metrics(engine)
    };

    debug!("building routes..");
    Ok(kitchen_routes::routes::build(state)).inspect(|_| debug!("routes built"))
}

#[instrument(skip_all)]
async fn build_repo(config: &Config) -> AppResult<KitchenRepo> {
    debug!("initializing mongodb repository");
    KitchenRepo::init(ConnectionDetails::Url(config.mongo_url.clone()))
        .await
        .change_context(AppError)
}

#[derive(Debug, Clone)]
struct Engine<R> {
    repo: R,
}

impl<R> Engine<R> {
    fn new(repo: R) -> Self {
        Self { repo }
    }
}

impl<R: KitchenRepository> KitchenEngine for Engine<R> {
    type Repo = R;

    fn repo(&self) -> Self::Repo {
        self.repo.clone()
    }
}
