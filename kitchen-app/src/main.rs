use dotenv::dotenv;
use error_stack::ResultExt;
use error_stack::fmt::ColorMode;
use kitchen_app::app::{self, AppError, AppProperties, AppResult};
use kitchen_app::config::Config;
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() {
    match try_main().await {
        Ok(_) => info!("smartkitchen shutting down"),
        Err(e) => {
            error!("smartkitchen exited with error: {e:?}");
        }
    }
}

fn init_logging() {
    error_stack::Report::set_color_mode(ColorMode::None);

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_env("KITCHEN_LOG"))
        .init();
}

async fn try_main() -> AppResult<()> {
    init_logging();

    if let Err(e) = dotenv() {
        warn!("failed to load .env file: {e}");
    }

    let config = Config::from_env().change_context(AppError)?;
    let routes = kitchen_app::build_routes(&config).await?;

    app::run(routes, AppProperties { port: config.port }).await
}
