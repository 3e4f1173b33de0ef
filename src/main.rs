use std::{process, sync::Arc};

use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;
use viaggio::{
    application::{error::AppError, feed::FeedService, repos::ContentRepo},
    config,
    infra::{content::ContentApiClient, error::InfraError, http, telemetry},
    presentation::views::{BrandView, LayoutChrome, PageMetaView},
};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (_cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    let content: Arc<dyn ContentRepo> =
        Arc::new(ContentApiClient::new(&settings.content).map_err(AppError::from)?);
    let feed = Arc::new(FeedService::new(
        content.clone(),
        settings.content.page_size.get(),
    ));

    let state = http::HttpState {
        feed,
        content,
        chrome: build_chrome(&settings.site),
    };

    serve_http(&settings, state).await
}

fn build_chrome(site: &config::SiteSettings) -> LayoutChrome {
    LayoutChrome {
        brand: BrandView {
            title: site.title.clone(),
            href: "/".to_string(),
        },
        meta: PageMetaView {
            title: site.title.clone(),
            description: site.description.clone(),
            canonical: site.public_url.clone(),
        },
    }
}

async fn serve_http(settings: &config::Settings, state: http::HttpState) -> Result<(), AppError> {
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.public_addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "viaggio::server",
        addr = %settings.server.public_addr,
        "Serving public site"
    );

    axum::serve(listener, router.into_make_service())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}
