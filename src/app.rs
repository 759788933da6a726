//! Application bootstrap shared by the server binary and the CLI.

use std::sync::Arc;

use anyhow::Context;
use leeslog_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use crate::modules::{
    self,
    books::{catalog::Catalog, models::BookDocument, BookService},
};

/// Build the book service from settings: the configured store and a catalog client.
/// Fails when the deta backend is selected without a data key.
pub fn build_service(settings: &Settings) -> anyhow::Result<Arc<BookService>> {
    let store = leeslog_db::from_settings::<BookDocument>(&settings.store)
        .context("failed to configure record store")?;
    let catalog = Catalog::new(&settings.catalog).context("failed to configure catalog client")?;
    Ok(Arc::new(BookService::new(store, catalog)))
}

pub fn build_registry(service: Arc<BookService>) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, service)?;
    Ok(registry)
}

/// Run the web app until ctrl-c.
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    let service = build_service(&settings)?;
    let registry = build_registry(service)?;

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_and_start(&ctx).await?;

    let served = leeslog_http::start_server(&registry, &settings).await;
    registry.stop_all().await?;
    served
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode};
    use leeslog_kernel::settings::StoreBackend;
    use tower::ServiceExt;

    fn memory_settings() -> Settings {
        let mut settings = Settings::default();
        settings.store.backend = StoreBackend::Memory;
        settings
    }

    #[test]
    fn deta_backend_without_key_fails() {
        let mut settings = Settings::default();
        settings.store.backend = StoreBackend::Deta;
        settings.store.data_key = None;

        let err = build_service(&settings).err().unwrap();
        assert!(format!("{err:#}").contains("data_key"));
    }

    #[tokio::test]
    async fn full_router_serves_pages_and_api() {
        let settings = memory_settings();
        let registry = build_registry(build_service(&settings).unwrap()).unwrap();
        let router = leeslog_http::build_router(&registry, &settings);

        for uri in ["/", "/api/books", "/api/books/health", "/healthz"] {
            let response = router
                .clone()
                .oneshot(
                    axum::http::Request::builder()
                        .uri(uri)
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
        }
    }
}
