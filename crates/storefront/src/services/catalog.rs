//! Product catalog and carousel configuration.
//!
//! Products come from the `products` table or, when configured, from a JSON
//! file in the legacy `products.json` shape. Loaded products are cached via
//! `moka` for the configured TTL.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use moka::future::Cache;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument};

use shopfront_core::ProductId;

use crate::backend::DataStore;
use crate::config::CatalogConfig;
use crate::db::{ProductRepository, RepositoryError};
use crate::models::Product;

/// Errors that can occur while loading the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Reading the `products` table failed.
    #[error("product table error: {0}")]
    Repository(#[from] RepositoryError),

    /// The products file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The products file is not a JSON array of products.
    #[error("invalid products file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The table source was selected but no backend is configured.
    #[error("no product source available")]
    NoSource,
}

/// Where products are loaded from.
#[derive(Clone)]
enum ProductSource {
    Table(Option<Arc<dyn DataStore>>),
    File(PathBuf),
}

const CACHE_KEY: &str = "products";

/// Cached access to the product catalog.
#[derive(Clone)]
pub struct Catalog {
    inner: Arc<CatalogInner>,
}

struct CatalogInner {
    source: ProductSource,
    cache: Cache<&'static str, Arc<Vec<Product>>>,
}

impl Catalog {
    /// Create a catalog. `store` serves the `products` table unless the
    /// configuration names a file.
    #[must_use]
    pub fn new(config: &CatalogConfig, store: Option<Arc<dyn DataStore>>) -> Self {
        let cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(config.cache_ttl)
            .build();

        let source = match &config.file {
            Some(path) => ProductSource::File(path.clone()),
            None => ProductSource::Table(store),
        };

        Self {
            inner: Arc::new(CatalogInner { source, cache }),
        }
    }

    /// Every product, ordered as the source lists them.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the source cannot be read. Failures are not
    /// cached.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Arc<Vec<Product>>, CatalogError> {
        if let Some(products) = self.inner.cache.get(&CACHE_KEY).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let products = Arc::new(self.load().await?);
        self.inner.cache.insert(CACHE_KEY, products.clone()).await;
        debug!(count = products.len(), "Loaded products");
        Ok(products)
    }

    /// A single product by id.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the source cannot be read.
    pub async fn find(&self, id: ProductId) -> Result<Option<Product>, CatalogError> {
        Ok(self.products().await?.iter().find(|p| p.id == id).cloned())
    }

    /// Drop cached products so the next read goes to the source.
    pub async fn invalidate(&self) {
        self.inner.cache.invalidate(&CACHE_KEY).await;
    }

    async fn load(&self) -> Result<Vec<Product>, CatalogError> {
        match &self.inner.source {
            ProductSource::Table(Some(store)) => {
                Ok(ProductRepository::new(store.as_ref()).list(None).await?)
            }
            ProductSource::Table(None) => Err(CatalogError::NoSource),
            ProductSource::File(path) => {
                let raw = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| CatalogError::Io {
                        path: path.clone(),
                        source,
                    })?;
                serde_json::from_str(&raw).map_err(|source| CatalogError::Parse {
                    path: path.clone(),
                    source,
                })
            }
        }
    }
}

// =============================================================================
// Views
// =============================================================================

/// A product card as rendered inside a carousel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCardView {
    pub id: ProductId,
    pub name: String,
    pub image: String,
    pub image_hover: Option<String>,
    pub price: String,
    pub old_price: Option<String>,
    pub sale_percent: Option<i64>,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            image: product.image.clone(),
            image_hover: product.image_hover.clone(),
            price: product.price.to_string(),
            old_price: product.old_price.map(|p| p.to_string()),
            sale_percent: product.sale_percent(),
        }
    }
}

/// Carousel widget options, serialized for the client-side slider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselConfig {
    pub slides_per_view: u32,
    pub space_between: u32,
    pub pagination: Pagination,
    pub breakpoints: BTreeMap<u32, Breakpoint>,
    pub autoplay: Autoplay,
    #[serde(rename = "loop")]
    pub looping: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub el: String,
    pub clickable: bool,
    pub dynamic_bullets: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakpoint {
    pub slides_per_view: u32,
    pub space_between: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Autoplay {
    pub delay: u32,
    pub disable_on_interaction: bool,
}

impl CarouselConfig {
    /// Options for the carousel with CSS class `class`, advancing every `delay_ms`.
    #[must_use]
    pub fn new(class: &str, delay_ms: u32) -> Self {
        let breakpoints = [(640, 2, 20), (768, 3, 30), (1024, 4, 30), (1200, 5, 30)]
            .into_iter()
            .map(|(width, slides_per_view, space_between)| {
                (
                    width,
                    Breakpoint {
                        slides_per_view,
                        space_between,
                    },
                )
            })
            .collect();

        Self {
            slides_per_view: 1,
            space_between: 20,
            pagination: Pagination {
                el: format!(".{class} .products-pagination"),
                clickable: true,
                dynamic_bullets: true,
            },
            breakpoints,
            autoplay: Autoplay {
                delay: delay_ms,
                disable_on_interaction: false,
            },
            looping: true,
        }
    }
}

/// One product carousel on the home page.
#[derive(Debug, Clone)]
pub struct CarouselView {
    pub class: &'static str,
    pub config_json: String,
    pub cards: Vec<ProductCardView>,
}

/// The two home-page carousels, both showing every product.
#[must_use]
pub fn carousels(products: &[Product]) -> Vec<CarouselView> {
    let cards: Vec<ProductCardView> = products.iter().map(ProductCardView::from).collect();

    [("myProductsSwiper", 2000), ("myProductsSwiper2", 2500)]
        .into_iter()
        .map(|(class, delay)| CarouselView {
            class,
            config_json: serde_json::to_string(&CarouselConfig::new(class, delay))
                .unwrap_or_else(|_| "{}".to_string()),
            cards: cards.clone(),
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::backend::{FakeBackend, FakeFailure, FakeOp};
    use crate::models::product::TABLE;

    fn config(file: Option<PathBuf>) -> CatalogConfig {
        CatalogConfig {
            file,
            cache_ttl: Duration::from_secs(60),
        }
    }

    #[tokio::test]
    async fn test_table_products_are_cached() {
        let fake = Arc::new(FakeBackend::new());
        fake.seed(
            TABLE,
            [json!({"id": 1, "name": "Cap", "price": "10", "image": "cap.png"})],
        );
        let catalog = Catalog::new(&config(None), Some(fake.clone() as Arc<dyn DataStore>));

        assert_eq!(catalog.products().await.unwrap().len(), 1);
        assert_eq!(catalog.products().await.unwrap().len(), 1);
        assert_eq!(fake.call_count(FakeOp::Select), 1);

        catalog.invalidate().await;
        catalog.products().await.unwrap();
        assert_eq!(fake.call_count(FakeOp::Select), 2);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let fake = Arc::new(FakeBackend::new());
        fake.fail(FakeOp::Select, FakeFailure::Unreachable);
        let catalog = Catalog::new(&config(None), Some(fake.clone() as Arc<dyn DataStore>));

        assert!(catalog.products().await.is_err());
        fake.recover(FakeOp::Select);
        assert!(catalog.products().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_without_store_or_file_there_is_no_source() {
        let catalog = Catalog::new(&config(None), None);
        assert!(matches!(
            catalog.products().await,
            Err(CatalogError::NoSource)
        ));
    }

    #[tokio::test]
    async fn test_file_source_reads_legacy_json() {
        let path = std::env::temp_dir().join(format!("products-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            r#"[{"id": 7, "name": "Tote", "price": 30, "old_price": 40, "img": "t.png", "img_hover": "t2.png"}]"#,
        )
        .unwrap();
        let catalog = Catalog::new(&config(Some(path.clone())), None);

        let tote = catalog.find(ProductId::new(7)).await.unwrap().unwrap();
        assert_eq!(tote.image, "t.png");
        assert!(catalog.find(ProductId::new(8)).await.unwrap().is_none());
        std::fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let catalog = Catalog::new(&config(Some(PathBuf::from("/nonexistent/products.json"))), None);
        assert!(matches!(
            catalog.products().await,
            Err(CatalogError::Io { .. })
        ));
    }

    #[test]
    fn test_carousel_config_json() {
        let value = serde_json::to_value(CarouselConfig::new("myProductsSwiper", 2000)).unwrap();
        assert_eq!(value["slidesPerView"], 1);
        assert_eq!(value["spaceBetween"], 20);
        assert_eq!(value["breakpoints"]["640"]["slidesPerView"], 2);
        assert_eq!(value["breakpoints"]["1200"]["slidesPerView"], 5);
        assert_eq!(value["breakpoints"]["768"]["spaceBetween"], 30);
        assert_eq!(value["autoplay"]["delay"], 2000);
        assert_eq!(value["loop"], true);
        assert_eq!(
            value["pagination"]["el"],
            ".myProductsSwiper .products-pagination"
        );
    }

    #[test]
    fn test_two_carousels_share_products() {
        let product: Product = serde_json::from_value(json!({
            "id": 1, "name": "Cap", "price": "10", "old_price": "20", "image": "cap.png"
        }))
        .unwrap();
        let views = carousels(&[product]);
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].cards, views[1].cards);
        assert_eq!(views[0].cards[0].price, "$10.00");
        assert_eq!(views[0].cards[0].sale_percent, Some(50));
        assert!(views[1].config_json.contains("2500"));
    }
}
