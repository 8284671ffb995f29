use crate::models::SearchSpec;
use anyhow::{Context, Result};
use reqwest::Url;

/// Catalog search endpoint, relative to the marketplace origin
const CATALOG_PATH: &str = "/api/v2/catalog/items";

/// Brand/category/ceiling queries polled every cycle, in polling order
const DEFAULT_SEARCHES: &[(&str, &str, u32)] = &[
    ("Nike", "tuta", 35),
    ("Nike", "scarpe", 30),
    ("Nike", "felpa", 30),
    ("Nike", "maglione", 30),
    ("Nike", "giacca", 40),
    ("Ralph Lauren", "tuta", 50),
    ("Ralph Lauren", "polo", 30),
    ("Ralph Lauren", "giacca", 60),
    ("Ralph Lauren", "felpa", 40),
    ("Ralph Lauren", "maglione", 40),
    ("Lacoste", "tuta", 50),
    ("Lacoste", "felpa", 40),
    ("Lacoste", "maglione", 40),
    ("Adidas", "tuta", 35),
    ("Adidas", "felpa", 25),
    ("Adidas", "maglione", 25),
    ("Blauer", "giacca", 50),
    ("Canada Goose", "giacca", 50),
    ("North Face", "giacca", 35),
    ("North Face", "felpa", 20),
    ("North Face", "maglione", 20),
    ("North Face", "tuta", 30),
    ("Tommy Hilfiger", "tuta", 40),
    ("Tommy Hilfiger", "felpa", 30),
    ("Tommy Hilfiger", "maglione", 30),
];

/// A search spec paired with its prebuilt query URL
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub spec: SearchSpec,
    pub url: Url,
}

/// Fixed, ordered set of searches. URLs are built once and reused.
#[derive(Debug, Clone)]
pub struct SearchCatalog {
    entries: Vec<CatalogEntry>,
}

impl SearchCatalog {
    /// Build the catalog of default searches against a marketplace origin
    pub fn with_defaults(marketplace: &Url) -> Result<Self> {
        let specs = DEFAULT_SEARCHES
            .iter()
            .map(|(brand, category, ceiling)| SearchSpec::new(brand, category, *ceiling))
            .collect();
        Self::from_specs(marketplace, specs)
    }

    pub fn from_specs(marketplace: &Url, specs: Vec<SearchSpec>) -> Result<Self> {
        let entries = specs
            .into_iter()
            .map(|spec| {
                let url = build_search_url(marketplace, &spec)?;
                Ok(CatalogEntry { spec, url })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build the catalog query URL for a spec.
///
/// `search_text` is `"{brand} {category}"` form-encoded, so spaces become `+`;
/// `price_to` carries the ceiling.
pub fn build_search_url(marketplace: &Url, spec: &SearchSpec) -> Result<Url> {
    let mut url = marketplace
        .join(CATALOG_PATH)
        .with_context(|| format!("Invalid marketplace URL: {}", marketplace))?;
    url.query_pairs_mut()
        .clear()
        .append_pair("search_text", &format!("{} {}", spec.brand, spec.category))
        .append_pair("price_to", &spec.price_ceiling.to_string());
    Ok(url)
}
