pub mod normalizer;
pub mod traits;
pub mod types;
pub mod vinted;

pub use normalizer::Normalizer;
pub use traits::{CatalogSource, RawItem};
pub use types::{build_search_url, CatalogEntry, SearchCatalog};
pub use vinted::{extract_items, FetchError, VintedClient};
