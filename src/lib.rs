//! Indexing of content-management resources into Solr, plus a query, filter
//! and facet model translated into Solr request parameters.
//!
//! ```no_run
//! use quarry::{Indexer, IndexerConfiguration, IndexerParameter, JsonResourceLoader, QuarryConfig};
//! # fn engine() -> std::sync::Arc<dyn quarry::SearchEngineClient> { unimplemented!() }
//! use std::sync::Arc;
//!
//! let config = QuarryConfig::load_or_default(std::path::Path::new("quarry.json"));
//! let loader = Arc::new(JsonResourceLoader::new(&config.resource_dir));
//! let indexer = Indexer::new(&config, IndexerConfiguration::new("internal", "Internal"), loader, engine());
//! let status = indexer.index(&IndexerParameter::from_config(&config))?;
//! println!("{}", status.status_line());
//! # Ok::<(), quarry::QuarryError>(())
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod indexer;
pub mod query;
pub mod resource;
pub mod types;

pub use config::QuarryConfig;
pub use engine::{SearchEngineClient, SolrParams, UpdateBatch, UpdateResult};
pub use error::{QuarryError, Result};
pub use indexer::{
    Indexer, IndexerConfiguration, IndexerParameter, IndexerProgressHandler, IndexerState,
    IndexerStatus,
};
pub use query::{Facet, Filter, Search, SearchResult, SelectQuery, Suggest};
pub use resource::{JsonResourceLoader, ResourceFactoryChain, ResourceLoader};
pub use types::{DataBag, Resource, ResourceLanguage, ResourceLocation};
