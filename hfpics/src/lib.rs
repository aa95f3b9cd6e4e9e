//! HFPics - single image retrieval from sharded Hugging Face datasets
//!
//! Images are identified by a numeric ID. The dataset is split into shards
//! of 10 000 images, each with a JSON manifest (`index/{shard}.json`) and a
//! packed archive (`images/{shard}.tar`). Retrieving an image resolves the
//! shard, looks the file up in the manifest, downloads only its byte range
//! from the archive, and keeps the result in a local cache.
//!
//! # Example
//!
//! ```no_run
//! use hfpics::{Retrieval, Retriever, RetrieverConfig};
//!
//! let retriever = Retriever::new(RetrieverConfig::default())?;
//! match retriever.get(11112, "path")? {
//!     Retrieval::Path(path) => println!("saved to {}", path.display()),
//!     Retrieval::NotFound => println!("no image for 11112"),
//!     Retrieval::Content(_) => unreachable!(),
//! }
//! # Ok::<(), hfpics::RetrieveError>(())
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod manifest;
pub mod range;
pub mod retriever;
pub mod shard;

pub use cache::{Artifact, CacheStore, ImageFormat};
pub use config::RetrieverConfig;
pub use error::{CacheError, FetchError, FetchErrorKind, RetrieveError};
pub use http::{HttpClient, ReqwestClient};
pub use manifest::{Manifest, ManifestClient, ManifestEntry};
pub use range::RangeFetcher;
pub use retriever::{Retrieval, Retriever, ReturnForm};
pub use shard::{derive_shard_key, ShardKey, SHARD_SIZE};

/// Numeric identity of one image in the dataset.
pub type ImageId = u64;

/// Library version, as published in the crate manifest.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
