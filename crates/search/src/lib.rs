//! Web search integration crate for the coach workspace.
//!
//! Provides a provider-agnostic `SearchClient` trait used by the web
//! fallback path, plus a Google Custom Search implementation.
//!
//! # Example
//! ```no_run
//! use coach_search::{SearchClient, GoogleSearchClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GoogleSearchClient::new("api-key", "engine-id");
//! for hit in client.search("liderlik after:2025", 3).await? {
//!     println!("{}: {}", hit.title, hit.snippet);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

pub use client::{SearchClient, WebResult};
pub use factory::create_search_client;
pub use providers::GoogleSearchClient;
