//! Builds signed URLs for the Preferred Pictures `choose` API.
//!
//! Nothing here performs I/O: a [Client] turns a [ChooseRequest] (or the older
//! [LegacyChooseRequest]) into a URL carrying an expiration, a uid and an HMAC-SHA256
//! signature, which the caller then embeds or redirects to.
//!
//! ```
//! use preferred_pictures_shared::{ChooseRequest, Client, ClientConfig};
//!
//! let client = Client::new(ClientConfig::new("my-identity", "my-secret"));
//! let url = client
//!     .choose_url(&ChooseRequest::new(["red", "green", "blue"], "home-page").ttl(300))
//!     .unwrap();
//! assert!(url.starts_with("https://api.preferred-pictures.com/choose?"));
//! ```
pub mod client;
pub mod correlation;
pub mod error;
pub mod query;
pub mod signature;

pub use client::{ChooseRequest, Client, ClientConfig, LegacyChooseRequest};
pub use error::ChooseError;
