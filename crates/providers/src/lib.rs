//! Content provider registration and matching.
//!
//! Providers register a name, url patterns, an optional keyword map and an
//! optional document-context filter together with their fetch capability.
//! [`ProviderRegistry`] validates and stores them; [`match_by_link`] and
//! [`match_by_context`] select the providers that apply to a hovered link or
//! to the current document.

mod context;
mod error;
mod fold;
mod matcher;
mod provider;
mod registry;

pub use context::{DocumentContext, REFERENCE_MARKER, References};
pub use error::{FetchError, RegistrationError};
pub use fold::{fold_case, fold_char};
pub use matcher::{match_by_context, match_by_link};
pub use provider::{ContentFetcher, ContentFragment, ContextFilter, ContextFilterSpec, KeywordMap, Provider, ProviderSpec, fetch_fn};
pub use registry::{ProviderRegistry, RegistrySnapshot};
