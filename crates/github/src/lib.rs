pub mod client;
pub mod error;
pub mod traits;
pub mod types;

pub use client::GitHubClient;
pub use error::{GitHubError, Result};
pub use traits::SourceHost;
pub use types::{PagesConfig, PagesSource, PagesStatus, RepoHandle};
