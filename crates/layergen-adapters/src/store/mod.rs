//! TOML-backed configuration stores.
//!
//! The registry and the project file share the `[llm]` table layout:
//!
//! ```toml
//! [llm]
//! default = "openai"
//!
//! [llm.providers.openai]
//! type = "cloud"
//! model = "gpt-4o"
//! api_key = "sk-..."        # registry only; never written to a project
//! base_url = "https://..."  # any other key is carried through as-is
//! ```

mod dto;
mod memory;
mod project;
mod registry;

pub use memory::InMemoryRegistryStore;
pub use project::TomlProjectStore;
pub use registry::TomlRegistryStore;

use std::path::Path;

use layergen_core::{application::ApplicationError, error::LayergenError};

fn store_error(path: &Path, reason: impl std::fmt::Display) -> LayergenError {
    ApplicationError::Store {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
    .into()
}
