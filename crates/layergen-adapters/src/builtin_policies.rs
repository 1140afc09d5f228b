//! Policy templates bundled into the binary.
//!
//! # Override directory
//!
//! A directory given explicitly (config key `policies.dir`) or through
//! `$LAYERGEN_POLICIES_DIR` is searched first, using the layout
//!
//! ```text
//! <dir>/
//! ├── python/
//! │   ├── domain.txt
//! │   └── layout.txt
//! └── rust/
//!     ├── domain.txt
//!     └── layout.txt
//! ```
//!
//! Any file found there replaces the bundled text for that language and
//! stage; everything else falls back to the bundled set.

use std::path::PathBuf;

use layergen_core::domain::GenerationStage;

/// Environment variable naming an override directory.
pub const POLICIES_DIR_ENV: &str = "LAYERGEN_POLICIES_DIR";

const PYTHON_DOMAIN: &str = include_str!("../policies/python/domain.txt");
const PYTHON_LAYOUT: &str = include_str!("../policies/python/layout.txt");
const RUST_DOMAIN: &str = include_str!("../policies/rust/domain.txt");
const RUST_LAYOUT: &str = include_str!("../policies/rust/layout.txt");

/// Bundled policy text for a language and stage.
pub fn bundled(language: &str, stage: GenerationStage) -> Option<&'static str> {
    let language = language.trim().to_ascii_lowercase();
    match (language.as_str(), stage) {
        ("python" | "py", GenerationStage::Domain) => Some(PYTHON_DOMAIN),
        ("python" | "py", GenerationStage::Layout) => Some(PYTHON_LAYOUT),
        ("rust" | "rs", GenerationStage::Domain) => Some(RUST_DOMAIN),
        ("rust" | "rs", GenerationStage::Layout) => Some(RUST_LAYOUT),
        _ => None,
    }
}

/// Languages with a bundled policy for every stage.
pub fn bundled_languages() -> &'static [&'static str] {
    &["python", "rust"]
}

/// Override directory from the environment, if set and non-empty.
pub fn dir_from_env() -> Option<PathBuf> {
    std::env::var_os(POLICIES_DIR_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}
