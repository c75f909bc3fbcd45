use include_dir::{include_dir, Dir};
use serde::Deserialize;
use serde_json::from_str;
use std::sync::OnceLock;

static CATALOG_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/catalog");

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog file not found: {0}")]
    NotFound(String),
    #[error("catalog file is not valid utf-8: {0}")]
    Encoding(String),
    #[error("unable to deserialize catalog {name}: {source}")]
    Parse {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A fixed list of practice material embedded in the binary
#[derive(Deserialize, Clone, Debug, Default)]
pub struct Catalog {
    pub name: String,
    pub entries: Vec<String>,
}

impl Catalog {
    pub fn load(name: &str) -> Result<Self, CatalogError> {
        let file_name = format!("{name}.json");
        let file = CATALOG_DIR
            .get_file(&file_name)
            .ok_or_else(|| CatalogError::NotFound(file_name.clone()))?;

        let contents = file
            .contents_utf8()
            .ok_or_else(|| CatalogError::Encoding(file_name.clone()))?;

        from_str(contents).map_err(|source| CatalogError::Parse {
            name: name.to_string(),
            source,
        })
    }

    fn load_or_empty(name: &str) -> Self {
        Self::load(name).unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to load built-in catalog, using empty list");
            Self {
                name: name.to_string(),
                entries: Vec::new(),
            }
        })
    }
}

/// Built-in vocabulary for word mode
pub fn words() -> &'static Catalog {
    static WORDS: OnceLock<Catalog> = OnceLock::new();
    WORDS.get_or_init(|| Catalog::load_or_empty("words"))
}

/// Built-in quotations
pub fn quotes() -> &'static Catalog {
    static QUOTES: OnceLock<Catalog> = OnceLock::new();
    QUOTES.get_or_init(|| Catalog::load_or_empty("quotes"))
}

/// Built-in code snippets
pub fn code() -> &'static Catalog {
    static CODE: OnceLock<Catalog> = OnceLock::new();
    CODE.get_or_init(|| Catalog::load_or_empty("code"))
}
