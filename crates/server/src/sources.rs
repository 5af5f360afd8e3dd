//! Listing sources loaded from the command line.

use crate::error::ServerError;
use geocluster::compute::FieldMap;
use geocluster::{ListingSource, MemorySource};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

/// A `tag=path` pair naming a JSON file of listing records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    pub tag: String,
    pub path: PathBuf,
}

impl FromStr for SourceSpec {
    type Err = ServerError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        match spec.split_once('=') {
            Some((tag, path)) if !tag.trim().is_empty() && !path.trim().is_empty() => Ok(Self {
                tag: tag.trim().to_string(),
                path: PathBuf::from(path.trim()),
            }),
            _ => Err(ServerError::SourceSpec(spec.to_string())),
        }
    }
}

/// Load every spec into an in-memory source using the default field names.
pub fn load_sources(specs: &[SourceSpec]) -> Result<Vec<Arc<dyn ListingSource>>, ServerError> {
    specs
        .iter()
        .map(|spec| {
            let source = MemorySource::from_json_file(&spec.tag, &spec.path, FieldMap::default())?;
            info!(
                "Source '{}': {} records from {}",
                spec.tag,
                source.len(),
                spec.path.display()
            );
            Ok(Arc::new(source) as Arc<dyn ListingSource>)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_source_spec() {
        let spec: SourceSpec = "gps=data/gps.json".parse().unwrap();
        assert_eq!(spec.tag, "gps");
        assert_eq!(spec.path, PathBuf::from("data/gps.json"));

        assert!("gps".parse::<SourceSpec>().is_err());
        assert!("=data.json".parse::<SourceSpec>().is_err());
        assert!("gps=".parse::<SourceSpec>().is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let spec: SourceSpec = "gps=/nonexistent/gps.json".parse().unwrap();
        assert!(matches!(load_sources(&[spec]), Err(ServerError::Cluster(_))));
    }
}
