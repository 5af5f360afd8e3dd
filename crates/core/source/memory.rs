//! In-memory listing source backed by an R*-tree.

use super::ListingSource;
use crate::compute::normalize::{FieldMap, RawRecord, RecordNormalizer};
use crate::error::{ClusterError, Result};
use futures::FutureExt;
use futures::future::BoxFuture;
use geocluster_types::filter::FilterSet;
use geocluster_types::point::Point;
use rstar::primitives::GeomWithData;
use rstar::{AABB, RTree};
use serde_json::Value;
use std::path::Path;

/// `[lng, lat]` keyed to the record's slot.
type IndexedRecord = GeomWithData<[f64; 2], usize>;

/// A read-only set of raw listing records held in memory.
///
/// Records keep their upstream shape and are returned unchanged by
/// [`ListingSource::fetch`]. Filtering runs against each record's canonical
/// form, and the bounding box is resolved through an R*-tree. Records
/// without usable coordinates are kept but never match a query. Results
/// follow insertion order.
pub struct MemorySource {
    tag: String,
    fields: FieldMap,
    records: Vec<RawRecord>,
    points: Vec<Option<Point>>,
    tree: RTree<IndexedRecord>,
}

impl MemorySource {
    pub fn new(tag: impl Into<String>, fields: FieldMap, records: Vec<RawRecord>) -> Self {
        let tag = tag.into();
        let points: Vec<Option<Point>> = records
            .iter()
            .enumerate()
            .map(|(slot, record)| RecordNormalizer::normalize_record(&tag, &fields, record, slot))
            .collect();

        let entries = points
            .iter()
            .enumerate()
            .filter_map(|(slot, point)| {
                point
                    .as_ref()
                    .map(|p| IndexedRecord::new([p.lng, p.lat], slot))
            })
            .collect();

        Self {
            tree: RTree::bulk_load(entries),
            tag,
            fields,
            records,
            points,
        }
    }

    /// Source with the default upstream field names.
    pub fn with_records(tag: impl Into<String>, records: Vec<RawRecord>) -> Self {
        Self::new(tag, FieldMap::default(), records)
    }

    /// Load records from a JSON file holding either an array of records or
    /// an object with a `listings` array.
    pub fn from_json_file(
        tag: impl Into<String>,
        path: impl AsRef<Path>,
        fields: FieldMap,
    ) -> Result<Self> {
        let tag = tag.into();
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let records = match serde_json::from_str::<Value>(&contents)? {
            Value::Array(records) => records,
            Value::Object(mut object) => match object.remove("listings") {
                Some(Value::Array(records)) => records,
                _ => {
                    return Err(ClusterError::source_failure(
                        &tag,
                        format!("{} has no 'listings' array", path.display()),
                    ));
                }
            },
            _ => {
                return Err(ClusterError::source_failure(
                    &tag,
                    format!("{} must hold a JSON array or object", path.display()),
                ));
            }
        };

        log::info!(
            "Loaded {} records for source '{}' from {}",
            records.len(),
            tag,
            path.display()
        );
        Ok(Self::new(tag, fields, records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Slots of every record matching `filter`, in insertion order.
    fn matching_slots(&self, filter: &FilterSet) -> Vec<usize> {
        let bbox = &filter.bbox;
        let mut slots = Vec::new();
        for (west, east) in bbox.lng_spans() {
            let envelope = AABB::from_corners([west, bbox.south], [east, bbox.north]);
            slots.extend(
                self.tree
                    .locate_in_envelope(&envelope)
                    .map(|entry| entry.data),
            );
        }
        slots.sort_unstable();
        slots.dedup();

        slots.retain(|&slot| {
            self.points[slot]
                .as_ref()
                .is_some_and(|point| filter.matches(point))
        });
        slots
    }
}

impl ListingSource for MemorySource {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn field_map(&self) -> &FieldMap {
        &self.fields
    }

    fn fetch<'a>(
        &'a self,
        filter: &'a FilterSet,
        limit: usize,
    ) -> BoxFuture<'a, Result<Vec<RawRecord>>> {
        let records = self
            .matching_slots(filter)
            .into_iter()
            .take(limit)
            .map(|slot| self.records[slot].clone())
            .collect();
        futures::future::ready(Ok(records)).boxed()
    }

    fn count<'a>(&'a self, filter: &'a FilterSet) -> BoxFuture<'a, Result<u64>> {
        let count = self.matching_slots(filter).len() as u64;
        futures::future::ready(Ok(count)).boxed()
    }
}

impl std::fmt::Debug for MemorySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySource")
            .field("tag", &self.tag)
            .field("records", &self.records.len())
            .field("indexed", &self.tree.size())
            .finish()
    }
}
