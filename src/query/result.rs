use super::facet::{Facet, FacetKind};
use super::translator::multi_query_key;
use crate::types::Resource;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetValue {
    pub value: String,
    pub hits: u64,
}

/// Counts of one requested facet, in engine order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetGroup {
    pub key: String,
    pub facets: Vec<FacetValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub total: u64,
    pub limit: usize,
    pub offset: usize,
    pub results: Vec<Resource>,
    pub facet_groups: Vec<FacetGroup>,
    /// Milliseconds reported by the engine.
    pub query_time: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestResult {
    pub suggestions: Vec<FacetValue>,
    pub query_time: u64,
}

/// Solr's flat `[value, count, value, count, ...]` lists.
pub fn pairs(list: &Value) -> Vec<FacetValue> {
    let Some(items) = list.as_array() else {
        return Vec::new();
    };
    items
        .chunks(2)
        .filter_map(|pair| match pair {
            [value, count] => Some(FacetValue {
                value: match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                },
                hits: count.as_u64()?,
            }),
            _ => None,
        })
        .collect()
}

/// Match the `facet_counts` section of a response back to the requested facets.
pub fn facet_groups(facets: &[Facet], response: &Value) -> Vec<FacetGroup> {
    let counts = &response["facet_counts"];
    let query_count = |key: &str| counts["facet_queries"][key].as_u64();

    facets
        .iter()
        .map(|facet| {
            let values = match &facet.kind {
                FacetKind::Field { .. } => pairs(&counts["facet_fields"][facet.key.as_str()]),
                FacetKind::MultiQuery(queries) => queries
                    .iter()
                    .filter_map(|(sub_key, _)| {
                        query_count(&multi_query_key(&facet.key, sub_key)).map(|hits| FacetValue {
                            value: sub_key.clone(),
                            hits,
                        })
                    })
                    .collect(),
                FacetKind::AbsoluteDateRange { gap: Some(_), .. }
                | FacetKind::RelativeDateRange { gap: Some(_), .. } => {
                    pairs(&counts["facet_ranges"][facet.key.as_str()]["counts"])
                }
                FacetKind::Query(_)
                | FacetKind::AbsoluteDateRange { .. }
                | FacetKind::RelativeDateRange { .. }
                | FacetKind::SpatialDistanceRange { .. } => query_count(&facet.key)
                    .map(|hits| {
                        vec![FacetValue {
                            value: facet.key.clone(),
                            hits,
                        }]
                    })
                    .unwrap_or_default(),
            };
            FacetGroup {
                key: facet.key.clone(),
                facets: values,
            }
        })
        .collect()
}
