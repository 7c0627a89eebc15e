//! Remote gateway for a Solr-compatible `select` endpoint

use crate::search::config::SearchConfig;
use crate::search::document::WorkDocument;
use crate::search::error::{SearchError, SearchResult};
use crate::search::gateway::{FacetCounts, SearchGateway, SearchHits};
use crate::subjects::{FacetOptions, FacetSort, PublishYearFilter, QuerySpec};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error};

/// Characters with special meaning in Lucene query syntax
const LUCENE_SPECIAL_CHARS: &str = "+-!(){}[]^\"~*?:\\";

/// Escape a value for use inside a Lucene query
pub fn escape_lucene(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if LUCENE_SPECIAL_CHARS.contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Render the `q` parameter for a query
pub fn render_query(spec: &QuerySpec) -> String {
    let mut clauses: Vec<String> = spec
        .filters
        .iter()
        .map(|(field, value)| format!("{}:{}", field, escape_lucene(value)))
        .collect();

    match spec.publish_year {
        PublishYearFilter::NoFilter => {}
        PublishYearFilter::SingleYear(year) => clauses.push(format!("publish_year:{}", year)),
        PublishYearFilter::YearRange(begin, end) => {
            clauses.push(format!("publish_year:[{} TO {}]", begin, end))
        }
    }

    if clauses.is_empty() {
        "*:*".to_string()
    } else {
        clauses.join(" AND ")
    }
}

/// Render the full parameter list for a query
pub fn render_params(spec: &QuerySpec) -> Vec<(String, String)> {
    let mut params = vec![
        ("q".to_string(), render_query(spec)),
        ("start".to_string(), spec.offset.to_string()),
        ("rows".to_string(), spec.limit.to_string()),
        ("sort".to_string(), spec.sort.to_string()),
        ("wt".to_string(), "json".to_string()),
    ];

    if let Some(options) = &spec.facets {
        params.extend(facet_params(options));
    }

    params
}

fn facet_params(options: &FacetOptions) -> Vec<(String, String)> {
    let mut params = vec![
        ("facet".to_string(), "true".to_string()),
        ("facet.mincount".to_string(), options.min_count.to_string()),
        ("facet.limit".to_string(), options.limit.to_string()),
    ];

    for request in &options.facets {
        let name = request.name();
        params.push(("facet.field".to_string(), name.to_string()));

        let limit = match options.effective_limit(request) {
            Some(n) => n.to_string(),
            None => "-1".to_string(),
        };
        params.push((format!("f.{}.facet.limit", name), limit));

        let sort = match options.effective_sort(request) {
            FacetSort::Count => "count",
            FacetSort::Index => "index",
        };
        params.push((format!("f.{}.facet.sort", name), sort.to_string()));
    }

    params
}

#[derive(Debug, Deserialize)]
struct SelectResponse {
    response: SelectBody,
    #[serde(default)]
    facet_counts: Option<FacetCountsBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SelectBody {
    num_found: u64,
    #[serde(default)]
    docs: Vec<WorkDocument>,
}

#[derive(Debug, Deserialize)]
struct FacetCountsBody {
    #[serde(default)]
    facet_fields: HashMap<String, Vec<serde_json::Value>>,
}

/// Decode a flat `[value, count, value, count, ...]` facet array
fn decode_facet_array(field: &str, flat: &[serde_json::Value]) -> SearchResult<FacetCounts> {
    if flat.len() % 2 != 0 {
        return Err(SearchError::MalformedResponse(format!(
            "Facet field {} has an odd number of entries",
            field
        )));
    }

    flat.chunks(2)
        .map(|pair| {
            let value = match &pair[0] {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                other => {
                    return Err(SearchError::MalformedResponse(format!(
                        "Unexpected facet value in {}: {}",
                        field, other
                    )))
                }
            };
            let count = pair[1].as_u64().ok_or_else(|| {
                SearchError::MalformedResponse(format!("Facet count in {} is not a number", field))
            })?;
            Ok((value, count))
        })
        .collect()
}

/// Parse a select response body
pub fn parse_response(body: &str) -> SearchResult<SearchHits> {
    let response: SelectResponse =
        serde_json::from_str(body).map_err(|e| SearchError::MalformedResponse(e.to_string()))?;

    let mut facets = HashMap::new();
    if let Some(counts) = response.facet_counts {
        for (field, flat) in counts.facet_fields {
            let decoded = decode_facet_array(&field, &flat)?;
            facets.insert(field, decoded);
        }
    }

    Ok(SearchHits {
        documents: response.response.docs,
        total_count: response.response.num_found,
        facets,
    })
}

/// Search gateway backed by a remote Solr core
#[derive(Clone)]
pub struct SolrGateway {
    client: Client,
    select_url: String,
}

impl SolrGateway {
    /// Create a gateway for a core base URL, e.g. `http://localhost:8983/solr/works`
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> SearchResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SearchError::InvalidConfiguration(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = base_url.into();
        Ok(Self {
            client,
            select_url: format!("{}/select", base_url.trim_end_matches('/')),
        })
    }

    /// Create a gateway from search configuration
    pub fn from_config(config: &SearchConfig) -> SearchResult<Self> {
        let url = config.solr_url.as_deref().ok_or_else(|| {
            SearchError::InvalidConfiguration("solr_url is required for the solr backend".to_string())
        })?;
        Self::new(url, config.timeout_secs)
    }

    pub fn select_url(&self) -> &str {
        &self.select_url
    }
}

#[async_trait]
impl SearchGateway for SolrGateway {
    fn name(&self) -> &str {
        "solr"
    }

    async fn search(&self, spec: &QuerySpec) -> SearchResult<SearchHits> {
        let params = render_params(spec);
        debug!(url = %self.select_url, q = %params[0].1, "Sending select request");

        let response = self.client.get(&self.select_url).query(&params).send().await?;

        let status = response.status();
        if !status.is_success() {
            error!(url = %self.select_url, status = %status, "Select request failed");
            return Err(SearchError::Unavailable(format!("Backend returned status {}", status)));
        }

        let body = response.text().await?;
        parse_response(&body)
    }
}
