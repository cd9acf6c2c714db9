//! ClinicalTrials.gov v2 registry client

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::RegistryConfig;
use crate::infrastructure::traits::{StudyQuery, StudySearchResponse, StudySummary, TrialRegistry};
use crate::infrastructure::{InfraError, InfraResult};

/// Wire format of `/api/v2/studies`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiSearchResponse {
    #[serde(default)]
    total_count: Option<u64>,
    #[serde(default)]
    studies: Vec<ApiStudy>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiStudy {
    #[serde(default)]
    protocol_section: Option<ApiProtocolSection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiProtocolSection {
    #[serde(default)]
    identification_module: Option<ApiIdentification>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiIdentification {
    nct_id: Option<String>,
    official_title: Option<String>,
    brief_title: Option<String>,
}

impl From<ApiSearchResponse> for StudySearchResponse {
    fn from(api: ApiSearchResponse) -> Self {
        let studies: Vec<StudySummary> = api
            .studies
            .into_iter()
            .filter_map(|s| s.protocol_section?.identification_module)
            .filter_map(|ident| {
                let nct_id = ident.nct_id?;
                let title = ident
                    .official_title
                    .or(ident.brief_title)
                    .unwrap_or_else(|| "Untitled Study".to_string());
                Some(StudySummary { nct_id, title })
            })
            .collect();

        Self {
            total_count: api.total_count.unwrap_or(studies.len() as u64),
            studies,
        }
    }
}

/// HTTP client for the public trials registry.
pub struct ClinicalTrialsClient {
    http_client: reqwest::Client,
    studies_url: String,
    search_url: String,
}

impl ClinicalTrialsClient {
    pub fn new(config: &RegistryConfig) -> InfraResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            studies_url: format!("{}/studies", config.base_url.trim_end_matches('/')),
            search_url: config.search_url.clone(),
        })
    }

    /// Query-string parameters for one search.
    pub fn query_params(query: &StudyQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("query.term", query.term.clone()),
            ("filter.overallStatus", query.status.clone()),
            ("pageSize", query.page_size.to_string()),
            ("countTotal", "true".to_string()),
        ];
        if let Some(phase) = query.phase {
            params.push((
                "filter.advanced",
                format!("AREA[Phase]{}", phase.as_registry_value()),
            ));
        }
        params
    }

    /// Parse a raw search response body.
    pub fn parse_response(body: &str) -> InfraResult<StudySearchResponse> {
        let api: ApiSearchResponse = serde_json::from_str(body).map_err(|e| InfraError::Parse {
            message: e.to_string(),
        })?;
        Ok(api.into())
    }
}

#[async_trait]
impl TrialRegistry for ClinicalTrialsClient {
    #[instrument(level = "debug", skip(self), fields(term = %query.term))]
    async fn search(&self, query: &StudyQuery) -> InfraResult<StudySearchResponse> {
        let response = self
            .http_client
            .get(&self.studies_url)
            .query(&Self::query_params(query))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InfraError::Status {
                code: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let parsed = Self::parse_response(&body)?;
        debug!(total = parsed.total_count, "registry search complete");
        Ok(parsed)
    }

    fn search_page_url(&self, term: &str, status: &str) -> String {
        reqwest::Url::parse_with_params(&self.search_url, &[("q", term), ("status", status)])
            .map(|u| u.to_string())
            .unwrap_or_else(|_| self.search_url.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::traits::TrialPhase;

    #[test]
    fn given_registry_body_when_parsing_then_count_and_titles_extracted() {
        let body = r#"{
            "totalCount": 42,
            "studies": [
                {"protocolSection": {"identificationModule": {"nctId": "NCT1", "officialTitle": "Official"}}},
                {"protocolSection": {"identificationModule": {"nctId": "NCT2", "briefTitle": "Brief"}}},
                {"protocolSection": {}}
            ]
        }"#;

        let parsed = ClinicalTrialsClient::parse_response(body).unwrap();

        assert_eq!(parsed.total_count, 42);
        assert_eq!(parsed.studies.len(), 2);
        assert_eq!(parsed.studies[0].title, "Official");
        assert_eq!(parsed.studies[1].title, "Brief");
    }

    #[test]
    fn given_garbage_body_when_parsing_then_parse_error() {
        let err = ClinicalTrialsClient::parse_response("<html>").unwrap_err();
        assert!(matches!(err, InfraError::Parse { .. }));
    }

    #[test]
    fn given_phase_query_when_building_params_then_advanced_filter_added() {
        let query = StudyQuery {
            term: "osimertinib NSCLC".into(),
            status: "RECRUITING".into(),
            phase: Some(TrialPhase::Phase2),
            page_size: 10,
        };

        let params = ClinicalTrialsClient::query_params(&query);

        assert!(params.contains(&("query.term", "osimertinib NSCLC".to_string())));
        assert!(params.contains(&("filter.advanced", "AREA[Phase]PHASE2".to_string())));
    }

    #[test]
    fn given_term_when_building_search_page_url_then_encoded() {
        let client = ClinicalTrialsClient::new(&RegistryConfig::default()).unwrap();
        let url = client.search_page_url("egfr exon", "RECRUITING");
        assert!(url.starts_with("https://clinicaltrials.gov/search?"));
        assert!(url.contains("q=egfr+exon"));
    }
}
