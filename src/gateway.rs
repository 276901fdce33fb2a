// Data source gateway.
//
// One API over two backends: a live REST endpoint (reqwest, blocking) and
// the in-process demo dataset. Demo mode applies the same filtering the
// server would, plus a fixed artificial delay so the perceived latency
// matches a real fetch.
use std::collections::BTreeSet;
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use thiserror::Error;

use crate::demo;
use crate::types::{
    CostDataResponse, CostRecord, District, FilterOptions, FiltersApplied, FiscalMonth, Project,
    QueryFilters,
};

const DEMO_LATENCY: Duration = Duration::from_millis(600);

#[derive(Debug, Error)]
pub enum TransportError {
    /// The endpoint answered with a non-success status.
    #[error("API error: {status} {reason}")]
    Status { status: u16, reason: String },
    /// The request never produced a response (connect failure, bad body).
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

pub enum Gateway {
    Live { base_url: String, client: Client },
    Demo,
}

impl Gateway {
    pub fn live(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Gateway::Live {
            base_url,
            client: Client::new(),
        }
    }

    pub fn demo() -> Self {
        Gateway::Demo
    }

    pub fn is_demo(&self) -> bool {
        matches!(self, Gateway::Demo)
    }

    /// Fetch cost rows matching the given filters.
    ///
    /// Live mode serializes only non-empty filter fields into query
    /// parameters; omitted fields get server-side default semantics.
    pub fn fetch_cost_data(
        &self,
        filters: &QueryFilters,
    ) -> Result<CostDataResponse, TransportError> {
        match self {
            Gateway::Live { base_url, client } => {
                let resp = client
                    .get(format!("{}/api/cost-data", base_url))
                    .query(&cost_data_params(filters))
                    .send()?;
                Ok(check_status(resp)?.json()?)
            }
            Gateway::Demo => {
                thread::sleep(DEMO_LATENCY);
                Ok(demo_cost_data(filters))
            }
        }
    }

    /// District directory plus the fiscal months the source has data for.
    pub fn fetch_filter_options(&self) -> Result<FilterOptions, TransportError> {
        match self {
            Gateway::Live { base_url, client } => {
                let resp = client.get(format!("{}/api/filters", base_url)).send()?;
                Ok(check_status(resp)?.json()?)
            }
            Gateway::Demo => {
                thread::sleep(DEMO_LATENCY);
                let months: BTreeSet<String> = demo::dataset()
                    .iter()
                    .map(|r| r.fiscal_year_month_no.clone())
                    .collect();
                Ok(FilterOptions {
                    districts: demo::districts(),
                    fiscal_months: months.into_iter().collect(),
                })
            }
        }
    }

    pub fn fetch_districts(&self) -> Result<Vec<District>, TransportError> {
        match self {
            Gateway::Live { base_url, client } => {
                let resp = client.get(format!("{}/api/districts", base_url)).send()?;
                Ok(check_status(resp)?.json()?)
            }
            Gateway::Demo => {
                thread::sleep(DEMO_LATENCY);
                Ok(demo::districts())
            }
        }
    }

    /// Project directory, optionally narrowed to one district.
    pub fn fetch_projects(&self, district_id: Option<&str>) -> Result<Vec<Project>, TransportError> {
        match self {
            Gateway::Live { base_url, client } => {
                let mut req = client.get(format!("{}/api/projects", base_url));
                if let Some(id) = district_id {
                    req = req.query(&[("district_id", id)]);
                }
                let resp = req.send()?;
                Ok(check_status(resp)?.json()?)
            }
            Gateway::Demo => {
                thread::sleep(DEMO_LATENCY);
                Ok(demo_projects(district_id))
            }
        }
    }
}

fn cost_data_params(filters: &QueryFilters) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if !filters.project_numbers.is_empty() {
        params.push(("project_numbers", filters.project_numbers.clone()));
    }
    if !filters.start_month.is_empty() {
        params.push(("start_month", filters.start_month.clone()));
    }
    if !filters.district_id.is_empty() {
        params.push(("district_id", filters.district_id.clone()));
    }
    params
}

fn check_status(
    resp: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, TransportError> {
    if resp.status().is_success() {
        Ok(resp)
    } else {
        Err(status_error(resp.status()))
    }
}

fn status_error(status: StatusCode) -> TransportError {
    TransportError::Status {
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
    }
}

/// Demo-mode query: filter the cached dataset with the same semantics the
/// server applies.
fn demo_cost_data(filters: &QueryFilters) -> CostDataResponse {
    let projects = filters.project_list();
    let start: Option<FiscalMonth> = filters.start_month.parse().ok();
    let district = (!filters.district_id.is_empty()).then(|| filters.district_id.clone());

    let data: Vec<CostRecord> = demo::dataset()
        .iter()
        .filter(|r| projects.is_empty() || projects.iter().any(|p| *p == r.project_number))
        .filter(|r| match start {
            Some(start) => r
                .fiscal_year_month_no
                .parse::<FiscalMonth>()
                .map_or(false, |m| m >= start),
            None => true,
        })
        .filter(|r| match &district {
            Some(id) => r.lead_district_id.as_deref() == Some(id.as_str()),
            None => true,
        })
        .cloned()
        .collect();

    CostDataResponse {
        total_count: data.len(),
        filters_applied: FiltersApplied {
            project_numbers: projects,
            start_month: filters.start_month.clone(),
            district_id: district,
        },
        data,
    }
}

fn demo_projects(district_id: Option<&str>) -> Vec<Project> {
    // Demo rows draw districts at random per row, so the directory lists
    // projects without a lead district; a district filter keeps projects
    // with at least one row in that district.
    let dataset = demo::dataset();
    let mut numbers: Vec<&str> = dataset
        .iter()
        .filter(|r| match district_id {
            Some(id) => r.lead_district_id.as_deref() == Some(id),
            None => true,
        })
        .map(|r| r.project_number.as_str())
        .collect();
    numbers.sort_unstable();
    numbers.dedup();
    numbers
        .into_iter()
        .map(|n| Project {
            project_number: n.to_string(),
            lead_district_id: None,
            lead_district: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn filters(projects: &str, start: &str, district: &str) -> QueryFilters {
        QueryFilters {
            project_numbers: projects.to_string(),
            start_month: start.to_string(),
            district_id: district.to_string(),
        }
    }

    #[test]
    fn demo_query_filters_by_project_and_start_month() {
        let resp = demo_cost_data(&filters("106049", "202101", ""));
        assert!(!resp.data.is_empty());
        assert_eq!(resp.total_count, resp.data.len());
        assert!(resp
            .data
            .iter()
            .all(|r| r.project_number == "106049" && r.fiscal_year_month_no.as_str() >= "202101"));
        assert_eq!(resp.filters_applied.project_numbers, vec!["106049"]);
        assert_eq!(resp.filters_applied.district_id, None);
    }

    #[test]
    fn demo_query_respects_start_month_cutoff() {
        let all = demo_cost_data(&filters("", "", ""));
        let late = demo_cost_data(&filters("", "202201", ""));
        assert!(late.total_count < all.total_count);
        assert!(late
            .data
            .iter()
            .all(|r| r.fiscal_year_month_no.as_str() >= "202201"));
    }

    #[test]
    fn demo_query_filters_by_district_when_supplied() {
        let one = demo_cost_data(&filters("", "", "SE5001"));
        assert!(!one.data.is_empty());
        assert!(one
            .data
            .iter()
            .all(|r| r.lead_district_id.as_deref() == Some("SE5001")));
        assert_eq!(one.filters_applied.district_id.as_deref(), Some("SE5001"));

        // No district filter returns rows from the whole roster.
        let all = demo_cost_data(&filters("", "", ""));
        let seen: BTreeSet<_> = all
            .data
            .iter()
            .filter_map(|r| r.lead_district_id.clone())
            .collect();
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn demo_projects_directory_lists_each_project_once() {
        let projects = demo_projects(None);
        assert_eq!(projects.len(), crate::demo::DEMO_PROJECTS.len());

        let narrowed = demo_projects(Some("NW3002"));
        assert!(!narrowed.is_empty());
        assert!(narrowed.len() <= projects.len());
    }

    #[test]
    fn query_params_omit_empty_fields() {
        let params = cost_data_params(&filters("106049,104831", "", "SE5001"));
        assert_eq!(
            params,
            vec![
                ("project_numbers", "106049,104831".to_string()),
                ("district_id", "SE5001".to_string()),
            ]
        );
        assert!(cost_data_params(&QueryFilters::default()).is_empty());
    }

    #[test]
    fn non_success_status_surfaces_code_and_reason() {
        let err = status_error(StatusCode::INTERNAL_SERVER_ERROR);
        let msg = err.to_string();
        assert!(msg.contains("500"));
        assert!(msg.contains("Internal Server Error"));
    }
}
