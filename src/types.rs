use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One row of project cost data for a fiscal month, project, and WBS element.
///
/// Field names follow the upstream Snowflake column names, so every field
/// carries an explicit rename. All ratios (percent complete, gain/loss)
/// arrive precomputed from the source; nothing is derived client-side.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CostRecord {
    #[serde(rename = "FISCAL_YEAR_MONTH_NO")]
    pub fiscal_year_month_no: String,
    #[serde(rename = "LEAD_DISTRICT_ID")]
    pub lead_district_id: Option<String>,
    #[serde(rename = "LEAD_DISTRICT")]
    pub lead_district: Option<String>,
    #[serde(rename = "PROJECT_NUMBER")]
    pub project_number: String,
    #[serde(rename = "CBS_HIERARCHY")]
    pub cbs_hierarchy: Option<String>,
    #[serde(rename = "WBS_ELEMENT")]
    pub wbs_element: String,
    #[serde(rename = "WBS_DESCRIPTION")]
    pub wbs_description: Option<String>,
    #[serde(rename = "ACCOUNT_CODE")]
    pub account_code: Option<String>,
    #[serde(rename = "UNIT_OF_MEASURE_ID")]
    pub unit_of_measure_id: Option<String>,

    // Current budget
    #[serde(rename = "CE_QTY")]
    pub ce_qty: Option<f64>,
    #[serde(rename = "CB_QTY")]
    pub cb_qty: Option<f64>,
    #[serde(rename = "CB_MHF")]
    pub cb_mhf: Option<f64>,
    #[serde(rename = "CB_AMT")]
    pub cb_amt: Option<f64>,
    #[serde(rename = "CB_UNIT_COST")]
    pub cb_unit_cost: Option<f64>,

    // Current period actuals
    #[serde(rename = "PER_QTY")]
    pub per_qty: Option<f64>,
    #[serde(rename = "PER_PERC_COMP")]
    pub per_perc_comp: Option<f64>,
    #[serde(rename = "PER_MH")]
    pub per_mh: Option<f64>,
    #[serde(rename = "PER_MHF")]
    pub per_mhf: Option<f64>,
    #[serde(rename = "PER_MH_GL")]
    pub per_mh_gl: Option<f64>,
    #[serde(rename = "PER_UOM_MH")]
    pub per_uom_mh: Option<f64>,
    #[serde(rename = "PER_PF")]
    pub per_pf: Option<f64>,
    #[serde(rename = "PER_CF")]
    pub per_cf: Option<f64>,
    #[serde(rename = "PER_LEI")]
    pub per_lei: Option<f64>,
    #[serde(rename = "PER_SPEND")]
    pub per_spend: Option<f64>,
    #[serde(rename = "PER_UNIT_COST")]
    pub per_unit_cost: Option<f64>,
    #[serde(rename = "ACTUAL_COST_G_PER_L")]
    pub actual_cost_g_per_l: Option<f64>,

    // Job-to-date cumulative actuals
    #[serde(rename = "JTD_QTY")]
    pub jtd_qty: Option<f64>,
    #[serde(rename = "JTD_PERC_COMP")]
    pub jtd_perc_comp: Option<f64>,
    #[serde(rename = "JTD_MH")]
    pub jtd_mh: Option<f64>,
    #[serde(rename = "JTD_MHF")]
    pub jtd_mhf: Option<f64>,
    #[serde(rename = "JTD_MH_GL")]
    pub jtd_mh_gl: Option<f64>,
    #[serde(rename = "JTD_UOM_MH")]
    pub jtd_uom_mh: Option<f64>,
    #[serde(rename = "JTD_PF")]
    pub jtd_pf: Option<f64>,
    #[serde(rename = "JTD_CF")]
    pub jtd_cf: Option<f64>,
    #[serde(rename = "JTD_LEI")]
    pub jtd_lei: Option<f64>,
    #[serde(rename = "JTD_SPEND")]
    pub jtd_spend: Option<f64>,
    #[serde(rename = "JTD_UNIT_COST")]
    pub jtd_unit_cost: Option<f64>,
    #[serde(rename = "JTD_COST_G_PER_L")]
    pub jtd_cost_g_per_l: Option<f64>,

    // Forecast
    #[serde(rename = "FORECAST_REMAINING_QUANTITY")]
    pub forecast_remaining_quantity: Option<f64>,
    #[serde(rename = "HD_FORECAST_METHOD")]
    pub hd_forecast_method: Option<String>,
    #[serde(rename = "FORECAST_REMAINING_MHF")]
    pub forecast_remaining_mhf: Option<f64>,
    #[serde(rename = "FORECAST_MHF")]
    pub forecast_mhf: Option<f64>,
    #[serde(rename = "FORECAST_REMAINING_MH")]
    pub forecast_remaining_mh: Option<f64>,
    #[serde(rename = "FORECAST_MH")]
    pub forecast_mh: Option<f64>,
    #[serde(rename = "FORECAST_MH_G_PER_L")]
    pub forecast_mh_g_per_l: Option<f64>,
    #[serde(rename = "FORECAST_REMAINING_PF")]
    pub forecast_remaining_pf: Option<f64>,
    #[serde(rename = "FORECAST_PF")]
    pub forecast_pf: Option<f64>,
    #[serde(rename = "FORECAST_REMAINING_CF")]
    pub forecast_remaining_cf: Option<f64>,
    #[serde(rename = "FORECAST_CF")]
    pub forecast_cf: Option<f64>,
    #[serde(rename = "FORECAST_REMAINING_LEI")]
    pub forecast_remaining_lei: Option<f64>,
    #[serde(rename = "FORECAST_LEI")]
    pub forecast_lei: Option<f64>,
    #[serde(rename = "FORECAST_REMAINING_UNIT_COST")]
    pub forecast_remaining_unit_cost: Option<f64>,
    #[serde(rename = "FORECAST_UNIT_COST")]
    pub forecast_unit_cost: Option<f64>,
    #[serde(rename = "FORECAST_REMAINING_AMOUNT")]
    pub forecast_remaining_amount: Option<f64>,
    #[serde(rename = "FORECAST_AMOUNT")]
    pub forecast_amount: Option<f64>,
    #[serde(rename = "FORECAST_AMOUNT_G_PER_L")]
    pub forecast_amount_g_per_l: Option<f64>,
    #[serde(rename = "FORECAST_CHANGE")]
    pub forecast_change: Option<f64>,
    #[serde(rename = "SL_VARIANCE")]
    pub sl_variance: Option<f64>,
}

/// Raw user-entered selection criteria. Empty string means "no filter on
/// this dimension"; no validation happens here beyond string shape.
#[derive(Debug, Clone, Default)]
pub struct QueryFilters {
    pub project_numbers: String,
    pub start_month: String,
    pub district_id: String,
}

impl QueryFilters {
    /// Split the comma-separated project-number input, dropping empty
    /// tokens (`"106049,,104831"` yields two entries).
    pub fn project_list(&self) -> Vec<String> {
        self.project_numbers
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Result envelope for a cost-data query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostDataResponse {
    pub data: Vec<CostRecord>,
    pub total_count: usize,
    pub filters_applied: FiltersApplied,
}

/// Echo of the filters the source actually applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiltersApplied {
    pub project_numbers: Vec<String>,
    pub start_month: String,
    pub district_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct District {
    #[serde(rename = "LEAD_DISTRICT")]
    pub lead_district: String,
    #[serde(rename = "LEAD_DISTRICT_ID")]
    pub lead_district_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    #[serde(rename = "PROJECT_NUMBER")]
    pub project_number: String,
    #[serde(rename = "LEAD_DISTRICT_ID")]
    pub lead_district_id: Option<String>,
    #[serde(rename = "LEAD_DISTRICT")]
    pub lead_district: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterOptions {
    pub districts: Vec<District>,
    pub fiscal_months: Vec<String>,
}

/// A fiscal year-month, parsed from the fixed-width `YYYYMM` wire format.
///
/// Month comparisons inside the crate go through this type rather than
/// relying on lexicographic string ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FiscalMonth {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Error)]
#[error("invalid fiscal month '{0}': expected YYYYMM")]
pub struct FiscalMonthError(pub String);

impl FiscalMonth {
    /// The following calendar month, rolling over at December.
    pub fn succ(self) -> FiscalMonth {
        if self.month == 12 {
            FiscalMonth {
                year: self.year + 1,
                month: 1,
            }
        } else {
            FiscalMonth {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl FromStr for FiscalMonth {
    type Err = FiscalMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || FiscalMonthError(s.to_string());
        if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        let year: i32 = s[..4].parse().map_err(|_| err())?;
        let month: u32 = s[4..].parse().map_err(|_| err())?;
        // Month validity check; chrono rejects month 0 and 13+.
        NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(err)?;
        Ok(FiscalMonth { year, month })
    }
}

impl fmt::Display for FiscalMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fiscal_month_parses_and_round_trips() {
        let m: FiscalMonth = "202101".parse().unwrap();
        assert_eq!(m, FiscalMonth { year: 2021, month: 1 });
        assert_eq!(m.to_string(), "202101");
    }

    #[test]
    fn fiscal_month_rejects_bad_shapes() {
        assert!("2021".parse::<FiscalMonth>().is_err());
        assert!("20211".parse::<FiscalMonth>().is_err());
        assert!("2021013".parse::<FiscalMonth>().is_err());
        assert!("2021ab".parse::<FiscalMonth>().is_err());
        assert!("202100".parse::<FiscalMonth>().is_err());
        assert!("202113".parse::<FiscalMonth>().is_err());
    }

    #[test]
    fn fiscal_month_orders_across_year_boundary() {
        let dec: FiscalMonth = "202112".parse().unwrap();
        let jan: FiscalMonth = "202201".parse().unwrap();
        assert!(dec < jan);
        assert_eq!(dec.succ(), jan);
        assert_eq!(jan.succ().to_string(), "202202");
    }

    #[test]
    fn project_list_drops_empty_tokens() {
        let filters = QueryFilters {
            project_numbers: "106049, 104831,,  ,105553".to_string(),
            ..Default::default()
        };
        assert_eq!(filters.project_list(), vec!["106049", "104831", "105553"]);

        let empty = QueryFilters::default();
        assert!(empty.project_list().is_empty());
    }
}
