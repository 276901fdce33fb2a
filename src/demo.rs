// Synthetic dataset for demo mode.
//
// When no backend is configured, the gateway serves rows from a generated
// in-memory dataset: 15 consecutive fiscal months, 8 fixed projects, 2-4
// WBS-element rows per project per month. The structure is fixed; the
// numeric values are randomized within plausible ranges on each process
// start, then cached so every query in a run sees the same rows.
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;
use rand::Rng;

use crate::types::{CostRecord, District, FiscalMonth};

pub const DEMO_PROJECTS: [&str; 8] = [
    "106049", "104831", "105553", "104834", "106073", "106345", "105119", "104980",
];

pub const DISTRICT_ROSTER: [(&str, &str); 3] = [
    ("SE5001", "Southeast Region"),
    ("NW3002", "Northwest Division"),
    ("CE4003", "Central Operations"),
];

const WBS_DESCRIPTIONS: [&str; 10] = [
    "Structural Steel Installation",
    "Electrical Systems",
    "HVAC Installation",
    "Foundation Work",
    "Piping Systems",
    "Instrumentation",
    "Civil Works",
    "Insulation",
    "Painting & Coating",
    "Equipment Installation",
];

const UNITS_OF_MEASURE: [&str; 5] = ["EA", "LF", "SF", "HR", "TON"];

const FORECAST_METHODS: [&str; 3] = ["Linear", "Earned Value", "Manual"];

const FIRST_MONTH: FiscalMonth = FiscalMonth {
    year: 2021,
    month: 1,
};
const MONTH_SPAN: usize = 15;

// Computed once on first access; the mutex keeps concurrent first accesses
// from generating twice.
static DATASET: Lazy<Mutex<Option<Arc<Vec<CostRecord>>>>> = Lazy::new(|| Mutex::new(None));

/// The process-wide demo dataset, generating it on first call.
pub fn dataset() -> Arc<Vec<CostRecord>> {
    let mut cache = DATASET.lock().unwrap();
    cache.get_or_insert_with(|| Arc::new(generate())).clone()
}

/// Drop the cached dataset so the next `dataset()` call regenerates.
#[cfg(test)]
pub fn reset_cache() {
    *DATASET.lock().unwrap() = None;
}

/// The district directory demo mode serves for `/api/districts`.
pub fn districts() -> Vec<District> {
    DISTRICT_ROSTER
        .iter()
        .map(|(id, name)| District {
            lead_district: name.to_string(),
            lead_district_id: id.to_string(),
        })
        .collect()
}

fn generate() -> Vec<CostRecord> {
    let mut rng = rand::thread_rng();
    let mut rows = Vec::new();
    let mut month = FIRST_MONTH;
    for _ in 0..MONTH_SPAN {
        for project in DEMO_PROJECTS {
            let wbs_count = rng.gen_range(2..=4);
            for w in 0..wbs_count {
                rows.push(demo_row(&mut rng, month, project, w));
            }
        }
        month = month.succ();
    }
    // Ascending by fiscal month, then by CBS hierarchy with null as "".
    rows.sort_by(|a, b| {
        a.fiscal_year_month_no
            .cmp(&b.fiscal_year_month_no)
            .then_with(|| {
                a.cbs_hierarchy
                    .as_deref()
                    .unwrap_or("")
                    .cmp(b.cbs_hierarchy.as_deref().unwrap_or(""))
            })
    });
    rows
}

fn demo_row(rng: &mut impl Rng, month: FiscalMonth, project: &str, wbs_index: u32) -> CostRecord {
    // Keep related amounts internally plausible: job-to-date spend is a
    // fraction of the current budget, the forecast hovers around it, and
    // percent complete is their precomputed ratio (may exceed 1.0).
    let cb_amt = rng.gen_range(50_000.0..550_000.0);
    let jtd_spend = cb_amt * rng.gen_range(0.1..0.9);
    let forecast_amt = cb_amt * rng.gen_range(0.9..1.2);
    let jtd_perc_comp = jtd_spend / forecast_amt;
    let (district_id, district_name) = DISTRICT_ROSTER[rng.gen_range(0..DISTRICT_ROSTER.len())];

    CostRecord {
        fiscal_year_month_no: month.to_string(),
        lead_district_id: Some(district_id.to_string()),
        lead_district: Some(district_name.to_string()),
        project_number: project.to_string(),
        cbs_hierarchy: Some(format!(
            "{}.{:02}.001.{:03}",
            project,
            wbs_index + 1,
            rng.gen_range(1..=10)
        )),
        wbs_element: format!("WBS-{}-{:03}", project, wbs_index + 1),
        wbs_description: Some(WBS_DESCRIPTIONS[rng.gen_range(0..WBS_DESCRIPTIONS.len())].to_string()),
        account_code: Some(format!("AC{}", rng.gen_range(1000..10000))),
        unit_of_measure_id: Some(UNITS_OF_MEASURE[rng.gen_range(0..UNITS_OF_MEASURE.len())].to_string()),

        ce_qty: Some(rng.gen_range(100.0..1100.0)),
        cb_qty: Some(rng.gen_range(100.0..1100.0)),
        cb_mhf: Some(rng.gen_range(10.0..60.0)),
        cb_amt: Some(cb_amt),
        cb_unit_cost: Some(cb_amt / rng.gen_range(100.0..600.0)),

        per_qty: Some(rng.gen_range(0.0..100.0)),
        per_perc_comp: Some(rng.gen_range(0.0..0.1)),
        per_mh: Some(rng.gen_range(50.0..550.0)),
        per_mhf: Some(rng.gen_range(1.0..11.0)),
        per_mh_gl: Some(rng.gen_range(-50.0..50.0)),
        per_uom_mh: Some(rng.gen_range(0.5..5.5)),
        per_pf: Some(rng.gen_range(0.5..2.5)),
        per_cf: Some(rng.gen_range(0.8..2.3)),
        per_lei: Some(rng.gen_range(0.9..2.1)),
        per_spend: Some(rng.gen_range(5_000.0..55_000.0)),
        per_unit_cost: Some(rng.gen_range(50.0..550.0)),
        actual_cost_g_per_l: Some(rng.gen_range(-10_000.0..10_000.0)),

        jtd_qty: Some(rng.gen_range(50.0..850.0)),
        jtd_perc_comp: Some(jtd_perc_comp),
        jtd_mh: Some(rng.gen_range(500.0..5_500.0)),
        jtd_mhf: Some(rng.gen_range(5.0..45.0)),
        jtd_mh_gl: Some(rng.gen_range(-250.0..250.0)),
        jtd_uom_mh: Some(rng.gen_range(0.5..5.5)),
        jtd_pf: Some(rng.gen_range(0.5..2.5)),
        jtd_cf: Some(rng.gen_range(0.8..2.3)),
        jtd_lei: Some(rng.gen_range(0.9..2.1)),
        jtd_spend: Some(jtd_spend),
        jtd_unit_cost: Some(jtd_spend / rng.gen_range(100.0..600.0)),
        jtd_cost_g_per_l: Some(rng.gen_range(-25_000.0..25_000.0)),

        forecast_remaining_quantity: Some(rng.gen_range(20.0..320.0)),
        hd_forecast_method: Some(FORECAST_METHODS[rng.gen_range(0..FORECAST_METHODS.len())].to_string()),
        forecast_remaining_mhf: Some(rng.gen_range(2.0..22.0)),
        forecast_mhf: Some(rng.gen_range(10.0..60.0)),
        forecast_remaining_mh: Some(rng.gen_range(200.0..2_200.0)),
        forecast_mh: Some(rng.gen_range(600.0..6_600.0)),
        forecast_mh_g_per_l: Some(rng.gen_range(-150.0..150.0)),
        forecast_remaining_pf: Some(rng.gen_range(0.5..2.5)),
        forecast_pf: Some(rng.gen_range(0.5..2.5)),
        forecast_remaining_cf: Some(rng.gen_range(0.8..2.3)),
        forecast_cf: Some(rng.gen_range(0.8..2.3)),
        forecast_remaining_lei: Some(rng.gen_range(0.9..2.1)),
        forecast_lei: Some(rng.gen_range(0.9..2.1)),
        forecast_remaining_unit_cost: Some(rng.gen_range(50.0..550.0)),
        forecast_unit_cost: Some(rng.gen_range(50.0..550.0)),
        forecast_remaining_amount: Some(forecast_amt - jtd_spend),
        forecast_amount: Some(forecast_amt),
        forecast_amount_g_per_l: Some(rng.gen_range(-15_000.0..15_000.0)),
        forecast_change: Some(rng.gen_range(-15_000.0..35_000.0)),
        sl_variance: Some(rng.gen_range(-50_000.0..50_000.0)),
    }
}
