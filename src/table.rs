// Tabular presentation engine.
//
// Three composable view transforms over an immutable row set: single-column
// sort, global text filter, and fixed-size pagination. The column set is a
// declarative descriptor table consumed by one generic engine; no column
// carries bespoke sort or render code.
use std::cmp::Ordering;

use crate::types::CostRecord;
use crate::util::{format_currency, format_number, format_percent, NULL_CELL};

pub const PAGE_SIZE: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Number,
    Currency,
    Percent,
}

/// A typed cell value pulled out of a row; `None` is a null cell.
pub enum CellValue {
    Text(Option<String>),
    Number(Option<f64>),
}

impl CellValue {
    /// Ordering within one column. Null sorts before every non-null value;
    /// numeric comparison falls back to `Equal` on NaN.
    fn cmp_same_column(&self, other: &CellValue) -> Ordering {
        match (self, other) {
            (CellValue::Text(a), CellValue::Text(b)) => a.cmp(b),
            (CellValue::Number(a), CellValue::Number(b)) => match (a, b) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (Some(a), Some(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            },
            // A column yields one variant only; mixed pairs cannot happen.
            (CellValue::Text(_), CellValue::Number(_)) => Ordering::Less,
            (CellValue::Number(_), CellValue::Text(_)) => Ordering::Greater,
        }
    }
}

pub struct ColumnSpec {
    pub label: &'static str,
    pub kind: ValueKind,
    pub accessor: fn(&CostRecord) -> CellValue,
}

impl ColumnSpec {
    pub fn value(&self, row: &CostRecord) -> CellValue {
        (self.accessor)(row)
    }

    /// Rendered cell text; nulls come out as the em-dash placeholder.
    pub fn render(&self, row: &CostRecord) -> String {
        match self.value(row) {
            CellValue::Text(v) => v.unwrap_or_else(|| NULL_CELL.to_string()),
            CellValue::Number(None) => NULL_CELL.to_string(),
            CellValue::Number(Some(n)) => match self.kind {
                ValueKind::Currency => format_currency(n),
                ValueKind::Percent => format_percent(n),
                _ => format_number(n, 2),
            },
        }
    }
}

/// The dashboard grid, column order matching the original layout.
pub const COLUMNS: &[ColumnSpec] = &[
    ColumnSpec {
        label: "Period",
        kind: ValueKind::Text,
        accessor: |r| CellValue::Text(Some(r.fiscal_year_month_no.clone())),
    },
    ColumnSpec {
        label: "Project",
        kind: ValueKind::Text,
        accessor: |r| CellValue::Text(Some(r.project_number.clone())),
    },
    ColumnSpec {
        label: "District",
        kind: ValueKind::Text,
        accessor: |r| CellValue::Text(r.lead_district.clone()),
    },
    ColumnSpec {
        label: "WBS Element",
        kind: ValueKind::Text,
        accessor: |r| CellValue::Text(Some(r.wbs_element.clone())),
    },
    ColumnSpec {
        label: "CBS Hierarchy",
        kind: ValueKind::Text,
        accessor: |r| CellValue::Text(r.cbs_hierarchy.clone()),
    },
    ColumnSpec {
        label: "Description",
        kind: ValueKind::Text,
        accessor: |r| CellValue::Text(r.wbs_description.clone()),
    },
    ColumnSpec {
        label: "CB Qty",
        kind: ValueKind::Number,
        accessor: |r| CellValue::Number(r.cb_qty),
    },
    ColumnSpec {
        label: "CB Amount",
        kind: ValueKind::Currency,
        accessor: |r| CellValue::Number(r.cb_amt),
    },
    ColumnSpec {
        label: "CB Unit Cost",
        kind: ValueKind::Currency,
        accessor: |r| CellValue::Number(r.cb_unit_cost),
    },
    ColumnSpec {
        label: "Per Qty",
        kind: ValueKind::Number,
        accessor: |r| CellValue::Number(r.per_qty),
    },
    ColumnSpec {
        label: "Per % Comp",
        kind: ValueKind::Percent,
        accessor: |r| CellValue::Number(r.per_perc_comp),
    },
    ColumnSpec {
        label: "Per Spend",
        kind: ValueKind::Currency,
        accessor: |r| CellValue::Number(r.per_spend),
    },
    ColumnSpec {
        label: "JTD Qty",
        kind: ValueKind::Number,
        accessor: |r| CellValue::Number(r.jtd_qty),
    },
    ColumnSpec {
        label: "JTD % Comp",
        kind: ValueKind::Percent,
        accessor: |r| CellValue::Number(r.jtd_perc_comp),
    },
    ColumnSpec {
        label: "JTD Spend",
        kind: ValueKind::Currency,
        accessor: |r| CellValue::Number(r.jtd_spend),
    },
    ColumnSpec {
        label: "Fcst Amount",
        kind: ValueKind::Currency,
        accessor: |r| CellValue::Number(r.forecast_amount),
    },
    ColumnSpec {
        label: "Fcst Remain",
        kind: ValueKind::Currency,
        accessor: |r| CellValue::Number(r.forecast_remaining_amount),
    },
    ColumnSpec {
        label: "Fcst Change",
        kind: ValueKind::Currency,
        accessor: |r| CellValue::Number(r.forecast_change),
    },
    ColumnSpec {
        label: "SL Variance",
        kind: ValueKind::Currency,
        accessor: |r| CellValue::Number(r.sl_variance),
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// View state over a fetched row set. The rows themselves are never
/// mutated; sorting, filtering, and paging are applied on read.
pub struct TableView {
    rows: Vec<CostRecord>,
    sort: Option<(usize, SortDirection)>,
    filter: String,
    page: usize,
}

impl TableView {
    pub fn new(rows: Vec<CostRecord>) -> Self {
        TableView {
            rows,
            sort: None,
            filter: String::new(),
            page: 0,
        }
    }

    pub fn sort_state(&self) -> Option<(usize, SortDirection)> {
        self.sort
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// Cycle the given column through unsorted -> ascending -> descending
    /// -> unsorted, replacing any other column's sort. Out-of-range column
    /// indices are ignored.
    pub fn toggle_sort(&mut self, column: usize) {
        if column >= COLUMNS.len() {
            return;
        }
        self.sort = match self.sort {
            Some((c, SortDirection::Ascending)) if c == column => {
                Some((column, SortDirection::Descending))
            }
            Some((c, SortDirection::Descending)) if c == column => None,
            _ => Some((column, SortDirection::Ascending)),
        };
        self.page = 0;
    }

    /// Set (or clear, with an empty string) the global text filter.
    pub fn set_filter(&mut self, filter: &str) {
        self.filter = filter.to_string();
        self.page = 0;
    }

    /// Count of rows surviving the current filter, across all pages.
    pub fn filtered_count(&self) -> usize {
        self.visible_indices().len()
    }

    pub fn page_count(&self) -> usize {
        self.filtered_count().div_ceil(PAGE_SIZE)
    }

    /// Advance one page; no-op on the last page.
    pub fn next_page(&mut self) {
        if (self.page + 1) * PAGE_SIZE < self.filtered_count() {
            self.page += 1;
        }
    }

    /// Go back one page; no-op on page 0.
    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    /// The rows of the current page, filtered and sorted.
    pub fn page_rows(&self) -> Vec<&CostRecord> {
        let visible = self.visible_indices();
        visible
            .iter()
            .skip(self.page * PAGE_SIZE)
            .take(PAGE_SIZE)
            .map(|&i| &self.rows[i])
            .collect()
    }

    /// Every filtered-and-sorted row, pagination ignored (used by export).
    pub fn ordered_rows(&self) -> Vec<&CostRecord> {
        self.visible_indices()
            .into_iter()
            .map(|i| &self.rows[i])
            .collect()
    }

    fn visible_indices(&self) -> Vec<usize> {
        let needle = self.filter.to_lowercase();
        let mut indices: Vec<usize> = (0..self.rows.len())
            .filter(|&i| needle.is_empty() || row_matches(&self.rows[i], &needle))
            .collect();
        if let Some((column, direction)) = self.sort {
            let spec = &COLUMNS[column];
            indices.sort_by(|&a, &b| {
                spec.value(&self.rows[a])
                    .cmp_same_column(&spec.value(&self.rows[b]))
            });
            // Descending is the exact reverse of ascending, which keeps
            // null cells pinned to the far end.
            if direction == SortDirection::Descending {
                indices.reverse();
            }
        }
        indices
    }
}

/// Case-insensitive substring match against every column's rendered text.
fn row_matches(row: &CostRecord, needle_lower: &str) -> bool {
    COLUMNS
        .iter()
        .any(|c| c.render(row).to_lowercase().contains(needle_lower))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(label: &str) -> usize {
        COLUMNS.iter().position(|c| c.label == label).unwrap()
    }

    fn row(project: &str, amount: Option<f64>) -> CostRecord {
        CostRecord {
            project_number: project.to_string(),
            cb_amt: amount,
            ..Default::default()
        }
    }

    fn amounts(view: &TableView) -> Vec<Option<f64>> {
        view.ordered_rows().iter().map(|r| r.cb_amt).collect()
    }

    #[test]
    fn sort_cycles_and_keeps_nulls_least() {
        let rows = vec![
            row("a", Some(300.0)),
            row("b", None),
            row("c", Some(100.0)),
            row("d", Some(200.0)),
        ];
        let mut view = TableView::new(rows);
        let col = column("CB Amount");

        view.toggle_sort(col);
        assert_eq!(view.sort_state(), Some((col, SortDirection::Ascending)));
        let asc = amounts(&view);
        assert_eq!(asc, vec![None, Some(100.0), Some(200.0), Some(300.0)]);

        view.toggle_sort(col);
        assert_eq!(view.sort_state(), Some((col, SortDirection::Descending)));
        let desc = amounts(&view);
        let mut reversed = asc.clone();
        reversed.reverse();
        assert_eq!(desc, reversed);
        assert_eq!(desc.last(), Some(&None));

        view.toggle_sort(col);
        assert_eq!(view.sort_state(), None);
    }

    #[test]
    fn sorting_another_column_replaces_the_active_sort() {
        let mut view = TableView::new(vec![row("b", Some(1.0)), row("a", Some(2.0))]);
        view.toggle_sort(column("CB Amount"));
        view.toggle_sort(column("Project"));
        assert_eq!(
            view.sort_state(),
            Some((column("Project"), SortDirection::Ascending))
        );
        let projects: Vec<_> = view
            .ordered_rows()
            .iter()
            .map(|r| r.project_number.clone())
            .collect();
        assert_eq!(projects, vec!["a", "b"]);
    }

    #[test]
    fn global_filter_is_case_insensitive_and_idempotent() {
        let mut rows = vec![row("106049", Some(1.0)), row("104831", Some(2.0))];
        rows[0].wbs_description = Some("Structural Steel Installation".to_string());
        let mut view = TableView::new(rows);

        view.set_filter("STEEL");
        assert_eq!(view.filtered_count(), 1);
        let first: Vec<_> = view
            .ordered_rows()
            .iter()
            .map(|r| r.project_number.clone())
            .collect();

        view.set_filter("STEEL");
        let second: Vec<_> = view
            .ordered_rows()
            .iter()
            .map(|r| r.project_number.clone())
            .collect();
        assert_eq!(first, second);

        view.set_filter("");
        assert_eq!(view.filtered_count(), 2);
    }

    #[test]
    fn filter_matches_rendered_numeric_text() {
        let view = {
            let mut v = TableView::new(vec![row("p1", Some(1234567.0)), row("p2", Some(2.0))]);
            // Currency renders with separators, so the needle includes one.
            v.set_filter("1,234,567");
            v
        };
        assert_eq!(view.filtered_count(), 1);
    }

    #[test]
    fn pages_partition_the_filtered_sequence() {
        let rows: Vec<CostRecord> = (0..120).map(|i| row(&format!("p{i:03}"), Some(i as f64))).collect();
        let mut view = TableView::new(rows);
        view.toggle_sort(column("Project"));

        assert_eq!(view.filtered_count(), 120);
        assert_eq!(view.page_count(), 3);

        let full: Vec<String> = view
            .ordered_rows()
            .iter()
            .map(|r| r.project_number.clone())
            .collect();
        let mut concatenated = Vec::new();
        let mut sizes = Vec::new();
        loop {
            let page = view.page_rows();
            sizes.push(page.len());
            concatenated.extend(page.iter().map(|r| r.project_number.clone()));
            let before = view.page();
            view.next_page();
            if view.page() == before {
                break;
            }
        }
        assert_eq!(sizes, vec![50, 50, 20]);
        assert_eq!(concatenated, full);
    }

    #[test]
    fn navigation_is_clamped_and_view_changes_reset_the_page() {
        let rows: Vec<CostRecord> = (0..120).map(|i| row(&format!("p{i}"), None)).collect();
        let mut view = TableView::new(rows);

        view.prev_page();
        assert_eq!(view.page(), 0);

        view.next_page();
        view.next_page();
        assert_eq!(view.page(), 2);
        view.next_page();
        assert_eq!(view.page(), 2);

        view.set_filter("p1");
        assert_eq!(view.page(), 0);

        view.next_page();
        view.toggle_sort(column("Project"));
        assert_eq!(view.page(), 0);
    }

    #[test]
    fn filtered_count_is_independent_of_pagination() {
        let rows: Vec<CostRecord> = (0..75).map(|i| row(&format!("p{i}"), None)).collect();
        let mut view = TableView::new(rows);
        assert_eq!(view.filtered_count(), 75);
        view.next_page();
        assert_eq!(view.filtered_count(), 75);
        assert_eq!(view.page_rows().len(), 25);
    }

    #[test]
    fn null_cells_render_as_placeholder() {
        let r = row("p", None);
        assert_eq!(COLUMNS[column("CB Amount")].render(&r), NULL_CELL);
        assert_eq!(COLUMNS[column("District")].render(&r), NULL_CELL);
    }
}
