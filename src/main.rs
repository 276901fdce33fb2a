// Entry point and interactive flow.
//
// The dashboard runs as a menu loop: the user edits the three query fields,
// triggers a search explicitly, then browses the result grid with sort,
// filter, paging, and export commands. Editing a field never fetches.
mod demo;
mod gateway;
mod output;
mod table;
mod types;
mod util;

use std::io::{self, Write};

use gateway::Gateway;
use table::TableView;
use types::{CostDataResponse, FiscalMonth, QueryFilters};
use util::format_int;

/// Per-run UI state. The fetch is synchronous, so at most one request is
/// ever outstanding; each installed result still carries the sequence
/// number of the search that produced it, and a result older than the
/// newest installed one is discarded rather than shown.
struct Session {
    filters: QueryFilters,
    view: Option<TableView>,
    response: Option<CostDataResponse>,
    error: Option<String>,
    search_seq: u64,
    installed_seq: u64,
}

impl Session {
    fn new() -> Self {
        Session {
            filters: QueryFilters {
                project_numbers: demo::DEMO_PROJECTS.join(","),
                start_month: "202101".to_string(),
                district_id: String::new(),
            },
            view: None,
            response: None,
            error: None,
            search_seq: 0,
            installed_seq: 0,
        }
    }
}

/// Read a single line of input after printing the common "Enter choice:" prompt.
fn read_choice() -> String {
    prompt("Enter choice: ")
}

fn prompt(label: &str) -> String {
    print!("{}", label);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn handle_search(gateway: &Gateway, session: &mut Session) {
    if !session.filters.start_month.is_empty() {
        if let Err(e) = session.filters.start_month.parse::<FiscalMonth>() {
            println!("{}\n", e);
            return;
        }
    }
    session.search_seq += 1;
    let seq = session.search_seq;
    println!("Fetching cost data...");
    match gateway.fetch_cost_data(&session.filters) {
        Ok(resp) => {
            if seq < session.installed_seq {
                // A later search already landed; drop the stale result.
                return;
            }
            session.installed_seq = seq;
            println!(
                "Fetched {} rows ({} total matching).\n",
                format_int(resp.data.len()),
                format_int(resp.total_count)
            );
            session.view = Some(TableView::new(resp.data.clone()));
            session.response = Some(resp);
            session.error = None;
        }
        Err(e) => {
            // A failed fetch clears the grid; it is never left stale.
            session.view = None;
            session.response = None;
            session.error = Some(e.to_string());
            eprintln!("Error loading data: {}\n", e);
        }
    }
}

fn handle_edit_district(gateway: &Gateway, session: &mut Session) {
    match gateway.fetch_districts() {
        Ok(districts) => {
            println!("Available districts:");
            for d in &districts {
                println!("  {}  {}", d.lead_district_id, d.lead_district);
            }
        }
        Err(e) => eprintln!("Could not load district directory: {}", e),
    }
    session.filters.district_id = prompt("District id (blank for all): ");
    println!();
}

fn handle_filter_options(gateway: &Gateway, session: &Session) {
    match gateway.fetch_filter_options() {
        Ok(options) => {
            println!("Districts:");
            for d in &options.districts {
                println!("  {}  {}", d.lead_district_id, d.lead_district);
            }
            match (options.fiscal_months.first(), options.fiscal_months.last()) {
                (Some(first), Some(last)) => println!(
                    "Fiscal months: {} ({} through {})",
                    format_int(options.fiscal_months.len()),
                    first,
                    last
                ),
                _ => println!("Fiscal months: none"),
            }
        }
        Err(e) => eprintln!("Could not load filter options: {}", e),
    }
    let district = (!session.filters.district_id.is_empty())
        .then_some(session.filters.district_id.as_str());
    match gateway.fetch_projects(district) {
        Ok(projects) => {
            let numbers: Vec<&str> = projects.iter().map(|p| p.project_number.as_str()).collect();
            println!("Projects: {}\n", numbers.join(", "));
        }
        Err(e) => eprintln!("Could not load project directory: {}\n", e),
    }
}

fn handle_export(session: &Session) {
    let (Some(view), Some(response)) = (&session.view, &session.response) else {
        println!("No data loaded. Run a search first.\n");
        return;
    };
    if let Err(e) = output::write_view_csv("cost_view.csv", view) {
        eprintln!("Write error: {}", e);
        return;
    }
    if let Err(e) = output::write_json("cost_view.json", response) {
        eprintln!("Write error: {}", e);
        return;
    }
    println!(
        "Exported {} rows to cost_view.csv (envelope in cost_view.json).\n",
        format_int(view.filtered_count())
    );
}

fn browse(session: &mut Session) {
    if session.view.is_none() {
        println!("No data loaded. Run a search first.\n");
        return;
    }
    loop {
        if let Some(view) = &session.view {
            output::print_page(view);
        }
        println!(
            "[s <col>] sort  [c] columns  [f <text>] filter  [f] clear  [n] next  [p] prev  [e] export  [b] back"
        );
        let input = read_choice();
        let (cmd, arg) = match input.split_once(' ') {
            Some((cmd, arg)) => (cmd, arg.trim()),
            None => (input.as_str(), ""),
        };
        let Some(view) = session.view.as_mut() else {
            return;
        };
        match cmd {
            "s" => match arg.parse::<usize>() {
                Ok(n) if (1..=table::COLUMNS.len()).contains(&n) => view.toggle_sort(n - 1),
                _ => println!(
                    "Sort needs a column number 1-{} (see [c]).\n",
                    table::COLUMNS.len()
                ),
            },
            "c" => output::print_columns(),
            "f" => view.set_filter(arg),
            "n" => view.next_page(),
            "p" => view.prev_page(),
            "e" => handle_export(session),
            "b" | "q" => return,
            _ => println!("Unknown command.\n"),
        }
    }
}

fn print_menu(session: &Session) {
    if let Some(err) = &session.error {
        println!("Error loading data: {}", err);
        println!();
    }
    println!("Cost Dashboard");
    println!(
        "[1] Project numbers ({})",
        if session.filters.project_numbers.is_empty() {
            "all"
        } else {
            session.filters.project_numbers.as_str()
        }
    );
    println!(
        "[2] Start month ({})",
        if session.filters.start_month.is_empty() {
            "none"
        } else {
            session.filters.start_month.as_str()
        }
    );
    println!(
        "[3] District ({})",
        if session.filters.district_id.is_empty() {
            "all"
        } else {
            session.filters.district_id.as_str()
        }
    );
    println!("[4] Search");
    println!("[5] Browse results");
    println!("[6] Filter options");
    println!("[7] Exit\n");
}

/// Pick live mode when a server URL is given via `--server <url>` (or
/// `--server=<url>`) or the `COST_DASHBOARD_SERVER` variable; demo mode
/// otherwise.
fn gateway_from_args() -> Gateway {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--server" {
            if let Some(url) = args.next() {
                return Gateway::live(url);
            }
        } else if let Some(url) = arg.strip_prefix("--server=") {
            return Gateway::live(url);
        }
    }
    match std::env::var("COST_DASHBOARD_SERVER") {
        Ok(url) if !url.is_empty() => Gateway::live(url),
        _ => Gateway::demo(),
    }
}

fn main() {
    let gateway = gateway_from_args();
    if gateway.is_demo() {
        println!("Demo mode: serving simulated data. Pass --server <url> for live data.\n");
    }
    let mut session = Session::new();
    loop {
        print_menu(&session);
        match read_choice().as_str() {
            "1" => {
                session.filters.project_numbers =
                    prompt("Project numbers, comma-separated (blank for all): ");
                println!();
            }
            "2" => {
                session.filters.start_month = prompt("Start month YYYYMM (blank for all): ");
                println!();
            }
            "3" => handle_edit_district(&gateway, &mut session),
            "4" => handle_search(&gateway, &mut session),
            "5" => browse(&mut session),
            "6" => handle_filter_options(&gateway, &session),
            "7" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 1-7.\n"),
        }
    }
}
