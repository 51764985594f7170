// src/sheets/models.rs

/// Published CSV export of the daily schedule tab.
pub const DAILY_SHEET_URL: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vRbgw-2QiguaDpy7rl9AZUQxtPV3T55TDseLAHBQE3z7ef0niqrasuil7Bg0V-KDzvBLCTfb5BnH-7Z/pub?gid=1952632243&single=true&output=csv";
/// Published CSV export of the weekly schedule tab.
pub const WEEKLY_SHEET_URL: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vRbgw-2QiguaDpy7rl9AZUQxtPV3T55TDseLAHBQE3z7ef0niqrasuil7Bg0V-KDzvBLCTfb5BnH-7Z/pub?gid=0&single=true&output=csv";

/// One schedule tab to fetch and extract.
#[derive(Debug, Clone)]
pub struct SheetSource {
    pub name: String,       // e.g., "Daily"
    pub url: String,        // CSV export URL
    pub date_row: usize,    // 0-based row holding the date tokens; the time row sits directly below
}

impl SheetSource {
    pub fn new(name: &str, url: &str, date_row: usize) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            date_row,
        }
    }
}

