use projectdesk_lib::projectdesk_api::FieldErrors;
use projectdesk_lib::{PeriodStatus, TableView};
use serde::Serialize;
use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Longest cell shown before truncation.
const MAX_CELL_WIDTH: usize = 48;

#[derive(Clone, Debug, PartialEq)]
pub enum OutputFormat {
    Table,
    Json,
    Markdown,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Self {
        match s {
            "json" => OutputFormat::Json,
            "markdown" | "md" => OutputFormat::Markdown,
            _ => OutputFormat::Table,
        }
    }
}

#[derive(Tabled, Serialize)]
struct PeriodRow {
    #[tabled(rename = "Period")]
    #[serde(rename = "Period")]
    period_type: String,
    #[tabled(rename = "Open")]
    #[serde(rename = "Open")]
    open: String,
    #[tabled(rename = "Name")]
    #[serde(rename = "Name")]
    name: String,
    #[tabled(rename = "Starts")]
    #[serde(rename = "Starts")]
    starts: String,
    #[tabled(rename = "Ends")]
    #[serde(rename = "Ends")]
    ends: String,
}

fn build_period_row(status: &PeriodStatus) -> PeriodRow {
    let period = status.period.as_ref();
    PeriodRow {
        period_type: status.period_type.to_string(),
        open: if status.is_active { "yes" } else { "no" }.to_string(),
        name: period.map(|p| p.name.clone()).unwrap_or_default(),
        starts: period.and_then(|p| p.start_date.clone()).unwrap_or_default(),
        ends: period.and_then(|p| p.end_date.clone()).unwrap_or_default(),
    }
}

/// Column order for a set of JSON rows: `id` first, then every other key
/// in order of first appearance.
fn columns(rows: &[Value]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for row in rows {
        if let Value::Object(obj) = row {
            for key in obj.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }
    }
    if let Some(pos) = columns.iter().position(|c| c == "id") {
        let id = columns.remove(pos);
        columns.insert(0, id);
    }
    columns
}

fn cell(value: &Value) -> String {
    let text = match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Object(obj) => obj
            .get("name")
            .or_else(|| obj.get("title"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| value.to_string()),
        other => other.to_string(),
    };
    truncate(&text, MAX_CELL_WIDTH)
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", cut)
}

fn build_rows_table(rows: &[Value]) -> Table {
    let columns = columns(rows);
    let mut builder = Builder::default();
    if columns.is_empty() {
        builder.push_record(["value".to_string()]);
        for row in rows {
            builder.push_record([cell(row)]);
        }
        return builder.build();
    }
    builder.push_record(columns.clone());
    for row in rows {
        builder.push_record(
            columns
                .iter()
                .map(|c| row.get(c).map(cell).unwrap_or_default()),
        );
    }
    builder.build()
}

pub fn print_rows(rows: &[Value], format: &OutputFormat) {
    match format {
        OutputFormat::Json => print_json(rows),
        OutputFormat::Markdown => {
            let mut table = build_rows_table(rows);
            table.with(Style::markdown());
            println!("{}", table);
        }
        OutputFormat::Table => println!("{}", build_rows_table(rows)),
    }
}

pub fn print_period(status: &PeriodStatus, format: &OutputFormat) {
    match format {
        OutputFormat::Json => print_json(status),
        OutputFormat::Markdown => {
            let mut table = Table::new([build_period_row(status)]);
            table.with(Style::markdown());
            println!("{}", table);
        }
        OutputFormat::Table => println!("{}", Table::new([build_period_row(status)])),
    }
}

pub fn print_json<T: Serialize + ?Sized>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => tracing::error!("Failed to serialize output: {}", e),
    }
}

/// Summary line printed to stderr under a list.
pub fn page_footer<T>(view: &TableView<T>, label: &str) -> String {
    format!(
        "Page {}/{} ({} total {})",
        view.pagination.page_index + 1,
        view.page_count.max(1),
        view.total_count,
        label
    )
}

pub fn print_field_errors(errors: &FieldErrors) {
    for (field, messages) in errors {
        for message in messages {
            eprintln!("  {}: {}", field, message);
        }
    }
}
