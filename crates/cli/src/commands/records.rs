//! records commands - Read and write table records
//!
//! Record data is passed as JSON with `--data`, either inline or as
//! `@path/to/file.json`. A value may be a single record or an array of
//! records; each record is either a bare field map or `{"id": ..., "fields": {...}}`.

use clap::{Args, Subcommand};
use serde::Serialize;
use serde_json::Value;

use ab_core::{Fields, ListParams, Record, RecordInput, RecordSummary, Sort, Table, UpdateOptions};

use super::{Connection, fail, open_base};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Record subcommands
#[derive(Subcommand, Debug)]
pub enum RecordsCommands {
    /// List records
    List(ListArgs),

    /// Show one record
    Get(GetArgs),

    /// Create records
    Create(WriteArgs),

    /// Update existing records (each needs an id)
    Update(UpdateArgs),

    /// Create or update records, matching on one to three fields
    Upsert(UpsertArgs),

    /// Delete records by id
    Delete(DeleteArgs),
}

/// Base and table a command works on
#[derive(Args, Debug)]
pub struct TableArgs {
    /// Base id (app...)
    pub base: String,

    /// Table id (tbl...) or name
    pub table: String,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub target: TableArgs,

    /// Only records visible in this view
    #[arg(long)]
    pub view: Option<String>,

    /// Only records for which this formula is truthy
    #[arg(long)]
    pub formula: Option<String>,

    #[arg(long)]
    pub max_records: Option<u32>,

    #[arg(long)]
    pub page_size: Option<u32>,

    /// Only return these fields (repeatable)
    #[arg(short, long = "field", value_name = "FIELD")]
    pub fields: Vec<String>,

    /// Sort by FIELD or FIELD:desc (repeatable)
    #[arg(long, value_name = "FIELD[:asc|desc]")]
    pub sort: Vec<String>,

    /// Resume from a pagination offset
    #[arg(long)]
    pub offset: Option<String>,

    /// Fetch a single page and print the next offset
    #[arg(long)]
    pub single_page: bool,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    #[command(flatten)]
    pub target: TableArgs,

    /// Record id (rec...)
    pub id: String,
}

#[derive(Args, Debug)]
pub struct WriteArgs {
    #[command(flatten)]
    pub target: TableArgs,

    /// Record JSON, or @FILE
    #[arg(short, long)]
    pub data: String,

    /// Let the server convert values to each field's type
    #[arg(long)]
    pub typecast: bool,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    #[command(flatten)]
    pub write: WriteArgs,

    /// Clear every field not given (PUT instead of PATCH)
    #[arg(long)]
    pub replace: bool,
}

#[derive(Args, Debug)]
pub struct UpsertArgs {
    #[command(flatten)]
    pub write: WriteArgs,

    /// Fields identifying an existing record
    #[arg(long, required = true, num_args = 1..=3, value_name = "FIELD")]
    pub merge_on: Vec<String>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    #[command(flatten)]
    pub target: TableArgs,

    /// Record ids
    #[arg(required = true, num_args = 1..)]
    pub ids: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ListOutput {
    records: Vec<RecordSummary>,
    count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<String>,
}

#[derive(Debug, Serialize)]
struct UpsertOutput {
    records: Vec<RecordSummary>,
    created: Vec<String>,
    updated: Vec<String>,
}

#[derive(Debug, Serialize)]
struct DeleteOutput {
    deleted: Vec<String>,
    count: usize,
}

/// Execute a records subcommand
pub async fn execute(cmd: RecordsCommands, connection: &Connection, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    match cmd {
        RecordsCommands::List(args) => execute_list(args, connection, &formatter).await,
        RecordsCommands::Get(args) => execute_get(args, connection, &formatter).await,
        RecordsCommands::Create(args) => execute_create(args, connection, &formatter).await,
        RecordsCommands::Update(args) => execute_update(args, connection, &formatter).await,
        RecordsCommands::Upsert(args) => execute_upsert(args, connection, &formatter).await,
        RecordsCommands::Delete(args) => execute_delete(args, connection, &formatter).await,
    }
}

fn open_table(target: &TableArgs, connection: &Connection, formatter: &Formatter) -> Result<Table, ExitCode> {
    open_base(&target.base, connection, formatter).map(|base| base.table(&target.table))
}

async fn execute_list(args: ListArgs, connection: &Connection, formatter: &Formatter) -> ExitCode {
    let sort = match args.sort.iter().map(|raw| parse_sort(raw)).collect::<Result<Vec<_>, _>>() {
        Ok(sort) => sort,
        Err(e) => {
            formatter.error(&e);
            return ExitCode::UsageError;
        }
    };

    let table = match open_table(&args.target, connection, formatter) {
        Ok(table) => table,
        Err(code) => return code,
    };

    let params = ListParams {
        offset: args.offset,
        page_size: args.page_size,
        max_records: args.max_records,
        fields: (!args.fields.is_empty()).then(|| args.fields.clone()),
        view: args.view,
        sort: (!sort.is_empty()).then_some(sort),
        filter_by_formula: args.formula,
        ..ListParams::default()
    };

    let (records, offset) = if args.single_page {
        match table.page(&params).await {
            Ok(page) => (page.items, page.offset),
            Err(e) => return fail(formatter, "Failed to list records", &e),
        }
    } else {
        match table.all(params).await {
            Ok(records) => (records, None),
            Err(e) => return fail(formatter, "Failed to list records", &e),
        }
    };

    if formatter.is_json() {
        formatter.json(&ListOutput {
            count: records.len(),
            records: records.iter().map(Record::summary).collect(),
            offset,
        });
    } else if records.is_empty() {
        formatter.println("No records found.");
    } else {
        let columns = columns(&records, &args.fields);
        let rows: Vec<Vec<String>> = records
            .iter()
            .map(|record| {
                std::iter::once(record.id().unwrap_or_default().to_string())
                    .chain(
                        columns
                            .iter()
                            .map(|name| record.get(name).map(render_cell).unwrap_or_default()),
                    )
                    .collect()
            })
            .collect();
        let header: Vec<String> = std::iter::once("id".to_string()).chain(columns).collect();
        formatter.table(header, rows);

        if let Some(offset) = offset {
            formatter.println(&format!("Next page: --offset {}", formatter.style_key(&offset)));
        }
    }

    ExitCode::Success
}

async fn execute_get(args: GetArgs, connection: &Connection, formatter: &Formatter) -> ExitCode {
    let table = match open_table(&args.target, connection, formatter) {
        Ok(table) => table,
        Err(code) => return code,
    };

    let record = match table.find(&args.id).await {
        Ok(record) => record,
        Err(e) => return fail(formatter, &format!("Failed to get record '{}'", args.id), &e),
    };

    if formatter.is_json() {
        formatter.json(&record.summary());
        return ExitCode::Success;
    }

    formatter.println(&formatter.style_name(record.id().unwrap_or_default()));
    if let Some(created) = record.created_time() {
        formatter.println(&format!("  created {}", formatter.style_date(&created.to_string())));
    }
    if let Ok(link) = record.link() {
        formatter.println(&format!("  {}", formatter.style_url(&link)));
    }
    let width = record.fields().keys().map(|name| name.chars().count()).max().unwrap_or(0);
    for (name, value) in record.fields() {
        let padded = format!("{name:<width$}");
        formatter.println(&format!("  {}  {}", formatter.style_key(&padded), render_cell(value)));
    }

    ExitCode::Success
}

async fn execute_create(args: WriteArgs, connection: &Connection, formatter: &Formatter) -> ExitCode {
    let inputs = match load_records(&args.data) {
        Ok(inputs) => inputs,
        Err(e) => {
            formatter.error(&e);
            return ExitCode::UsageError;
        }
    };
    if inputs.iter().any(|input| input.id.is_some()) {
        formatter.error("Records to create must not carry an id; use `records update` or `records upsert`");
        return ExitCode::UsageError;
    }

    let table = match open_table(&args.target, connection, formatter) {
        Ok(table) => table,
        Err(code) => return code,
    };

    let fields: Vec<Fields> = inputs.into_iter().map(|input| input.fields).collect();
    match table.create(fields, args.typecast).await {
        Ok(records) => {
            report_written(formatter, "Created", &records);
            ExitCode::Success
        }
        Err(e) => fail(formatter, "Failed to create records", &e),
    }
}

async fn execute_update(args: UpdateArgs, connection: &Connection, formatter: &Formatter) -> ExitCode {
    let inputs = match load_records(&args.write.data) {
        Ok(inputs) => inputs,
        Err(e) => {
            formatter.error(&e);
            return ExitCode::UsageError;
        }
    };

    let table = match open_table(&args.write.target, connection, formatter) {
        Ok(table) => table,
        Err(code) => return code,
    };

    let options = UpdateOptions {
        overwrite: args.replace,
        typecast: args.write.typecast,
    };
    match table.update(inputs, options).await {
        Ok(records) => {
            report_written(formatter, "Updated", &records);
            ExitCode::Success
        }
        Err(e) => fail(formatter, "Failed to update records", &e),
    }
}

async fn execute_upsert(args: UpsertArgs, connection: &Connection, formatter: &Formatter) -> ExitCode {
    let inputs = match load_records(&args.write.data) {
        Ok(inputs) => inputs,
        Err(e) => {
            formatter.error(&e);
            return ExitCode::UsageError;
        }
    };

    let table = match open_table(&args.write.target, connection, formatter) {
        Ok(table) => table,
        Err(code) => return code,
    };

    let merge_on: Vec<&str> = args.merge_on.iter().map(String::as_str).collect();
    match table.upsert(inputs, &merge_on, args.write.typecast).await {
        Ok(result) => {
            if formatter.is_json() {
                formatter.json(&UpsertOutput {
                    records: result.records.iter().map(Record::summary).collect(),
                    created: result.created_ids,
                    updated: result.updated_ids,
                });
            } else {
                formatter.success(&format!(
                    "Upserted {} record(s): {} created, {} updated",
                    result.records.len(),
                    result.created_ids.len(),
                    result.updated_ids.len()
                ));
            }
            ExitCode::Success
        }
        Err(e) => fail(formatter, "Failed to upsert records", &e),
    }
}

async fn execute_delete(args: DeleteArgs, connection: &Connection, formatter: &Formatter) -> ExitCode {
    let table = match open_table(&args.target, connection, formatter) {
        Ok(table) => table,
        Err(code) => return code,
    };

    match table.delete(args.ids.clone()).await {
        Ok(deleted) => {
            if deleted.len() < args.ids.len() {
                formatter.warning(&format!(
                    "Only {} of {} record(s) were reported deleted",
                    deleted.len(),
                    args.ids.len()
                ));
            }
            if formatter.is_json() {
                formatter.json(&DeleteOutput {
                    count: deleted.len(),
                    deleted,
                });
            } else {
                formatter.success(&format!("Deleted {} record(s)", deleted.len()));
            }
            ExitCode::Success
        }
        Err(e) => fail(formatter, "Failed to delete records", &e),
    }
}

fn report_written(formatter: &Formatter, verb: &str, records: &[Record]) {
    if formatter.is_json() {
        let summaries: Vec<RecordSummary> = records.iter().map(Record::summary).collect();
        formatter.json(&summaries);
        return;
    }

    formatter.success(&format!("{verb} {} record(s)", records.len()));
    for record in records {
        formatter.println(&format!("  {}", formatter.style_id(record.id().unwrap_or_default())));
    }
}

/// Column order: requested fields, else every field name in first-seen order
fn columns(records: &[Record], requested: &[String]) -> Vec<String> {
    if !requested.is_empty() {
        return requested.to_vec();
    }

    let mut columns: Vec<String> = Vec::new();
    for record in records {
        for name in record.fields().keys() {
            if !columns.contains(name) {
                columns.push(name.clone());
            }
        }
    }
    columns
}

/// Human rendering of a cell value
fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) if items.iter().all(Value::is_string) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

/// Parse `FIELD`, `FIELD:asc` or `FIELD:desc`
fn parse_sort(raw: &str) -> Result<Sort, String> {
    match raw.rsplit_once(':') {
        Some((field, "asc")) if !field.is_empty() => Ok(Sort::asc(field)),
        Some((field, "desc")) if !field.is_empty() => Ok(Sort::desc(field)),
        Some((_, direction)) if direction == "asc" || direction == "desc" => {
            Err(format!("Invalid sort '{raw}': field name is empty"))
        }
        _ if raw.is_empty() => Err("Sort field cannot be empty".to_string()),
        _ => Ok(Sort::asc(raw)),
    }
}

/// Read `--data`: inline JSON or `@file`
fn load_records(data: &str) -> Result<Vec<RecordInput>, String> {
    let raw = match data.strip_prefix('@') {
        Some(path) => {
            std::fs::read_to_string(path).map_err(|e| format!("Failed to read '{path}': {e}"))?
        }
        None => data.to_string(),
    };
    parse_records(&raw)
}

fn parse_records(raw: &str) -> Result<Vec<RecordInput>, String> {
    let value: Value = serde_json::from_str(raw).map_err(|e| format!("Invalid JSON data: {e}"))?;
    let items = match value {
        Value::Array(items) => items,
        other => vec![other],
    };
    if items.is_empty() {
        return Err("No records given".to_string());
    }
    items.into_iter().map(parse_record).collect()
}

fn parse_record(value: Value) -> Result<RecordInput, String> {
    let Value::Object(mut map) = value else {
        return Err("Each record must be a JSON object".to_string());
    };

    match map.remove("fields") {
        Some(Value::Object(fields)) => {
            let id = match map.remove("id") {
                None => None,
                Some(Value::String(id)) => Some(id),
                Some(_) => return Err("Record id must be a string".to_string()),
            };
            Ok(RecordInput { id, fields })
        }
        Some(_) => Err("'fields' must be a JSON object".to_string()),
        None => Ok(RecordInput { id: None, fields: map }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ab_core::Direction;
    use serde_json::json;

    #[test]
    fn test_parse_sort() {
        assert_eq!(parse_sort("Name").unwrap(), Sort::asc("Name"));
        assert_eq!(parse_sort("Due Date:desc").unwrap().direction, Direction::Desc);
        assert_eq!(parse_sort("Ratio:1").unwrap().field, "Ratio:1");
        assert!(parse_sort(":desc").is_err());
        assert!(parse_sort("").is_err());
    }

    #[test]
    fn test_parse_bare_field_map() {
        let records = parse_records(r#"{"Name": "Ada", "Age": 36}"#).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, None);
        assert_eq!(records[0].fields["Age"], 36);
    }

    #[test]
    fn test_parse_records_with_ids() {
        let records = parse_records(
            r#"[{"id": "rec1", "fields": {"Name": "Ada"}}, {"fields": {"Name": "Grace"}}]"#,
        )
        .unwrap();
        assert_eq!(records[0].id.as_deref(), Some("rec1"));
        assert_eq!(records[1].id, None);
        assert_eq!(records[1].fields["Name"], "Grace");
    }

    #[test]
    fn test_parse_records_rejects_bad_shapes() {
        assert!(parse_records("[]").is_err());
        assert!(parse_records("[1, 2]").is_err());
        assert!(parse_records(r#"{"fields": [1]}"#).is_err());
        assert!(parse_records(r#"{"id": 7, "fields": {}}"#).is_err());
        assert!(parse_records("{not json").is_err());
    }

    #[test]
    fn test_load_records_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("records.json");
        std::fs::write(&path, r#"[{"Name": "Ada"}]"#).unwrap();

        let records = load_records(&format!("@{}", path.display())).unwrap();
        assert_eq!(records[0].fields["Name"], "Ada");

        assert!(load_records("@/nonexistent/records.json").is_err());
    }

    #[test]
    fn test_render_cell() {
        assert_eq!(render_cell(&json!(null)), "");
        assert_eq!(render_cell(&json!("text")), "text");
        assert_eq!(render_cell(&json!(["a", "b"])), "a, b");
        assert_eq!(render_cell(&json!(3.5)), "3.5");
        assert_eq!(render_cell(&json!(true)), "true");
        assert_eq!(render_cell(&json!([{ "id": "att1" }])), r#"[{"id":"att1"}]"#);
    }
}
