//! tables command - List the tables of a base

use clap::Args;
use serde::Serialize;

use ab_core::TableSchema;

use super::{Connection, fail, open_base};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

#[derive(Args, Debug)]
pub struct TablesArgs {
    /// Base id (app...)
    pub base: String,

    /// Also list every field with its type
    #[arg(short, long)]
    pub long: bool,
}

#[derive(Debug, Serialize)]
struct TablesOutput {
    base: String,
    tables: Vec<TableSchema>,
}

/// Execute the tables command
pub async fn execute(args: TablesArgs, connection: &Connection, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let base = match open_base(&args.base, connection, &formatter) {
        Ok(base) => base,
        Err(code) => return code,
    };

    let schemas: Vec<TableSchema> = match base.schema().await {
        Ok(tables) => tables
            .iter()
            .filter_map(|table| table.schema().cloned())
            .collect(),
        Err(e) => return fail(&formatter, "Failed to read schema", &e),
    };

    if formatter.is_json() {
        formatter.json(&TablesOutput {
            base: args.base,
            tables: schemas,
        });
    } else if schemas.is_empty() {
        formatter.println("No tables found.");
    } else if args.long {
        for schema in &schemas {
            formatter.println(&format!(
                "{} {}",
                formatter.style_name(&schema.name),
                formatter.style_id(&schema.id)
            ));
            for field in &schema.fields {
                let name = field.get("name").and_then(|v| v.as_str()).unwrap_or("?");
                let kind = field.get("type").and_then(|v| v.as_str()).unwrap_or("?");
                formatter.println(&format!("  {} {kind}", formatter.style_key(name)));
            }
        }
    } else {
        let rows: Vec<Vec<String>> = schemas
            .iter()
            .map(|schema| {
                vec![
                    schema.id.clone(),
                    schema.name.clone(),
                    schema.fields.len().to_string(),
                    primary_field_name(schema).unwrap_or_default(),
                ]
            })
            .collect();
        formatter.table(
            vec!["id".into(), "name".into(), "fields".into(), "primary".into()],
            rows,
        );
    }

    ExitCode::Success
}

fn primary_field_name(schema: &TableSchema) -> Option<String> {
    let primary = schema.primary_field_id.as_deref()?;
    schema
        .fields
        .iter()
        .find(|field| field.get("id").and_then(|v| v.as_str()) == Some(primary))
        .and_then(|field| field.get("name"))
        .and_then(|name| name.as_str())
        .map(str::to_string)
}
