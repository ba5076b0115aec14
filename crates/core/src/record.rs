//! Records
//!
//! A record is one row of a table: a server-assigned id, a creation time and
//! a map of field name to value. Records built locally with
//! [`Table::new_record`] have no id until saved.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::{Error, Result};
use crate::table::Table;

/// Field name to cell value
pub type Fields = Map<String, Value>;

/// Web UI root used by [`Record::link`]
pub const WEB_URL: &str = "https://airtable.com";

/// Options for updating existing records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Replace all fields (PUT) instead of merging the given ones (PATCH)
    pub overwrite: bool,
    /// Ask the server to coerce values to each field's type
    pub typecast: bool,
}

impl UpdateOptions {
    pub fn typecast(typecast: bool) -> Self {
        Self {
            typecast,
            ..Self::default()
        }
    }
}

/// Record shape after key decoding
#[derive(Debug, Deserialize)]
pub(crate) struct RecordPayload {
    pub id: String,
    #[serde(default)]
    pub created_time: Option<String>,
    #[serde(default)]
    pub fields: Fields,
}

/// Record data submitted in a bulk write
#[derive(Debug, Clone, PartialEq)]
pub struct RecordInput {
    pub id: Option<String>,
    pub fields: Fields,
}

impl RecordInput {
    pub(crate) fn to_value(&self) -> Value {
        match &self.id {
            Some(id) => json!({ "id": id, "fields": self.fields }),
            None => json!({ "fields": self.fields }),
        }
    }
}

impl From<Fields> for RecordInput {
    fn from(fields: Fields) -> Self {
        Self { id: None, fields }
    }
}

impl From<&Record> for RecordInput {
    fn from(record: &Record) -> Self {
        Self {
            id: record.id.clone(),
            fields: record.fields.clone(),
        }
    }
}

impl From<Record> for RecordInput {
    fn from(record: Record) -> Self {
        Self {
            id: record.id,
            fields: record.fields,
        }
    }
}

/// Serializable view of a record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordSummary {
    pub id: Option<String>,
    pub fields: Fields,
    pub created_time: Option<Timestamp>,
    pub table: String,
    pub base: String,
}

/// One row of a table
#[derive(Debug, Clone)]
pub struct Record {
    id: Option<String>,
    created_time: Option<Timestamp>,
    fields: Fields,
    table: Table,
    destroyed: bool,
}

impl Record {
    /// A new, unsaved record
    pub fn new(table: Table, fields: Fields) -> Self {
        Self {
            id: None,
            created_time: None,
            fields,
            table,
            destroyed: false,
        }
    }

    pub(crate) fn from_payload(table: &Table, payload: RecordPayload) -> Result<Self> {
        let created_time = payload
            .created_time
            .map(|raw| {
                raw.parse::<Timestamp>()
                    .map_err(|e| Error::Decode(format!("Invalid createdTime '{raw}': {e}")))
            })
            .transpose()?;

        Ok(Self {
            id: Some(payload.id),
            created_time,
            fields: payload.fields,
            table: table.clone(),
            destroyed: false,
        })
    }

    pub(crate) fn from_value(table: &Table, value: Value) -> Result<Self> {
        let payload: RecordPayload = serde_json::from_value(value)
            .map_err(|e| Error::Decode(format!("Unexpected record shape: {e}")))?;
        Self::from_payload(table, payload)
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn created_time(&self) -> Option<Timestamp> {
        self.created_time
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut Fields {
        &mut self.fields
    }

    /// Replace every field
    pub fn set_fields(&mut self, fields: Fields) {
        self.fields = fields;
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Not yet saved to the server
    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Deleted through [`Record::delete`]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Value of one field; `None` when the cell is empty
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Merge `fields` into the record, keeping fields not mentioned
    pub fn assign(&mut self, fields: Fields) {
        self.fields.extend(fields);
    }

    /// Link to the record in the web UI
    pub fn link(&self) -> Result<String> {
        let id = self
            .id
            .as_deref()
            .ok_or_else(|| Error::InvalidInput("Record has no id yet; save it first".into()))?;
        let table_id = self.table.id().ok_or_else(|| {
            Error::InvalidInput("Record links need the table id, not its name".into())
        })?;
        Ok(format!("{WEB_URL}/{}/{table_id}/{id}", self.table.base_id()))
    }

    pub fn summary(&self) -> RecordSummary {
        RecordSummary {
            id: self.id.clone(),
            fields: self.fields.clone(),
            created_time: self.created_time,
            table: self.table.table_key(),
            base: self.table.base_id().to_string(),
        }
    }

    fn persisted_id(&self) -> Result<String> {
        if self.destroyed {
            return Err(Error::InvalidInput("Record has been deleted".into()));
        }
        self.id.clone().ok_or_else(|| {
            Error::InvalidInput("Record has not been saved; use save() to create it".into())
        })
    }

    /// Update this record on the server and adopt the returned fields
    pub async fn update(&mut self, fields: Fields, options: UpdateOptions) -> Result<()> {
        let id = self.persisted_id()?;
        let updated = self.table.update_one(&id, fields, options).await?;
        self.fields = updated.fields;
        Ok(())
    }

    /// Create the record if it is new, otherwise update it with its current fields
    pub async fn save(&mut self, typecast: bool) -> Result<()> {
        if self.destroyed {
            return Err(Error::InvalidInput("Record has been deleted".into()));
        }

        if self.is_new() {
            let created = self.table.create_one(self.fields.clone(), typecast).await?;
            self.id = created.id;
            self.created_time = created.created_time;
            self.fields = created.fields;
            Ok(())
        } else {
            self.update(self.fields.clone(), UpdateOptions::typecast(typecast))
                .await
        }
    }

    /// Delete this record on the server
    pub async fn delete(&mut self) -> Result<()> {
        let id = self.persisted_id()?;
        self.table.delete_one(&id).await?;
        self.destroyed = true;
        Ok(())
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.fields == other.fields
            && self.created_time == other.created_time
            && self.table.base_id() == other.table.base_id()
            && self.table.table_key() == other.table.table_key()
    }
}
