//! Bases and their schema

use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::{Error, Result};
use crate::pipeline::{RequestOptions, RequestPipeline};
use crate::table::{Table, TableSchema};

#[derive(Debug, Deserialize)]
struct SchemaResponse {
    #[serde(default)]
    tables: Vec<TableSchema>,
}

/// A base: a collection of tables sharing one id
#[derive(Clone)]
pub struct Base {
    pipeline: RequestPipeline,
    id: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for Base {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Base")
            .field("id", &self.id)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Base {
    pub fn new(pipeline: RequestPipeline, id: impl Into<String>) -> Self {
        Self {
            pipeline,
            id: id.into(),
            api_key: None,
        }
    }

    /// Use `api_key` for this base and the tables it hands out
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    fn options(&self) -> RequestOptions {
        RequestOptions::new().api_key(self.api_key.clone())
    }

    fn schema_path(&self) -> String {
        format!("meta/bases/{}/tables", self.id)
    }

    /// A table of this base, addressed by id (`tbl...`) or by name
    pub fn table(&self, key: &str) -> Table {
        Table::from_key(self.pipeline.clone(), self.id.clone(), key)
            .with_optional_api_key(self.api_key.clone())
    }

    /// Every table of the base, with its schema metadata
    pub async fn schema(&self) -> Result<Vec<Table>> {
        let response = self.pipeline.get(&self.schema_path(), &self.options()).await?;
        let response: SchemaResponse = serde_json::from_value(response)
            .map_err(|e| Error::Decode(format!("Unexpected schema shape: {e}")))?;

        Ok(response
            .tables
            .into_iter()
            .map(|schema| self.bind(schema))
            .collect())
    }

    /// Create a table with the given field definitions
    pub async fn create_table(
        &self,
        name: &str,
        fields: Vec<Value>,
        description: Option<&str>,
    ) -> Result<Table> {
        if fields.is_empty() {
            return Err(Error::InvalidInput(
                "A table needs at least one field".into(),
            ));
        }

        let body = json!({
            "name": name,
            "fields": fields,
            "description": description,
        });
        let response = self
            .pipeline
            .post(&self.schema_path(), &body, &self.options())
            .await?;
        let schema: TableSchema = serde_json::from_value(response)
            .map_err(|e| Error::Decode(format!("Unexpected table shape: {e}")))?;

        Ok(self.bind(schema))
    }

    fn bind(&self, schema: TableSchema) -> Table {
        Table::from_schema(self.pipeline.clone(), self.id.clone(), schema)
            .with_optional_api_key(self.api_key.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedTransport, ok, test_pipeline};
    use crate::transport::Method;
    use std::sync::Arc;

    #[test]
    fn test_table_key_resolution() {
        let base = Base::new(test_pipeline(Arc::new(ScriptedTransport::default())), "app1");

        let by_id = base.table("tblAbc");
        assert_eq!(by_id.id(), Some("tblAbc"));
        assert_eq!(by_id.name(), None);

        let by_name = base.table("Tasks");
        assert_eq!(by_name.id(), None);
        assert_eq!(by_name.name(), Some("Tasks"));
        assert_eq!(by_name.base_id(), "app1");
    }

    #[tokio::test]
    async fn test_schema() {
        let transport = Arc::new(ScriptedTransport::new(vec![ok(json!({
            "tables": [{
                "id": "tbl1",
                "name": "Tasks",
                "primaryFieldId": "fld1",
                "fields": [{ "id": "fld1", "name": "Name", "type": "singleLineText" }],
                "views": [{ "id": "viw1", "name": "Grid view", "type": "grid" }]
            }]
        }))]));
        let base = Base::new(test_pipeline(transport.clone()), "app1");

        let tables = base.schema().await.unwrap();

        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].id(), Some("tbl1"));
        assert_eq!(tables[0].name(), Some("Tasks"));
        let schema = tables[0].schema().unwrap();
        assert_eq!(schema.primary_field_id.as_deref(), Some("fld1"));
        assert_eq!(schema.fields[0]["type"], "singleLineText");
        assert_eq!(schema.views.len(), 1);

        let request = &transport.requests()[0];
        assert_eq!(request.method, Method::Get);
        assert!(request.url.ends_with("/meta/bases/app1/tables"));
    }

    #[tokio::test]
    async fn test_create_table() {
        let transport = Arc::new(ScriptedTransport::new(vec![ok(json!({
            "id": "tblNEW",
            "name": "Projects",
            "fields": [{ "id": "fld1", "name": "Name", "type": "singleLineText" }]
        }))]));
        let base = Base::new(test_pipeline(transport.clone()), "app1").with_api_key("base-key");

        let fields = vec![json!({ "name": "Name", "type": "singleLineText" })];
        let table = base.create_table("Projects", fields, None).await.unwrap();

        assert_eq!(table.id(), Some("tblNEW"));
        assert_eq!(
            transport.body(0),
            json!({ "name": "Projects", "fields": [{ "name": "Name", "type": "singleLineText" }] })
        );
        assert_eq!(
            transport.requests()[0].header("authorization"),
            Some("Bearer base-key")
        );
    }

    #[tokio::test]
    async fn test_create_table_needs_fields() {
        let transport = Arc::new(ScriptedTransport::default());
        let base = Base::new(test_pipeline(transport.clone()), "app1");

        let result = base.create_table("Empty", Vec::new(), None).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_tables_inherit_base_key() {
        let base = Base::new(test_pipeline(Arc::new(ScriptedTransport::default())), "app1")
            .with_api_key("base-key");
        let table = base.table("Tasks");
        assert_eq!(table.options().api_key.as_deref(), Some("base-key"));
    }
}
