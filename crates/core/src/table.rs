//! Tables
//!
//! A [`Table`] addresses one table of a base by id or by name and exposes
//! record queries and bulk writes. Bulk writes go through the batch slicer
//! (ten records per request), listing goes through the paginator.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::batch::run_batched_max;
use crate::error::{Error, Result};
use crate::paginate::{Page, collect_all};
use crate::pipeline::{RequestOptions, RequestPipeline};
use crate::record::{Fields, Record, RecordInput, RecordPayload, UpdateOptions};
use crate::transport::Method;

/// Prefix of table ids
const TABLE_ID_PREFIX: &str = "tbl";

/// Fields matched by an upsert: at least one, at most three
pub const MAX_MERGE_FIELDS: usize = 3;

/// Whether `key` looks like a table id (`tbl` followed by alphanumerics)
pub fn is_table_id(key: &str) -> bool {
    key.strip_prefix(TABLE_ID_PREFIX)
        .is_some_and(|rest| !rest.is_empty() && rest.chars().all(char::is_alphanumeric))
}

/// Sort direction for list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

/// One sort criterion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    #[serde(default)]
    pub direction: Direction,
}

impl Sort {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Desc,
        }
    }
}

/// Parameters of a list query.
///
/// Serialized with snake_case keys; the pipeline converts them to the
/// API's camelCase on the way out. Unset parameters are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListParams {
    /// Cursor to resume from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    /// Upper bound on records across all pages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_records: Option<u32>,
    /// Only return these fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Vec<Sort>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_by_formula: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_locale: Option<String>,
    /// `json` or `string`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_fields_by_field_id: Option<bool>,
    /// e.g. `["commentCount"]`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_metadata: Option<Vec<String>>,
}

/// Result of an upsert
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpsertResult {
    /// Every submitted record as stored, in input order
    pub records: Vec<Record>,
    pub created_ids: Vec<String>,
    pub updated_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RecordsResponse {
    #[serde(default)]
    records: Vec<RecordPayload>,
    #[serde(default)]
    offset: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpsertResponse {
    #[serde(default)]
    records: Vec<RecordPayload>,
    #[serde(default)]
    created_records: Vec<String>,
    #[serde(default)]
    updated_records: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct DeletedRecord {
    id: String,
    #[serde(default)]
    deleted: bool,
}

#[derive(Debug, Deserialize)]
struct DeleteResponse {
    #[serde(default)]
    records: Vec<DeletedRecord>,
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| Error::Decode(e.to_string()))
}

/// Table schema as returned by the metadata API
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableSchema {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub primary_field_id: Option<String>,
    /// Field definitions, with the API's own key casing
    #[serde(default)]
    pub fields: Vec<Value>,
    #[serde(default)]
    pub views: Vec<Value>,
}

/// A table within a base
#[derive(Clone)]
pub struct Table {
    pipeline: RequestPipeline,
    base_id: String,
    id: Option<String>,
    name: Option<String>,
    api_key: Option<String>,
    schema: Option<TableSchema>,
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("base_id", &self.base_id)
            .field("id", &self.id)
            .field("name", &self.name)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Table {
    /// Address a table by id, name, or both
    pub fn new(
        pipeline: RequestPipeline,
        base_id: impl Into<String>,
        id: Option<String>,
        name: Option<String>,
    ) -> Result<Self> {
        if id.is_none() && name.is_none() {
            return Err(Error::InvalidInput(
                "A table needs an id or a name".to_string(),
            ));
        }

        Ok(Self {
            pipeline,
            base_id: base_id.into(),
            id,
            name,
            api_key: None,
            schema: None,
        })
    }

    /// Address a table by a key that is either its id or its name
    pub fn from_key(pipeline: RequestPipeline, base_id: impl Into<String>, key: &str) -> Self {
        let (id, name) = if is_table_id(key) {
            (Some(key.to_string()), None)
        } else {
            (None, Some(key.to_string()))
        };

        Self {
            pipeline,
            base_id: base_id.into(),
            id,
            name,
            api_key: None,
            schema: None,
        }
    }

    pub(crate) fn from_schema(
        pipeline: RequestPipeline,
        base_id: impl Into<String>,
        schema: TableSchema,
    ) -> Self {
        Self {
            pipeline,
            base_id: base_id.into(),
            id: Some(schema.id.clone()),
            name: Some(schema.name.clone()),
            api_key: None,
            schema: Some(schema),
        }
    }

    /// Use `api_key` for every request on this table
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub(crate) fn with_optional_api_key(mut self, api_key: Option<String>) -> Self {
        if api_key.is_some() {
            self.api_key = api_key;
        }
        self
    }

    pub fn base_id(&self) -> &str {
        &self.base_id
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Schema metadata, when the table came from [`Base::schema`](crate::Base::schema)
    pub fn schema(&self) -> Option<&TableSchema> {
        self.schema.as_ref()
    }

    /// Path segment for the table: its id, else its percent-encoded name
    pub fn table_key(&self) -> String {
        match (&self.id, &self.name) {
            (Some(id), _) => id.clone(),
            (None, Some(name)) => urlencoding::encode(name).into_owned(),
            (None, None) => String::new(),
        }
    }

    fn path(&self) -> String {
        format!("{}/{}", self.base_id, self.table_key())
    }

    fn record_path(&self, record_id: &str) -> String {
        format!("{}/{}", self.path(), record_id)
    }

    /// Request options carrying this table's key override
    pub fn options(&self) -> RequestOptions {
        RequestOptions::new().api_key(self.api_key.clone())
    }

    /// An unsaved record bound to this table
    pub fn new_record(&self, fields: Fields) -> Record {
        Record::new(self.clone(), fields)
    }

    fn records_from(&self, payloads: Vec<RecordPayload>) -> Result<Vec<Record>> {
        payloads
            .into_iter()
            .map(|payload| Record::from_payload(self, payload))
            .collect()
    }

    /// Fetch one record by id
    pub async fn find(&self, record_id: &str) -> Result<Record> {
        let body = self
            .pipeline
            .get(&self.record_path(record_id), &self.options())
            .await?;
        Record::from_value(self, body)
    }

    /// Fetch one page of records
    pub async fn page(&self, params: &ListParams) -> Result<Page<Record>> {
        let body = serde_json::to_value(params)?;
        let response = self
            .pipeline
            .post(&format!("{}/listRecords", self.path()), &body, &self.options())
            .await?;

        let response: RecordsResponse = decode(response)?;
        Ok(Page::new(self.records_from(response.records)?, response.offset))
    }

    /// Fetch every record matching `params`, following offsets until the
    /// server reports the last page. `params.offset` resumes a listing.
    pub async fn all(&self, params: ListParams) -> Result<Vec<Record>> {
        let start = params.offset.clone();
        collect_all(|cursor| {
            let params = ListParams {
                offset: cursor.or_else(|| start.clone()),
                ..params.clone()
            };
            async move { self.page(&params).await }
        })
        .await
    }

    /// Create records, ten per request.
    ///
    /// Not atomic: on failure, earlier chunks stay created.
    pub async fn create(&self, records: Vec<Fields>, typecast: bool) -> Result<Vec<Record>> {
        let path = self.path();
        let options = self.options();

        run_batched_max(records, |chunk| {
            let body = json!({
                "records": chunk.into_iter().map(|fields| json!({ "fields": fields })).collect::<Vec<_>>(),
                "typecast": typecast,
            });
            let (path, options) = (&path, &options);
            async move {
                let response = self.pipeline.post(path, &body, options).await?;
                let response: RecordsResponse = decode(response)?;
                self.records_from(response.records)
            }
        })
        .await
    }

    /// Create a single record
    pub async fn create_one(&self, fields: Fields, typecast: bool) -> Result<Record> {
        self.create(vec![fields], typecast)
            .await?
            .pop()
            .ok_or_else(|| Error::Decode("Create response contained no record".into()))
    }

    /// Update existing records, ten per request. Every record needs an id.
    ///
    /// Not atomic: on failure, earlier chunks stay updated.
    pub async fn update<I>(&self, records: I, options: UpdateOptions) -> Result<Vec<Record>>
    where
        I: IntoIterator,
        I::Item: Into<RecordInput>,
    {
        let records: Vec<RecordInput> = records.into_iter().map(Into::into).collect();
        if records.iter().any(|record| record.id.is_none()) {
            return Err(Error::InvalidInput(
                "Every record needs an id to be updated; use upsert for records not yet saved"
                    .into(),
            ));
        }

        let method = if options.overwrite {
            Method::Put
        } else {
            Method::Patch
        };
        let path = self.path();
        let request_options = self.options();

        run_batched_max(records, |chunk| {
            let body = json!({
                "records": chunk.iter().map(RecordInput::to_value).collect::<Vec<_>>(),
                "typecast": options.typecast,
            });
            let (path, request_options) = (&path, &request_options);
            async move {
                let response = self
                    .pipeline
                    .execute(method, path, Some(&body), request_options)
                    .await?;
                let response: RecordsResponse = decode(response)?;
                self.records_from(response.records)
            }
        })
        .await
    }

    pub(crate) async fn update_one(
        &self,
        record_id: &str,
        fields: Fields,
        options: UpdateOptions,
    ) -> Result<Record> {
        let method = if options.overwrite {
            Method::Put
        } else {
            Method::Patch
        };
        let body = json!({ "fields": fields, "typecast": options.typecast });
        let response = self
            .pipeline
            .execute(method, &self.record_path(record_id), Some(&body), &self.options())
            .await?;
        Record::from_value(self, response)
    }

    /// Create or update records, matching existing ones on `merge_on`.
    ///
    /// Not atomic: on failure, earlier chunks stay written.
    pub async fn upsert<I>(&self, records: I, merge_on: &[&str], typecast: bool) -> Result<UpsertResult>
    where
        I: IntoIterator,
        I::Item: Into<RecordInput>,
    {
        if merge_on.is_empty() || merge_on.len() > MAX_MERGE_FIELDS {
            return Err(Error::InvalidInput(format!(
                "Upsert needs between 1 and {MAX_MERGE_FIELDS} merge fields, got {}",
                merge_on.len()
            )));
        }

        let records: Vec<RecordInput> = records.into_iter().map(Into::into).collect();
        let path = self.path();
        let options = self.options();

        let chunks = run_batched_max(records, |chunk| {
            let body = json!({
                "records": chunk.iter().map(RecordInput::to_value).collect::<Vec<_>>(),
                "typecast": typecast,
                "perform_upsert": { "fields_to_merge_on": merge_on },
            });
            let (path, options) = (&path, &options);
            async move {
                let response = self.pipeline.patch(path, &body, options).await?;
                let response: UpsertResponse = decode(response)?;
                Ok(vec![UpsertResult {
                    records: self.records_from(response.records)?,
                    created_ids: response.created_records,
                    updated_ids: response.updated_records,
                }])
            }
        })
        .await?;

        Ok(chunks
            .into_iter()
            .fold(UpsertResult::default(), |mut acc, chunk| {
                acc.records.extend(chunk.records);
                acc.created_ids.extend(chunk.created_ids);
                acc.updated_ids.extend(chunk.updated_ids);
                acc
            }))
    }

    /// Delete records by id, ten per request, returning the deleted ids.
    ///
    /// Not atomic: on failure, earlier chunks stay deleted.
    pub async fn delete<I, S>(&self, record_ids: I) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<String> = record_ids.into_iter().map(Into::into).collect();
        let path = self.path();

        run_batched_max(ids, |chunk| {
            let options = chunk
                .into_iter()
                .fold(self.options(), |options, id| options.query("records[]", id));
            let path = &path;
            async move {
                let response = self.pipeline.delete(path, &options).await?;
                let response: DeleteResponse = decode(response)?;
                Ok(response
                    .records
                    .into_iter()
                    .filter(|record| record.deleted)
                    .map(|record| record.id)
                    .collect())
            }
        })
        .await
    }

    pub(crate) async fn delete_one(&self, record_id: &str) -> Result<()> {
        self.pipeline
            .delete(&self.record_path(record_id), &self.options())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::testing::{ScriptedTransport, ok, test_pipeline};
    use crate::transport::HttpResponse;
    use std::sync::Arc;

    fn fields(value: Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    fn table(transport: &Arc<ScriptedTransport>) -> Table {
        Table::new(test_pipeline(transport.clone()), "app1", Some("tbl1".into()), None).unwrap()
    }

    fn record_json(id: &str, name: &str) -> Value {
        json!({ "id": id, "createdTime": "2024-01-01T00:00:00.000Z", "fields": { "Name": name } })
    }

    #[test]
    fn test_is_table_id() {
        assert!(is_table_id("tblAbc123"));
        assert!(!is_table_id("tbl"));
        assert!(!is_table_id("Tasks"));
        assert!(!is_table_id("tbl with space"));
    }

    #[test]
    fn test_table_needs_id_or_name() {
        let pipeline = test_pipeline(Arc::new(ScriptedTransport::default()));
        assert!(matches!(
            Table::new(pipeline, "app1", None, None),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_table_key() {
        let pipeline = test_pipeline(Arc::new(ScriptedTransport::default()));

        let by_key = Table::from_key(pipeline.clone(), "app1", "tblXYZ");
        assert_eq!(by_key.id(), Some("tblXYZ"));
        assert_eq!(by_key.table_key(), "tblXYZ");

        let by_name = Table::from_key(pipeline, "app1", "Project Tasks");
        assert_eq!(by_name.id(), None);
        assert_eq!(by_name.table_key(), "Project%20Tasks");
    }

    #[test]
    fn test_list_params_serialize_only_set_values() {
        let params = ListParams {
            page_size: Some(50),
            view: Some("Grid view".into()),
            sort: Some(vec![Sort::desc("Priority")]),
            ..ListParams::default()
        };

        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({
                "page_size": 50,
                "view": "Grid view",
                "sort": [{ "field": "Priority", "direction": "desc" }]
            })
        );
    }

    #[tokio::test]
    async fn test_find() {
        let transport = Arc::new(ScriptedTransport::new(vec![ok(record_json("rec1", "Ada"))]));
        let record = table(&transport).find("rec1").await.unwrap();

        assert_eq!(record.id(), Some("rec1"));
        assert_eq!(record.get("Name"), Some(&json!("Ada")));
        assert!(transport.requests()[0].url.ends_with("/app1/tbl1/rec1"));
    }

    #[tokio::test]
    async fn test_all_follows_offsets() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            ok(json!({ "records": [record_json("rec1", "a"), record_json("rec2", "b")], "offset": "itr1/rec2" })),
            ok(json!({ "records": [record_json("rec3", "c")], "offset": "itr1/rec3" })),
            ok(json!({ "records": [record_json("rec4", "d")] })),
        ]));

        let params = ListParams {
            filter_by_formula: Some("NOT({Done})".into()),
            ..ListParams::default()
        };
        let records = table(&transport).all(params).await.unwrap();

        let ids: Vec<_> = records.iter().filter_map(Record::id).collect();
        assert_eq!(ids, vec!["rec1", "rec2", "rec3", "rec4"]);

        let requests = transport.requests();
        assert_eq!(requests.len(), 3);
        assert!(requests[0].url.ends_with("/app1/tbl1/listRecords"));
        assert_eq!(transport.body(0), json!({ "filterByFormula": "NOT({Done})" }));
        assert_eq!(
            transport.body(1),
            json!({ "filterByFormula": "NOT({Done})", "offset": "itr1/rec2" })
        );
        assert_eq!(transport.body(2)["offset"], "itr1/rec3");
    }

    #[tokio::test]
    async fn test_all_resumes_from_offset() {
        let transport = Arc::new(ScriptedTransport::new(vec![ok(json!({ "records": [] }))]));
        let params = ListParams {
            offset: Some("itr9".into()),
            ..ListParams::default()
        };

        table(&transport).all(params).await.unwrap();
        assert_eq!(transport.body(0), json!({ "offset": "itr9" }));
    }

    #[tokio::test]
    async fn test_create_twelve_records_in_two_requests() {
        let created = |range: std::ops::Range<usize>| {
            ok(json!({
                "records": range
                    .map(|n| record_json(&format!("rec{n}"), &format!("Item {n}")))
                    .collect::<Vec<_>>()
            }))
        };
        let transport = Arc::new(ScriptedTransport::new(vec![created(0..10), created(10..12)]));

        let input: Vec<Fields> = (0..12)
            .map(|n| fields(json!({ "Name": format!("Item {n}") })))
            .collect();
        let records = table(&transport).create(input, true).await.unwrap();

        assert_eq!(records.len(), 12);
        for (n, record) in records.iter().enumerate() {
            assert_eq!(record.get("Name"), Some(&json!(format!("Item {n}"))));
        }

        assert_eq!(transport.requests().len(), 2);
        assert_eq!(transport.body(0)["records"].as_array().unwrap().len(), 10);
        assert_eq!(transport.body(1)["records"].as_array().unwrap().len(), 2);
        assert_eq!(transport.body(0)["typecast"], true);
    }

    #[tokio::test]
    async fn test_update_requires_ids() {
        let transport = Arc::new(ScriptedTransport::default());
        let table = table(&transport);
        let unsaved = table.new_record(fields(json!({ "Name": "x" })));

        let result = table.update(vec![unsaved], UpdateOptions::default()).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_update_sends_ids_and_fields() {
        let transport = Arc::new(ScriptedTransport::new(vec![ok(json!({
            "records": [record_json("rec1", "New")]
        }))]));
        let input = RecordInput {
            id: Some("rec1".into()),
            fields: fields(json!({ "Name": "New" })),
        };

        let options = UpdateOptions {
            overwrite: true,
            typecast: false,
        };
        let records = table(&transport).update(vec![input], options).await.unwrap();

        assert_eq!(records[0].get("Name"), Some(&json!("New")));
        assert_eq!(transport.requests()[0].method, Method::Put);
        assert_eq!(
            transport.body(0),
            json!({ "records": [{ "id": "rec1", "fields": { "Name": "New" } }], "typecast": false })
        );
    }

    #[tokio::test]
    async fn test_upsert() {
        let transport = Arc::new(ScriptedTransport::new(vec![ok(json!({
            "records": [record_json("rec1", "Ada"), record_json("rec2", "Grace")],
            "createdRecords": ["rec2"],
            "updatedRecords": ["rec1"]
        }))]));

        let input = vec![
            fields(json!({ "Name": "Ada" })),
            fields(json!({ "Name": "Grace" })),
        ];
        let result = table(&transport).upsert(input, &["Name"], false).await.unwrap();

        assert_eq!(result.records.len(), 2);
        assert_eq!(result.created_ids, vec!["rec2"]);
        assert_eq!(result.updated_ids, vec!["rec1"]);

        let body = transport.body(0);
        assert_eq!(body["performUpsert"], json!({ "fieldsToMergeOn": ["Name"] }));
        assert_eq!(transport.requests()[0].method, Method::Patch);
    }

    #[tokio::test]
    async fn test_upsert_validates_merge_fields() {
        let transport = Arc::new(ScriptedTransport::default());
        let table = table(&transport);

        let none = table.upsert(Vec::<Fields>::new(), &[], false).await;
        assert!(matches!(none, Err(Error::InvalidInput(_))));

        let four = table
            .upsert(Vec::<Fields>::new(), &["a", "b", "c", "d"], false)
            .await;
        assert!(matches!(four, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_delete_in_chunks_with_query_ids() {
        let deleted = |range: std::ops::Range<usize>| {
            ok(json!({
                "records": range
                    .map(|n| json!({ "id": format!("rec{n}"), "deleted": true }))
                    .collect::<Vec<_>>()
            }))
        };
        let transport = Arc::new(ScriptedTransport::new(vec![deleted(0..10), deleted(10..11)]));

        let ids: Vec<String> = (0..11).map(|n| format!("rec{n}")).collect();
        let result = table(&transport).delete(ids.clone()).await.unwrap();

        assert_eq!(result, ids);
        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].method, Method::Delete);
        assert_eq!(requests[0].query.len(), 10);
        assert_eq!(requests[1].query, vec![("records[]".to_string(), "rec10".to_string())]);
        assert!(requests[0].body.is_none());
    }

    #[tokio::test]
    async fn test_partial_failure_surfaces_first_error() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            ok(json!({ "records": (0..10).map(|n| record_json(&format!("rec{n}"), "x")).collect::<Vec<_>>() })),
            Ok(HttpResponse::new(
                422,
                r#"{"error":{"type":"INVALID_VALUE_FOR_COLUMN","message":"Field \"Count\" cannot accept the provided value"}}"#,
            )),
        ]));

        let input: Vec<Fields> = (0..15).map(|_| fields(json!({ "Name": "x" }))).collect();
        let err = table(&transport).create(input, false).await.unwrap_err();

        assert_eq!(err.kind(), Some(ErrorKind::InvalidRequest));
        assert!(err.message().contains("Count"));
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_table_api_key_override() {
        let transport = Arc::new(ScriptedTransport::new(vec![ok(record_json("rec1", "a"))]));
        let table = table(&transport).with_api_key("table-key");

        table.find("rec1").await.unwrap();
        assert_eq!(
            transport.requests()[0].header("authorization"),
            Some("Bearer table-key")
        );
    }
}
