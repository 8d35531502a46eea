//! CSV task import
//!
//! Column handling:
//! - reserved columns (`state`, `quorum`, `calibration`, `priority_0`,
//!   `n_answers`, `user_pref`, `expiration`) land on the task itself
//! - `<name>_gold` columns fill `gold_answers[<name>]` and mark the task
//!   as a calibration task
//! - everything else goes into `info`

use crate::error::{ImportError, ImportResult};
use crate::importers::{
    CsvFetcher, CsvSource, check_no_duplicated_headers, check_no_empty_headers,
    check_required_headers, check_valid_row_length, read_local_file, read_records,
};
use crate::model::{Task, TaskState};
use crate::util::RequiredFields;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

/// Columns stored on the task rather than in `info`
pub const RESERVED_FIELDS: &[&str] = &[
    "state",
    "quorum",
    "calibration",
    "priority_0",
    "n_answers",
    "user_pref",
    "expiration",
];

const GOLD_SUFFIX: &str = "_gold";

/// One imported task, before it is bound to a project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskData {
    pub info: Map<String, Value>,

    /// Reserved columns present in the file
    #[serde(flatten)]
    pub fields: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gold_answers: Option<Map<String, Value>>,
}

impl TaskData {
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    pub fn is_calibration(&self) -> bool {
        self.fields.get("calibration").is_some_and(|v| match v {
            Value::Number(n) => n.as_u64() == Some(1),
            Value::String(s) => s == "1",
            _ => false,
        })
    }

    /// Build a task for `project_id`; unset `n_answers` falls back to
    /// `default_n_answers`
    pub fn into_task(self, project_id: u64, default_n_answers: u32) -> ImportResult<Task> {
        let mut task = Task::new(project_id, self.info.clone());

        task.n_answers = match self.field_str("n_answers").filter(|s| !s.is_empty()) {
            Some(raw) => parse_field("n_answers", raw)?,
            None => default_n_answers,
        };

        if let Some(raw) = self.field_str("priority_0").filter(|s| !s.is_empty()) {
            task.priority_0 = parse_field("priority_0", raw)?;
        }

        if let Some(raw) = self.field_str("quorum").filter(|s| !s.is_empty()) {
            task.quorum = Some(parse_field("quorum", raw)?);
        }

        task.expiration = self
            .field_str("expiration")
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        task.user_pref = self.fields.get("user_pref").cloned();

        task.state = match self.field_str("state") {
            None | Some("") | Some("ongoing") => TaskState::Ongoing,
            Some("completed") => TaskState::Completed,
            Some(other) => {
                return Err(ImportError::InvalidValue {
                    field: "state".into(),
                    value: other.into(),
                });
            }
        };

        let calibration = self.is_calibration();
        task.calibration = u8::from(calibration);
        task.exported = calibration;
        task.gold_answers = self.gold_answers.map(Value::Object);

        Ok(task)
    }
}

fn parse_field<T: std::str::FromStr>(field: &str, raw: &str) -> ImportResult<T> {
    raw.trim().parse().map_err(|_| ImportError::InvalidValue {
        field: field.to_string(),
        value: raw.to_string(),
    })
}

/// Rewrite a Google Drive share link into its CSV export URL
///
/// Legacy `ccc?key=` links take an output parameter; current links are cut
/// at `edit` and pointed at the export endpoint.
pub fn gdocs_export_url(url: &str) -> String {
    if url.contains("ccc?key") {
        return format!("{}&output=csv", url);
    }
    let base = url.find("edit").map_or(url, |index| &url[..index]);
    format!("{}export?format=csv", base)
}

/// Imports tasks from CSV
#[derive(Debug, Clone, Default)]
pub struct TaskCsvImporter {
    required: RequiredFields,
}

impl TaskCsvImporter {
    pub fn new(required: RequiredFields) -> Self {
        Self { required }
    }

    /// Load tasks from any source
    pub async fn tasks(
        &self,
        source: &CsvSource,
        fetcher: &dyn CsvFetcher,
    ) -> ImportResult<Vec<TaskData>> {
        let text = match source {
            CsvSource::Url(url) => fetcher.fetch(url).await?.into_csv_text()?,
            CsvSource::GoogleDrive(url) => {
                let export_url = gdocs_export_url(url);
                debug!(url = %export_url, "Importing Google Drive sheet");
                fetcher.fetch(&export_url).await?.into_csv_text()?
            }
            CsvSource::LocalFile(path) => read_local_file(path.as_deref())?,
        };
        self.import_str(&text)
    }

    pub async fn count_tasks(
        &self,
        source: &CsvSource,
        fetcher: &dyn CsvFetcher,
    ) -> ImportResult<usize> {
        Ok(self.tasks(source, fetcher).await?.len())
    }

    /// Parse CSV text into tasks
    pub fn import_str(&self, text: &str) -> ImportResult<Vec<TaskData>> {
        let mut records = read_records(text)?.into_iter();

        let Some(headers) = records.next() else {
            return Ok(Vec::new());
        };
        check_no_duplicated_headers(&headers)?;
        check_no_empty_headers(&headers)?;
        check_required_headers(&headers, &self.required)?;

        let tasks = records
            .enumerate()
            .map(|(index, row)| self.import_row(&headers, row, index + 1))
            .collect::<ImportResult<Vec<_>>>()?;

        info!(count = tasks.len(), "Imported tasks from CSV");
        Ok(tasks)
    }

    fn import_row(
        &self,
        headers: &[String],
        row: Vec<String>,
        row_number: usize,
    ) -> ImportResult<TaskData> {
        check_valid_row_length(&row, row_number, headers)?;

        let values: Map<String, Value> = headers
            .iter()
            .cloned()
            .zip(row.iter().cloned().map(Value::String))
            .collect();
        let invalid = self.required.validate(&values);
        if !invalid.is_empty() {
            return Err(ImportError::InvalidRequiredFields(invalid));
        }

        let mut task = TaskData::default();
        let mut gold = Map::new();

        for (header, cell) in headers.iter().zip(row) {
            if RESERVED_FIELDS.contains(&header.as_str()) {
                let value = if header == "user_pref" {
                    parse_user_pref(&cell, row_number)?
                } else {
                    Value::String(cell)
                };
                task.fields.insert(header.clone(), value);
            } else if let Some(name) = header.strip_suffix(GOLD_SUFFIX) {
                if !cell.is_empty() {
                    gold.insert(name.to_string(), Value::String(cell));
                }
            } else {
                task.info.insert(header.clone(), Value::String(cell));
            }
        }

        if !gold.is_empty() {
            task.gold_answers = Some(gold);
            task.fields.insert("calibration".to_string(), Value::from(1));
        }

        Ok(task)
    }
}

fn parse_user_pref(cell: &str, row_number: usize) -> ImportResult<Value> {
    if cell.is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_str(&cell.to_lowercase()).map_err(|e| ImportError::InvalidUserPref {
        row: row_number + 1,
        reason: e.to_string(),
    })
}
