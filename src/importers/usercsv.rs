//! CSV user import
//!
//! Every row must name the user (`name`, `fullname`, `email_addr`). Declared
//! `data_access` levels are checked against the row's `user_type` before any
//! user is returned.

use crate::data_access::{DataAccessPolicy, LevelSet};
use crate::error::{ImportError, ImportResult};
use crate::importers::{
    check_no_duplicated_headers, check_no_empty_headers, check_required_headers,
    check_valid_row_length, read_local_file, read_records,
};
use crate::util::RequiredFields;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{info, warn};

pub const REQUIRED_HEADERS: &[&str] = &["name", "fullname", "email_addr"];

/// One imported user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    pub name: String,
    pub fullname: String,
    pub email_addr: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_type: Option<String>,
    #[serde(default)]
    pub data_access: LevelSet,
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub subadmin: bool,
    #[serde(default)]
    pub info: Map<String, Value>,
}

/// Imports users from CSV
#[derive(Debug, Clone)]
pub struct UserCsvImporter {
    policy: DataAccessPolicy,
}

impl UserCsvImporter {
    pub fn new(policy: DataAccessPolicy) -> Self {
        Self { policy }
    }

    /// Load users from an uploaded file
    pub fn users(&self, path: Option<&Path>) -> ImportResult<Vec<UserData>> {
        let text = read_local_file(path)?;
        self.import_str(&text)
    }

    pub fn count_users(&self, path: Option<&Path>) -> ImportResult<usize> {
        Ok(self.users(path)?.len())
    }

    /// Parse CSV text into users
    pub fn import_str(&self, text: &str) -> ImportResult<Vec<UserData>> {
        let mut records = read_records(text)?.into_iter();

        let Some(headers) = records.next() else {
            return Ok(Vec::new());
        };
        check_no_duplicated_headers(&headers)?;
        check_no_empty_headers(&headers)?;
        let required = RequiredFields::from_names(REQUIRED_HEADERS.iter().copied());
        check_required_headers(&headers, &required)?;

        let users = records
            .enumerate()
            .map(|(index, row)| self.import_row(&headers, row, index + 1))
            .collect::<ImportResult<Vec<_>>>()?;

        info!(count = users.len(), "Imported users from CSV");
        Ok(users)
    }

    fn import_row(
        &self,
        headers: &[String],
        row: Vec<String>,
        row_number: usize,
    ) -> ImportResult<UserData> {
        check_valid_row_length(&row, row_number, headers)?;

        let mut user = UserData::default();
        for (header, cell) in headers.iter().zip(row) {
            match header.as_str() {
                "name" => user.name = cell,
                "fullname" => user.fullname = cell,
                "email_addr" => user.email_addr = cell,
                "password" => user.password = non_empty(cell),
                "user_type" => user.user_type = non_empty(cell),
                "data_access" => user.data_access = parse_levels(&cell),
                "admin" => user.admin = parse_flag(&cell),
                "subadmin" => user.subadmin = parse_flag(&cell),
                _ => {
                    user.info.insert(header.clone(), Value::String(cell));
                }
            }
        }

        let user_type = user.user_type.clone().unwrap_or_default();
        let (valid, invalid) = self
            .policy
            .valid_user_type_based_data_access(&user_type, &user.data_access);
        if !valid {
            warn!(
                row = row_number + 1,
                user_type = %user_type,
                invalid = ?invalid,
                "Rejecting user import"
            );
            return Err(ImportError::InvalidUserAccess {
                row: row_number + 1,
                user_type,
                levels: invalid.iter().map(|l| l.to_string()).collect(),
            });
        }

        Ok(user)
    }
}

fn non_empty(cell: String) -> Option<String> {
    let trimmed = cell.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Levels separated by `,` or `;`
fn parse_levels(cell: &str) -> LevelSet {
    cell.split([',', ';'])
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(Into::into)
        .collect()
}

fn parse_flag(cell: &str) -> bool {
    matches!(
        cell.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "y"
    )
}
