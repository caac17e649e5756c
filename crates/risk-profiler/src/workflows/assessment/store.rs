//! SQLite persistence for clients and the legacy assessment log.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use tracing::info;

use super::answers::AnswerSet;
use super::engine::AssessmentResult;
use super::intake::{DiscoveryForm, PersonalInfo};
use super::repository::{
    AssessmentId, AssessmentLog, AssessmentLogEntry, ClientId, ClientRecord, ClientRepository,
    RepositoryError,
};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS clients (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    age INTEGER,
    phone TEXT NOT NULL,
    email TEXT NOT NULL,
    service TEXT,
    risk_capacity REAL,
    risk_behaviour REAL,
    final_score REAL,
    risk_bucket TEXT,
    equity_allocation TEXT,
    debt_allocation TEXT,
    alternatives_allocation TEXT,
    overrides TEXT,
    assessment_answers TEXT,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
);
CREATE INDEX IF NOT EXISTS idx_clients_email ON clients(email);

CREATE TABLE IF NOT EXISTS assessments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    phone TEXT NOT NULL,
    email TEXT NOT NULL,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    risk_capacity REAL,
    risk_behaviour REAL,
    final_score REAL,
    risk_bucket TEXT,
    equity_allocation TEXT,
    debt_allocation TEXT,
    alternatives_allocation TEXT,
    overrides TEXT,
    raw_inputs TEXT
);
"#;

const CLIENT_COLUMNS: &str = "id, name, age, phone, email, service, risk_capacity, risk_behaviour, \
     final_score, risk_bucket, equity_allocation, debt_allocation, alternatives_allocation, \
     overrides, assessment_answers, created_at, updated_at";

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        RepositoryError::Unavailable(err.to_string())
    }
}

/// Single-connection store; the mutex serialises access from request handlers.
pub struct SqliteAssessmentStore {
    conn: Mutex<Connection>,
}

impl SqliteAssessmentStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let conn = Connection::open(path.as_ref())?;
        let store = Self::from_connection(conn)?;
        info!(path = %path.as_ref().display(), "assessment store ready");
        Ok(store)
    }

    pub fn in_memory() -> Result<Self, RepositoryError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, RepositoryError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>, RepositoryError> {
        self.conn
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))
    }
}

/// Column values shared by the client and legacy assessment rows.
struct RiskColumns {
    risk_capacity: f64,
    risk_behaviour: f64,
    final_score: f64,
    risk_bucket: String,
    equity: String,
    debt: String,
    alternatives: String,
    overrides: String,
}

impl RiskColumns {
    fn from_result(result: &AssessmentResult) -> Result<Self, RepositoryError> {
        Ok(Self {
            risk_capacity: result.risk_capacity,
            risk_behaviour: result.risk_behaviour,
            final_score: result.final_score,
            risk_bucket: result.risk_bucket.label().to_string(),
            equity: result.allocation.equity.to_string(),
            debt: result.allocation.debt.to_string(),
            alternatives: result.allocation.alternatives.to_string(),
            overrides: serde_json::to_string(&result.overrides)?,
        })
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, RepositoryError> {
    Ok(serde_json::to_string(value)?)
}

/// Stored JSON blobs are decoded leniently; rows written by older tools may hold plain text.
fn decode<T: serde::de::DeserializeOwned>(raw: Option<String>) -> Option<T> {
    raw.and_then(|text| serde_json::from_str(&text).ok())
}

fn client_from_row(row: &Row<'_>) -> rusqlite::Result<ClientRecord> {
    let age: Option<i64> = row.get(2)?;
    let overrides: Option<String> = row.get(13)?;
    let answers: Option<String> = row.get(14)?;

    Ok(ClientRecord {
        id: ClientId(row.get(0)?),
        name: row.get(1)?,
        age: age.and_then(|value| u16::try_from(value).ok()),
        phone: row.get(3)?,
        email: row.get(4)?,
        service: row.get(5)?,
        risk_capacity: row.get(6)?,
        risk_behaviour: row.get(7)?,
        final_score: row.get(8)?,
        risk_bucket: row.get(9)?,
        equity_allocation: row.get(10)?,
        debt_allocation: row.get(11)?,
        alternatives_allocation: row.get(12)?,
        overrides: decode(overrides),
        assessment_answers: decode(answers),
        created_at: row.get(15)?,
        updated_at: row.get(16)?,
    })
}

fn log_entry_from_row(row: &Row<'_>) -> rusqlite::Result<AssessmentLogEntry> {
    let overrides: Option<String> = row.get(12)?;
    let raw_inputs: Option<String> = row.get(13)?;

    Ok(AssessmentLogEntry {
        id: AssessmentId(row.get(0)?),
        name: row.get(1)?,
        phone: row.get(2)?,
        email: row.get(3)?,
        created_at: row.get(4)?,
        risk_capacity: row.get::<_, Option<f64>>(5)?.unwrap_or_default(),
        risk_behaviour: row.get::<_, Option<f64>>(6)?.unwrap_or_default(),
        final_score: row.get::<_, Option<f64>>(7)?.unwrap_or_default(),
        risk_bucket: row.get::<_, Option<String>>(8)?.unwrap_or_default(),
        equity_allocation: row.get::<_, Option<String>>(9)?.unwrap_or_default(),
        debt_allocation: row.get::<_, Option<String>>(10)?.unwrap_or_default(),
        alternatives_allocation: row.get::<_, Option<String>>(11)?.unwrap_or_default(),
        overrides: decode(overrides).unwrap_or_default(),
        raw_inputs: decode(raw_inputs).unwrap_or(serde_json::Value::Null),
    })
}

impl ClientRepository for SqliteAssessmentStore {
    fn insert_discovery(&self, form: &DiscoveryForm) -> Result<ClientId, RepositoryError> {
        let conn = self.connection()?;
        conn.execute(
            "INSERT INTO clients (name, age, phone, email, service) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                form.name,
                form.age.map(i64::from),
                form.phone,
                form.email,
                form.service
            ],
        )?;
        Ok(ClientId(conn.last_insert_rowid()))
    }

    fn find_by_email(&self, email: &str) -> Result<Option<ClientRecord>, RepositoryError> {
        let conn = self.connection()?;
        let sql = format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE email = ?1 ORDER BY id ASC LIMIT 1"
        );
        let record = conn
            .query_row(&sql, params![email], client_from_row)
            .optional()?;
        Ok(record)
    }

    fn upsert_assessment(
        &self,
        identity: &PersonalInfo,
        result: &AssessmentResult,
        answers: &AnswerSet,
    ) -> Result<ClientId, RepositoryError> {
        let columns = RiskColumns::from_result(result)?;
        let answers_json = to_json(answers)?;
        let conn = self.connection()?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM clients WHERE email = ?1 ORDER BY id ASC LIMIT 1",
                params![identity.email],
                |row| row.get(0),
            )
            .optional()?;

        match existing {
            Some(id) => {
                conn.execute(
                    "UPDATE clients SET
                        risk_capacity = ?1,
                        risk_behaviour = ?2,
                        final_score = ?3,
                        risk_bucket = ?4,
                        equity_allocation = ?5,
                        debt_allocation = ?6,
                        alternatives_allocation = ?7,
                        overrides = ?8,
                        assessment_answers = ?9,
                        updated_at = CURRENT_TIMESTAMP
                     WHERE id = ?10",
                    params![
                        columns.risk_capacity,
                        columns.risk_behaviour,
                        columns.final_score,
                        columns.risk_bucket,
                        columns.equity,
                        columns.debt,
                        columns.alternatives,
                        columns.overrides,
                        answers_json,
                        id
                    ],
                )?;
                Ok(ClientId(id))
            }
            None => {
                conn.execute(
                    "INSERT INTO clients (
                        name, phone, email, risk_capacity, risk_behaviour, final_score,
                        risk_bucket, equity_allocation, debt_allocation, alternatives_allocation,
                        overrides, assessment_answers
                     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                    params![
                        identity.name,
                        identity.phone,
                        identity.email,
                        columns.risk_capacity,
                        columns.risk_behaviour,
                        columns.final_score,
                        columns.risk_bucket,
                        columns.equity,
                        columns.debt,
                        columns.alternatives,
                        columns.overrides,
                        answers_json
                    ],
                )?;
                Ok(ClientId(conn.last_insert_rowid()))
            }
        }
    }

    fn list_clients(&self) -> Result<Vec<ClientRecord>, RepositoryError> {
        let conn = self.connection()?;
        let sql = format!("SELECT {CLIENT_COLUMNS} FROM clients ORDER BY created_at DESC, id DESC");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], client_from_row)?;
        let records = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RawInputs<'a> {
    personal_info: &'a PersonalInfo,
    answers: &'a AnswerSet,
}

impl AssessmentLog for SqliteAssessmentStore {
    fn append(
        &self,
        identity: &PersonalInfo,
        result: &AssessmentResult,
        answers: &AnswerSet,
    ) -> Result<AssessmentId, RepositoryError> {
        let columns = RiskColumns::from_result(result)?;
        let raw_inputs = to_json(&RawInputs {
            personal_info: identity,
            answers,
        })?;
        let conn = self.connection()?;

        conn.execute(
            "INSERT INTO assessments (
                name, phone, email, risk_capacity, risk_behaviour, final_score,
                risk_bucket, equity_allocation, debt_allocation, alternatives_allocation,
                overrides, raw_inputs
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                identity.name,
                identity.phone,
                identity.email,
                columns.risk_capacity,
                columns.risk_behaviour,
                columns.final_score,
                columns.risk_bucket,
                columns.equity,
                columns.debt,
                columns.alternatives,
                columns.overrides,
                raw_inputs
            ],
        )?;
        Ok(AssessmentId(conn.last_insert_rowid()))
    }

    fn list_assessments(&self) -> Result<Vec<AssessmentLogEntry>, RepositoryError> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, phone, email, created_at, risk_capacity, risk_behaviour,
                    final_score, risk_bucket, equity_allocation, debt_allocation,
                    alternatives_allocation, overrides, raw_inputs
             FROM assessments ORDER BY created_at DESC, id DESC",
        )?;
        let rows = stmt.query_map([], log_entry_from_row)?;
        let entries = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}
