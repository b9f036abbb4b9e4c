//! Shared fixtures for the scenario suite

use formdb::{Entity, FieldSpec, Predicate, Record, Result, UnitType};
use std::sync::Once;

static TRACING: Once = Once::new();

/// Route tracing output to the test harness
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .try_init();
    });
}

/// `{id: Int primary, name: String}`
#[derive(Debug, Clone)]
pub struct Student {
    pub id: i32,
    pub name: String,
}

impl Student {
    pub fn new(id: i32, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
        }
    }

    pub fn record(&self) -> Record {
        self.to_record().unwrap()
    }
}

impl Entity for Student {
    const TABLE_NAME: &'static str = "Student";

    fn fields() -> &'static [FieldSpec] {
        const FIELDS: &[FieldSpec] = &[
            FieldSpec::primary("id", UnitType::Int),
            FieldSpec::normal("name", UnitType::String),
        ];
        FIELDS
    }

    fn to_record(&self) -> Result<Record> {
        Record::new()
            .with_primary("id", UnitType::Int, self.id)?
            .with_normal("name", UnitType::String, self.name.as_str())
    }
}

/// `{code: String primary, credits: Long}`
#[derive(Debug, Clone)]
pub struct Course {
    pub code: &'static str,
    pub credits: i64,
}

impl Entity for Course {
    const TABLE_NAME: &'static str = "Course";

    fn fields() -> &'static [FieldSpec] {
        const FIELDS: &[FieldSpec] = &[
            FieldSpec::primary("code", UnitType::String),
            FieldSpec::normal("credits", UnitType::Long),
        ];
        FIELDS
    }

    fn to_record(&self) -> Result<Record> {
        Record::new()
            .with_primary("code", UnitType::String, self.code)?
            .with_normal("credits", UnitType::Long, self.credits)
    }
}

/// Matches records whose `name` unit equals `name`
pub fn name_is(name: &'static str) -> Predicate {
    formdb::predicate(move |r| r.value("name").and_then(|v| v.as_str()) == Some(name))
}

/// Sorted `id` values of the given records
pub fn ids(records: &[Record]) -> Vec<i64> {
    let mut ids: Vec<i64> = records
        .iter()
        .filter_map(|r| r.value("id").and_then(|v| v.as_i64()))
        .collect();
    ids.sort_unstable();
    ids
}
