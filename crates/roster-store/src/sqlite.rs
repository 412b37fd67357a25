// ABOUTME: SQLite-backed store for employee records, the single source of truth for the service.
// ABOUTME: Owns the schema, enforces email uniqueness with a UNIQUE constraint, and maps rows to Employees.

use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use roster_core::{Employee, EmployeePatch, NewEmployee, SearchFilter};
use rusqlite::types::ToSql;
use rusqlite::{Connection, ErrorCode, OptionalExtension, params};
use thiserror::Error;

const COLUMNS: &str =
    "id, first_name, last_name, email, department, position, salary, hire_date";

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(rusqlite::Error),

    #[error("email already exists: {0}")]
    DuplicateEmail(String),

    #[error("employee {0} not found")]
    NotFound(i64),

    #[error("invalid hire_date timestamp: {0}")]
    InvalidTimestamp(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Sqlite(err)
    }
}

/// A single SQLite connection holding the `employees` table.
pub struct EmployeeStore {
    conn: Connection,
}

impl EmployeeStore {
    /// Open or create the database file at the given path and make sure the
    /// schema exists.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        let store = Self { conn };
        store.ensure_schema()?;
        tracing::info!("opened employee store at {}", path.display());
        Ok(store)
    }

    /// Open a private in-memory database with the schema in place.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.ensure_schema()?;
        Ok(store)
    }

    /// Create the `employees` table if it is missing. Safe to call any number
    /// of times.
    pub fn ensure_schema(&self) -> Result<(), StoreError> {
        // AUTOINCREMENT keeps SQLite from handing out a deleted row's id again.
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS employees (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                department TEXT,
                position TEXT,
                salary REAL,
                hire_date TEXT
            );",
        )?;
        tracing::debug!("employee schema ready");
        Ok(())
    }

    /// Insert a new employee, stamping `hire_date` with the current time.
    /// Returns the stored record with its assigned id.
    pub fn insert(&self, new: &NewEmployee) -> Result<Employee, StoreError> {
        let hire_date = Utc::now();

        self.conn
            .execute(
                "INSERT INTO employees (first_name, last_name, email, department, position, salary, hire_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    new.first_name,
                    new.last_name,
                    new.email,
                    new.department,
                    new.position,
                    new.salary,
                    hire_date.to_rfc3339(),
                ],
            )
            .map_err(|e| classify_write_error(e, &new.email))?;

        Ok(Employee {
            id: self.conn.last_insert_rowid(),
            first_name: new.first_name.clone(),
            last_name: new.last_name.clone(),
            email: new.email.clone(),
            department: new.department.clone(),
            position: new.position.clone(),
            salary: new.salary,
            hire_date: Some(hire_date),
        })
    }

    /// Look up one employee by id.
    pub fn get_by_id(&self, id: i64) -> Result<Option<Employee>, StoreError> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM employees WHERE id = ?1"),
                params![id],
                EmployeeRow::from_row,
            )
            .optional()?;

        row.map(EmployeeRow::into_employee).transpose()
    }

    /// List every employee, ordered by id.
    pub fn get_all(&self) -> Result<Vec<Employee>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {COLUMNS} FROM employees ORDER BY id ASC"))?;

        let rows = stmt.query_map([], EmployeeRow::from_row)?;

        let mut employees = Vec::new();
        for row in rows {
            employees.push(row?.into_employee()?);
        }
        Ok(employees)
    }

    /// Look up the employee that owns an email address, if any.
    pub fn find_by_email(&self, email: &str) -> Result<Option<Employee>, StoreError> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM employees WHERE email = ?1"),
                params![email],
                EmployeeRow::from_row,
            )
            .optional()?;

        row.map(EmployeeRow::into_employee).transpose()
    }

    /// Find employees whose department and/or position contain the given
    /// terms, ignoring case. Absent or empty terms do not filter.
    pub fn search(&self, filter: &SearchFilter) -> Result<Vec<Employee>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {COLUMNS} FROM employees
             WHERE (?1 IS NULL OR instr(lower(department), lower(?1)) > 0)
               AND (?2 IS NULL OR instr(lower(position), lower(?2)) > 0)
             ORDER BY id ASC"
        ))?;

        let rows = stmt.query_map(
            params![filter.department_term(), filter.position_term()],
            EmployeeRow::from_row,
        )?;

        let mut employees = Vec::new();
        for row in rows {
            employees.push(row?.into_employee()?);
        }
        Ok(employees)
    }

    /// Apply a partial update to one employee and return the updated record.
    /// Only the fields present in the patch are written.
    pub fn update_fields(&self, id: i64, patch: &EmployeePatch) -> Result<Employee, StoreError> {
        let mut columns: Vec<&str> = Vec::new();
        let mut values: Vec<&dyn ToSql> = Vec::new();

        if let Some(first_name) = &patch.first_name {
            columns.push("first_name");
            values.push(first_name);
        }
        if let Some(last_name) = &patch.last_name {
            columns.push("last_name");
            values.push(last_name);
        }
        if let Some(email) = &patch.email {
            columns.push("email");
            values.push(email);
        }
        if let Some(department) = &patch.department {
            columns.push("department");
            values.push(department);
        }
        if let Some(position) = &patch.position {
            columns.push("position");
            values.push(position);
        }
        if let Some(salary) = &patch.salary {
            columns.push("salary");
            values.push(salary);
        }

        if columns.is_empty() {
            return self.get_by_id(id)?.ok_or(StoreError::NotFound(id));
        }

        let assignments = columns
            .iter()
            .enumerate()
            .map(|(i, column)| format!("{column} = ?{}", i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE employees SET {assignments} WHERE id = ?{}",
            values.len() + 1
        );
        values.push(&id);

        let changed = self
            .conn
            .execute(&sql, values.as_slice())
            .map_err(|e| classify_write_error(e, patch.email.as_deref().unwrap_or_default()))?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }

        self.get_by_id(id)?.ok_or(StoreError::NotFound(id))
    }

    /// Permanently remove one employee.
    pub fn delete(&self, id: i64) -> Result<(), StoreError> {
        let changed = self
            .conn
            .execute("DELETE FROM employees WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}

/// Turn a UNIQUE violation on `email` into `DuplicateEmail`; pass everything
/// else through.
fn classify_write_error(err: rusqlite::Error, email: &str) -> StoreError {
    if let rusqlite::Error::SqliteFailure(failure, Some(message)) = &err {
        if failure.code == ErrorCode::ConstraintViolation
            && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
            && message.contains("employees.email")
        {
            return StoreError::DuplicateEmail(email.to_string());
        }
    }
    StoreError::Sqlite(err)
}

/// A raw row from the employees table, before hire_date is parsed.
#[derive(Debug, Clone)]
struct EmployeeRow {
    id: i64,
    first_name: String,
    last_name: String,
    email: String,
    department: Option<String>,
    position: Option<String>,
    salary: Option<f64>,
    hire_date: Option<String>,
}

impl EmployeeRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            email: row.get(3)?,
            department: row.get(4)?,
            position: row.get(5)?,
            salary: row.get(6)?,
            hire_date: row.get(7)?,
        })
    }

    fn into_employee(self) -> Result<Employee, StoreError> {
        let hire_date = self.hire_date.as_deref().map(parse_timestamp).transpose()?;
        Ok(Employee {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            department: self.department,
            position: self.position,
            salary: self.salary,
            hire_date,
        })
    }
}

/// Parse a stored hire_date. RFC 3339 is what this store writes; the
/// space-separated `YYYY-MM-DD HH:MM:SS[.f]` form is accepted for databases
/// populated by other tools.
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| StoreError::InvalidTimestamp(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_new(first: &str, last: &str, email: &str) -> NewEmployee {
        NewEmployee::new(first.to_string(), last.to_string(), email.to_string())
    }

    fn engineer(email: &str) -> NewEmployee {
        NewEmployee {
            department: Some("Engineering".to_string()),
            position: Some("Senior Developer".to_string()),
            salary: Some(98000.0),
            ..make_new("Linus", "Torvalds", email)
        }
    }

    #[test]
    fn store_insert_and_get_by_id() {
        let store = EmployeeStore::open_in_memory().unwrap();

        let created = store.insert(&engineer("linus@example.com")).unwrap();
        assert!(created.id > 0);
        assert_eq!(
            created.hire_date.map(|d| d.date_naive()),
            Some(Utc::now().date_naive())
        );

        let fetched = store.get_by_id(created.id).unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.department.as_deref(), Some("Engineering"));
        assert_eq!(fetched.salary, Some(98000.0));
    }

    #[test]
    fn store_get_by_id_missing_returns_none() {
        let store = EmployeeStore::open_in_memory().unwrap();
        assert!(store.get_by_id(99999).unwrap().is_none());
    }

    #[test]
    fn store_ensure_schema_is_idempotent_across_reopen() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("employees.db");

        {
            let store = EmployeeStore::open(&db_path).unwrap();
            store.insert(&make_new("A", "B", "ab@example.com")).unwrap();
            store.ensure_schema().unwrap();
        }

        let store = EmployeeStore::open(&db_path).unwrap();
        store.ensure_schema().unwrap();
        let all = store.get_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].email, "ab@example.com");
    }

    #[test]
    fn store_rejects_duplicate_email() {
        let store = EmployeeStore::open_in_memory().unwrap();
        store.insert(&make_new("A", "One", "dup@example.com")).unwrap();

        let err = store
            .insert(&make_new("B", "Two", "dup@example.com"))
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail(ref e) if e == "dup@example.com"));
        assert_eq!(store.get_all().unwrap().len(), 1);
    }

    #[test]
    fn store_get_all_orders_by_id() {
        let store = EmployeeStore::open_in_memory().unwrap();
        let first = store.insert(&make_new("A", "A", "a@example.com")).unwrap();
        let second = store.insert(&make_new("B", "B", "b@example.com")).unwrap();

        let ids: Vec<i64> = store.get_all().unwrap().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[test]
    fn store_find_by_email() {
        let store = EmployeeStore::open_in_memory().unwrap();
        let created = store.insert(&make_new("A", "B", "find@example.com")).unwrap();

        let found = store.find_by_email("find@example.com").unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert!(store.find_by_email("nobody@example.com").unwrap().is_none());
    }

    #[test]
    fn store_update_fields_changes_only_present_fields() {
        let store = EmployeeStore::open_in_memory().unwrap();
        let created = store.insert(&engineer("patch@example.com")).unwrap();

        let patch = EmployeePatch {
            department: Some(Some("Research".to_string())),
            ..Default::default()
        };
        let updated = store.update_fields(created.id, &patch).unwrap();

        assert_eq!(updated.department.as_deref(), Some("Research"));
        assert_eq!(updated.first_name, created.first_name);
        assert_eq!(updated.last_name, created.last_name);
        assert_eq!(updated.email, created.email);
        assert_eq!(updated.position, created.position);
        assert_eq!(updated.salary, created.salary);
        assert_eq!(updated.hire_date, created.hire_date);
    }

    #[test]
    fn store_update_fields_clears_nullable_columns() {
        let store = EmployeeStore::open_in_memory().unwrap();
        let created = store.insert(&engineer("clear@example.com")).unwrap();

        let patch = EmployeePatch {
            salary: Some(None),
            position: Some(None),
            ..Default::default()
        };
        let updated = store.update_fields(created.id, &patch).unwrap();

        assert!(updated.salary.is_none());
        assert!(updated.position.is_none());
        assert_eq!(updated.department.as_deref(), Some("Engineering"));
    }

    #[test]
    fn store_update_fields_empty_patch_returns_record() {
        let store = EmployeeStore::open_in_memory().unwrap();
        let created = store.insert(&engineer("noop@example.com")).unwrap();

        let same = store
            .update_fields(created.id, &EmployeePatch::default())
            .unwrap();
        assert_eq!(same, created);
    }

    #[test]
    fn store_update_fields_missing_id_is_not_found() {
        let store = EmployeeStore::open_in_memory().unwrap();
        let patch = EmployeePatch {
            first_name: Some("Ghost".to_string()),
            ..Default::default()
        };

        assert!(matches!(
            store.update_fields(42, &patch),
            Err(StoreError::NotFound(42))
        ));
        assert!(matches!(
            store.update_fields(42, &EmployeePatch::default()),
            Err(StoreError::NotFound(42))
        ));
    }

    #[test]
    fn store_update_fields_rejects_taken_email() {
        let store = EmployeeStore::open_in_memory().unwrap();
        store.insert(&make_new("A", "A", "taken@example.com")).unwrap();
        let other = store.insert(&make_new("B", "B", "free@example.com")).unwrap();

        let patch = EmployeePatch {
            email: Some("taken@example.com".to_string()),
            ..Default::default()
        };
        let err = store.update_fields(other.id, &patch).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail(_)));

        let unchanged = store.get_by_id(other.id).unwrap().unwrap();
        assert_eq!(unchanged.email, "free@example.com");
    }

    #[test]
    fn store_delete_removes_row_and_never_reuses_id() {
        let store = EmployeeStore::open_in_memory().unwrap();
        let created = store.insert(&make_new("A", "B", "gone@example.com")).unwrap();

        store.delete(created.id).unwrap();
        assert!(store.get_by_id(created.id).unwrap().is_none());
        assert!(matches!(
            store.delete(created.id),
            Err(StoreError::NotFound(id)) if id == created.id
        ));

        let next = store.insert(&make_new("C", "D", "next@example.com")).unwrap();
        assert!(next.id > created.id);
    }

    #[test]
    fn store_search_matches_case_insensitive_substring() {
        let store = EmployeeStore::open_in_memory().unwrap();
        let eng = store.insert(&engineer("eng@example.com")).unwrap();
        store
            .insert(&NewEmployee {
                department: Some("Sales".to_string()),
                position: Some("Account Developer".to_string()),
                ..make_new("S", "S", "sales@example.com")
            })
            .unwrap();
        store.insert(&make_new("N", "N", "none@example.com")).unwrap();

        let filter = SearchFilter {
            department: Some("eng".to_string()),
            position: None,
        };
        let found = store.search(&filter).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, eng.id);

        let filter = SearchFilter {
            department: None,
            position: Some("DEVELOPER".to_string()),
        };
        assert_eq!(store.search(&filter).unwrap().len(), 2);

        let filter = SearchFilter {
            department: Some("sal".to_string()),
            position: Some("senior".to_string()),
        };
        assert!(store.search(&filter).unwrap().is_empty());
    }

    #[test]
    fn store_search_without_terms_returns_everything() {
        let store = EmployeeStore::open_in_memory().unwrap();
        store.insert(&engineer("one@example.com")).unwrap();
        store.insert(&make_new("N", "N", "two@example.com")).unwrap();

        assert_eq!(store.search(&SearchFilter::default()).unwrap().len(), 2);

        let blank = SearchFilter {
            department: Some(String::new()),
            position: Some(String::new()),
        };
        assert_eq!(store.search(&blank).unwrap().len(), 2);
    }

    #[test]
    fn store_search_treats_wildcards_literally() {
        let store = EmployeeStore::open_in_memory().unwrap();
        store.insert(&engineer("wild@example.com")).unwrap();

        let filter = SearchFilter {
            department: Some("%".to_string()),
            position: None,
        };
        assert!(store.search(&filter).unwrap().is_empty());
    }

    #[test]
    fn store_reads_space_separated_timestamps() {
        let store = EmployeeStore::open_in_memory().unwrap();
        store
            .conn
            .execute(
                "INSERT INTO employees (first_name, last_name, email, hire_date)
                 VALUES ('Old', 'Row', 'old@example.com', '2019-06-01 08:30:00.123456')",
                [],
            )
            .unwrap();

        let old = store.find_by_email("old@example.com").unwrap().unwrap();
        assert_eq!(
            old.hire_date.map(|d| d.format("%Y-%m-%d").to_string()),
            Some("2019-06-01".to_string())
        );
    }

    #[test]
    fn store_reports_unparsable_timestamps() {
        let store = EmployeeStore::open_in_memory().unwrap();
        store
            .conn
            .execute(
                "INSERT INTO employees (first_name, last_name, email, hire_date)
                 VALUES ('Bad', 'Row', 'bad@example.com', 'yesterday')",
                [],
            )
            .unwrap();

        assert!(matches!(
            store.get_all(),
            Err(StoreError::InvalidTimestamp(ref raw)) if raw == "yesterday"
        ));
    }
}
