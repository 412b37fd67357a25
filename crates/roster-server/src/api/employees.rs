// ABOUTME: Employee CRUD and search API handlers.
// ABOUTME: Validates request bodies, guards email uniqueness, and runs one store operation per request.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use roster_core::{Employee, EmployeePatch, NewEmployee, SearchFilter, double_option};
use serde::{Deserialize, Serialize};

use crate::app_state::SharedState;
use crate::error::ApiError;

/// Request body for creating an employee. Required fields are optional here
/// so that a missing field produces a field-specific message.
#[derive(Debug, Deserialize)]
pub struct CreateEmployeeRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub salary: Option<f64>,
}

impl CreateEmployeeRequest {
    /// Check required fields in order and build the store input.
    pub fn validate(self) -> Result<NewEmployee, ApiError> {
        let first_name = required("first_name", self.first_name)?;
        let last_name = required("last_name", self.last_name)?;
        let email = required("email", self.email)?;

        Ok(NewEmployee {
            first_name,
            last_name,
            email,
            department: self.department,
            position: self.position,
            salary: self.salary,
        })
    }
}

/// Request body for updating an employee. Every field distinguishes "absent"
/// from an explicit `null`.
#[derive(Debug, Deserialize)]
pub struct UpdateEmployeeRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub first_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub last_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub department: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub position: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub salary: Option<Option<f64>>,
}

impl UpdateEmployeeRequest {
    /// Reject attempts to blank out a required field and build the patch.
    pub fn validate(self) -> Result<EmployeePatch, ApiError> {
        Ok(EmployeePatch {
            first_name: not_blank("first_name", self.first_name)?,
            last_name: not_blank("last_name", self.last_name)?,
            email: not_blank("email", self.email)?,
            department: self.department,
            position: self.position,
            salary: self.salary,
        })
    }
}

fn required(field: &str, value: Option<String>) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::Validation(format!("{field} is required"))),
    }
}

fn not_blank(field: &str, value: Option<Option<String>>) -> Result<Option<String>, ApiError> {
    match value {
        None => Ok(None),
        Some(Some(v)) if !v.is_empty() => Ok(Some(v)),
        Some(_) => Err(ApiError::Validation(format!("{field} cannot be empty"))),
    }
}

/// Response body for list and search.
#[derive(Debug, Serialize)]
pub struct EmployeeListResponse {
    pub count: usize,
    pub employees: Vec<Employee>,
}

impl From<Vec<Employee>> for EmployeeListResponse {
    fn from(employees: Vec<Employee>) -> Self {
        Self {
            count: employees.len(),
            employees,
        }
    }
}

/// Response body for create and update.
#[derive(Debug, Serialize)]
pub struct EmployeeMessageResponse {
    pub message: String,
    pub employee: Employee,
}

/// POST /api/employees - Create a new employee.
pub async fn create_employee(
    State(state): State<SharedState>,
    payload: Result<Json<CreateEmployeeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<EmployeeMessageResponse>), ApiError> {
    let Json(req) = payload?;
    let new = req.validate()?;

    let store = state.store.lock().await;
    if store.find_by_email(&new.email)?.is_some() {
        return Err(ApiError::email_exists());
    }
    let employee = store.insert(&new)?;
    drop(store);

    tracing::info!("created {} with id {}", employee, employee.id);

    Ok((
        StatusCode::CREATED,
        Json(EmployeeMessageResponse {
            message: "Employee created successfully".to_string(),
            employee,
        }),
    ))
}

/// GET /api/employees - List every employee.
pub async fn list_employees(
    State(state): State<SharedState>,
) -> Result<Json<EmployeeListResponse>, ApiError> {
    let employees = state.store.lock().await.get_all()?;
    Ok(Json(employees.into()))
}

/// GET /api/employees/{id} - Fetch one employee.
pub async fn get_employee(
    State(state): State<SharedState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Employee>, ApiError> {
    let Path(id) = path?;

    let employee = state
        .store
        .lock()
        .await
        .get_by_id(id)?
        .ok_or_else(ApiError::employee_not_found)?;

    Ok(Json(employee))
}

/// PUT /api/employees/{id} - Update the fields present in the body.
pub async fn update_employee(
    State(state): State<SharedState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateEmployeeRequest>, JsonRejection>,
) -> Result<Json<EmployeeMessageResponse>, ApiError> {
    let Path(id) = path?;

    let store = state.store.lock().await;
    let current = store
        .get_by_id(id)?
        .ok_or_else(ApiError::employee_not_found)?;

    // A missing record wins over a bad body.
    let Json(req) = payload?;
    let mut patch = req.validate()?;
    if patch.email.as_deref() == Some(current.email.as_str()) {
        patch.email = None;
    }
    if let Some(email) = &patch.email {
        if store.find_by_email(email)?.is_some() {
            return Err(ApiError::email_exists());
        }
    }

    let employee = store.update_fields(id, &patch)?;
    drop(store);

    tracing::info!("updated {} with id {}", employee, employee.id);

    Ok(Json(EmployeeMessageResponse {
        message: "Employee updated successfully".to_string(),
        employee,
    }))
}

/// DELETE /api/employees/{id} - Permanently remove an employee.
pub async fn delete_employee(
    State(state): State<SharedState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Path(id) = path?;

    state.store.lock().await.delete(id)?;
    tracing::info!("deleted employee {}", id);

    Ok(Json(
        serde_json::json!({ "message": "Employee deleted successfully" }),
    ))
}

/// GET /api/employees/search?department=&position= - Case-insensitive
/// substring search.
pub async fn search_employees(
    State(state): State<SharedState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<EmployeeListResponse>, ApiError> {
    let Query(pairs) = query?;
    let filter: SearchFilter = pairs.into_iter().collect();
    let employees = state.store.lock().await.search(&filter)?;
    Ok(Json(employees.into()))
}
