// ABOUTME: Input shapes for creating, patching, and searching employee records.
// ABOUTME: These are already-validated values; HTTP-level parsing lives in the server crate.

use serde::{Deserialize, Deserializer};

/// Fields needed to create a new employee. The store assigns `id` and
/// `hire_date`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEmployee {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department: Option<String>,
    pub position: Option<String>,
    pub salary: Option<f64>,
}

impl NewEmployee {
    /// Create a NewEmployee with the required fields. Optional fields default to None.
    pub fn new(first_name: String, last_name: String, email: String) -> Self {
        Self {
            first_name,
            last_name,
            email,
            department: None,
            position: None,
            salary: None,
        }
    }
}

/// A partial update. `None` leaves a column untouched. For nullable columns,
/// `Some(None)` clears the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeePatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub department: Option<Option<String>>,
    pub position: Option<Option<String>>,
    pub salary: Option<Option<f64>>,
}

impl EmployeePatch {
    /// True when applying the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.department.is_none()
            && self.position.is_none()
            && self.salary.is_none()
    }
}

/// Optional filters for employee search. Each present, non-empty term matches
/// as a case-insensitive substring of its column.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchFilter {
    pub department: Option<String>,
    pub position: Option<String>,
}

impl SearchFilter {
    /// The department term, ignoring an empty string.
    pub fn department_term(&self) -> Option<&str> {
        non_empty(&self.department)
    }

    /// The position term, ignoring an empty string.
    pub fn position_term(&self) -> Option<&str> {
        non_empty(&self.position)
    }
}

/// Build a filter from raw query pairs. The first occurrence of a key wins;
/// unknown keys are ignored.
impl FromIterator<(String, String)> for SearchFilter {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(pairs: I) -> Self {
        let mut filter = SearchFilter::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "department" => &mut filter.department,
                "position" => &mut filter.position,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        filter
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Deserialize a field so that an explicit `null` is distinguishable from an
/// absent key: absent stays `None` (via `#[serde(default)]`), `null` becomes
/// `Some(None)`, and a value becomes `Some(Some(v))`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
