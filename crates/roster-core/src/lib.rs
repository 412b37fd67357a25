// ABOUTME: Core library for roster, containing the employee record model.
// ABOUTME: This crate defines the shared data types used by the store and the HTTP server.

pub mod employee;
pub mod input;

pub use employee::Employee;
pub use input::{EmployeePatch, NewEmployee, SearchFilter, double_option};
