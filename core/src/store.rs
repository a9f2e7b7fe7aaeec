//! Client-side state for the employee resource.

use tracing::{debug, error};

use crate::builder::RequestBuilder;
use crate::error::RequestError;
use crate::types::{Employee, Page};

pub const EMPLOYEES_PATH: &str = "/employees";

/// Loading flag plus the last successfully fetched employee list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeeStore {
    loading: bool,
    employees: Vec<Employee>,
}

impl EmployeeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    /// Replace the list with the `data` array of `GET /employees`.
    ///
    /// Failures are logged and leave the current list in place. `loading` is
    /// false again when this returns, whatever happened.
    pub async fn fetch_employees(&mut self, builder: &RequestBuilder) {
        self.loading = true;

        match Self::request_employees(builder).await {
            Ok(employees) => {
                debug!(count = employees.len(), "employees fetched");
                self.employees = employees;
            }
            Err(e) => error!("{e}"),
        }

        self.loading = false;
    }

    async fn request_employees(builder: &RequestBuilder) -> Result<Vec<Employee>, RequestError> {
        let outcome = builder.get(EMPLOYEES_PATH, &[]).await;
        match outcome.into_data::<Page<Employee>>()? {
            Some(page) => Ok(page.data),
            None => Err(RequestError::Deserialization(
                "employee list response had no body".to_string(),
            )),
        }
    }
}
