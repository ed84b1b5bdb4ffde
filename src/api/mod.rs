use crate::model::roster::Roster;

pub mod attendance;
pub mod directory;
pub mod reports;
pub mod response;

#[cfg(test)]
mod api_tests;

/// Roster restricted the same way the records were.
pub(crate) fn narrow(roster: &Roster, employee_id: Option<i64>, department_id: Option<i64>) -> Roster {
    match (employee_id, department_id) {
        (Some(employee), Some(department)) => roster.for_department(department).for_employee(employee),
        (Some(id), None) => roster.for_employee(id),
        (None, Some(id)) => roster.for_department(id),
        (None, None) => roster.clone(),
    }
}
