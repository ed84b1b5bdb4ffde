use std::collections::HashMap;

use crate::model::{department::Department, employee::Employee, employee::EmployeeLabel};

/// Employees and departments a report is drawn against.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    employees: Vec<Employee>,
    departments: Vec<Department>,
    employee_index: HashMap<i64, usize>,
    department_index: HashMap<i64, usize>,
}

impl Roster {
    pub fn new(employees: Vec<Employee>, departments: Vec<Department>) -> Self {
        let employee_index = employees.iter().enumerate().map(|(i, e)| (e.id, i)).collect();
        let department_index = departments.iter().enumerate().map(|(i, d)| (d.id, i)).collect();
        Self {
            employees,
            departments,
            employee_index,
            department_index,
        }
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn departments(&self) -> &[Department] {
        &self.departments
    }

    pub fn active_employees(&self) -> impl Iterator<Item = &Employee> {
        self.employees.iter().filter(|e| e.is_active)
    }

    pub fn employee(&self, id: i64) -> Option<&Employee> {
        self.employee_index.get(&id).map(|&i| &self.employees[i])
    }

    pub fn department(&self, id: i64) -> Option<&Department> {
        self.department_index.get(&id).map(|&i| &self.departments[i])
    }

    pub fn label(&self, employee_id: i64) -> EmployeeLabel {
        match self.employee(employee_id) {
            Some(e) => {
                let mut label = EmployeeLabel::from(e);
                if label.dept_name.is_none() {
                    label.dept_name = e
                        .department_id
                        .and_then(|d| self.department(d))
                        .map(|d| d.dept_name.clone());
                }
                label
            }
            None => EmployeeLabel::unknown(employee_id),
        }
    }

    /// Restrict to one department (employees and the department itself).
    pub fn for_department(&self, department_id: i64) -> Roster {
        Roster::new(
            self.employees
                .iter()
                .filter(|e| e.department_id == Some(department_id))
                .cloned()
                .collect(),
            self.departments
                .iter()
                .filter(|d| d.id == department_id)
                .cloned()
                .collect(),
        )
    }

    /// Restrict to one employee, keeping all departments for labelling.
    pub fn for_employee(&self, employee_id: i64) -> Roster {
        Roster::new(
            self.employees
                .iter()
                .filter(|e| e.id == employee_id)
                .cloned()
                .collect(),
            self.departments.clone(),
        )
    }
}
