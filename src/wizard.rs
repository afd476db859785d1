//! Step-based forms behind the action modal.
//!
//! Each wizard owns its scratch input and advances only after a validated,
//! successful step. A step sends at most one gateway request and awaits it
//! before returning, so a wizard never has two requests in flight.

use crate::errors::ValidationError;
use crate::gateway::{Gateway, StudentFilter, StudentLookup};
use crate::modal::ActionKind;
use crate::models::{Program, StudentRecord, YearLevel};
use serde::Deserialize;
use std::str::FromStr;
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Stay,
    Advance,
    Close,
}

/// What a submitted step asks of the modal and the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub transition: Transition,
    pub alert: Option<String>,
    /// Set by search only; replaces the displayed list when present.
    pub results: Option<Vec<StudentRecord>>,
}

impl StepOutcome {
    fn stay(alert: impl Into<String>) -> Self {
        Self {
            transition: Transition::Stay,
            alert: Some(alert.into()),
            results: None,
        }
    }

    fn rejected(err: ValidationError) -> Self {
        Self::stay(err.to_string())
    }

    fn advance() -> Self {
        Self {
            transition: Transition::Advance,
            alert: None,
            results: None,
        }
    }

    fn close(alert: impl Into<String>) -> Self {
        Self {
            transition: Transition::Close,
            alert: Some(alert.into()),
            results: None,
        }
    }
}

/// Raw student fields as typed into a form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StudentForm {
    pub name: String,
    pub student_id: String,
    pub program: String,
    pub year_level: String,
    pub email_address: String,
}

impl StudentForm {
    pub fn validate(&self) -> Result<StudentRecord, ValidationError> {
        let student_id = self.student_id.trim();
        let name = self.name.trim();
        let program = self.program.trim();
        let year_level = self.year_level.trim();
        let email_address = self.email_address.trim();

        if [student_id, name, program, year_level, email_address]
            .iter()
            .any(|field| field.is_empty())
        {
            return Err(ValidationError::MissingFields);
        }

        Ok(StudentRecord {
            student_id: student_id.to_string(),
            name: name.to_string(),
            program: Program::from_str(program)
                .map_err(|_| ValidationError::InvalidProgram(program.to_string()))?,
            year_level: YearLevel::from_str(year_level)
                .map_err(|_| ValidationError::InvalidYearLevel(year_level.to_string()))?,
            email_address: email_address.to_string(),
        })
    }
}

impl From<&StudentRecord> for StudentForm {
    fn from(record: &StudentRecord) -> Self {
        Self {
            name: record.name.clone(),
            student_id: record.student_id.clone(),
            program: record.program.to_string(),
            year_level: record.year_level.to_string(),
            email_address: record.email_address.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AddWizard {
    pub draft: StudentForm,
}

impl AddWizard {
    pub async fn submit(&mut self, form: StudentForm, gateway: &Gateway) -> StepOutcome {
        self.draft = form;
        let record = match self.draft.validate() {
            Ok(record) => record,
            Err(err) => return StepOutcome::rejected(err),
        };

        match gateway.add_student(&record).await {
            Ok(reply) if reply.is_success() => {
                self.draft = StudentForm::default();
                StepOutcome::close("Student added successfully.")
            }
            Ok(reply) if !reply.errors.is_empty() => StepOutcome::stay(reply.errors.join("\n")),
            Ok(reply) => StepOutcome::stay(reply.message_or("Failed to add student.")),
            Err(err) => {
                error!(%err, "add student request failed");
                StepOutcome::stay("An error occurred while adding the student.")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditStep {
    #[default]
    Lookup,
    Edit,
}

#[derive(Debug, Clone, Default)]
pub struct EditWizard {
    pub step: EditStep,
    /// Fixed once the lookup succeeds; the edit form cannot change it.
    pub student_id: String,
    pub draft: StudentForm,
}

impl EditWizard {
    pub async fn lookup(&mut self, student_id: &str, gateway: &Gateway) -> StepOutcome {
        let student_id = student_id.trim();
        if student_id.is_empty() {
            return StepOutcome::rejected(ValidationError::MissingStudentId);
        }

        let lookup = StudentLookup::StudentId(student_id.to_string());
        match gateway.search_students(&lookup).await {
            Ok(reply) if reply.is_success() => {
                // Partial matches are not the record being edited.
                let found = reply
                    .into_students()
                    .into_iter()
                    .find(|student| student.student_id == student_id);
                match found {
                    Some(student) => {
                        self.student_id = student_id.to_string();
                        self.draft = StudentForm::from(&student);
                        self.draft.student_id = self.student_id.clone();
                        self.step = EditStep::Edit;
                        StepOutcome::advance()
                    }
                    None => StepOutcome::stay("Student not found."),
                }
            }
            Ok(reply) => StepOutcome::stay(reply.message_or("Student not found.")),
            Err(err) => {
                error!(%err, %student_id, "edit lookup request failed");
                StepOutcome::stay("An error occurred while searching for the student.")
            }
        }
    }

    pub async fn update(&mut self, form: StudentForm, gateway: &Gateway) -> StepOutcome {
        self.draft = StudentForm {
            student_id: self.student_id.clone(),
            ..form
        };
        let record = match self.draft.validate() {
            Ok(record) => record,
            Err(err) => return StepOutcome::rejected(err),
        };

        match gateway.edit_student(&record).await {
            Ok(reply) if reply.is_success() => {
                *self = Self::default();
                StepOutcome::close("Student updated successfully.")
            }
            Ok(reply) => StepOutcome::stay(reply.message_or("Failed to update student.")),
            Err(err) => {
                error!(%err, student_id = %record.student_id, "edit request failed");
                StepOutcome::stay("An error occurred while updating the student.")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeleteStep {
    #[default]
    Unlock,
    Confirm,
}

#[derive(Debug, Clone)]
pub struct DeleteWizard {
    pub step: DeleteStep,
    pub student_id: String,
    password: String,
}

impl DeleteWizard {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            step: DeleteStep::Unlock,
            student_id: String::new(),
            password: password.into(),
        }
    }

    /// Exact comparison: no trimming, case-sensitive.
    pub fn unlock(&mut self, entered: &str) -> StepOutcome {
        if entered != self.password {
            return StepOutcome::rejected(ValidationError::IncorrectPassword);
        }
        self.step = DeleteStep::Confirm;
        StepOutcome::advance()
    }

    pub async fn confirm(&mut self, student_id: &str, gateway: &Gateway) -> StepOutcome {
        self.student_id = student_id.to_string();
        let student_id = student_id.trim();
        if !is_numeric_id(student_id) {
            return StepOutcome::rejected(ValidationError::InvalidStudentId);
        }

        match gateway.delete_student(student_id).await {
            Ok(reply) if reply.is_success() => {
                self.step = DeleteStep::Unlock;
                self.student_id.clear();
                StepOutcome::close("Student deleted successfully.")
            }
            Ok(reply) => StepOutcome::stay(reply.message_or("Failed to delete student.")),
            Err(err) => {
                error!(%err, %student_id, "delete request failed");
                StepOutcome::stay("An error occurred while deleting the student.")
            }
        }
    }
}

/// Matches `^\d+$` on ASCII digits.
pub fn is_numeric_id(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|byte| byte.is_ascii_digit())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchMode {
    #[default]
    Name,
    StudentId,
    Filter,
}

impl SearchMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchMode::Name => "name",
            SearchMode::StudentId => "student_id",
            SearchMode::Filter => "filter",
        }
    }
}

impl FromStr for SearchMode {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "" | "name" => Ok(SearchMode::Name),
            "student_id" | "id" => Ok(SearchMode::StudentId),
            "filter" => Ok(SearchMode::Filter),
            other => Err(ValidationError::InvalidSearchMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SearchForm {
    pub mode: String,
    pub name: String,
    pub student_id: String,
    pub program: String,
    pub year_level: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    Lookup(StudentLookup),
    Filter(StudentFilter),
}

impl SearchForm {
    /// Builds the one query this submission sends, according to the mode.
    pub fn query(&self) -> Result<SearchQuery, ValidationError> {
        match self.mode.parse::<SearchMode>()? {
            SearchMode::Name => {
                let name = self.name.trim();
                if name.is_empty() {
                    return Err(ValidationError::MissingSearchTerm);
                }
                Ok(SearchQuery::Lookup(StudentLookup::Name(name.to_string())))
            }
            SearchMode::StudentId => {
                let student_id = self.student_id.trim();
                if student_id.is_empty() {
                    return Err(ValidationError::MissingSearchTerm);
                }
                Ok(SearchQuery::Lookup(StudentLookup::StudentId(
                    student_id.to_string(),
                )))
            }
            SearchMode::Filter => Ok(SearchQuery::Filter(StudentFilter {
                program: optional_choice(&self.program)
                    .map(|value| {
                        value
                            .parse::<Program>()
                            .map_err(|_| ValidationError::InvalidProgram(value.to_string()))
                    })
                    .transpose()?,
                year_level: optional_choice(&self.year_level)
                    .map(|value| {
                        value
                            .parse::<YearLevel>()
                            .map_err(|_| ValidationError::InvalidYearLevel(value.to_string()))
                    })
                    .transpose()?,
            })),
        }
    }
}

// "None" in a filter select means the field is unconstrained.
fn optional_choice(value: &str) -> Option<&str> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(value)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchWizard {
    pub criteria: SearchForm,
}

impl SearchWizard {
    pub fn mode(&self) -> SearchMode {
        self.criteria.mode.parse().unwrap_or_default()
    }

    pub async fn submit(&mut self, form: SearchForm, gateway: &Gateway) -> StepOutcome {
        self.criteria = form;
        let query = match self.criteria.query() {
            Ok(query) => query,
            Err(err) => return StepOutcome::rejected(err),
        };

        let reply = match &query {
            SearchQuery::Lookup(lookup) => gateway.search_students(lookup).await,
            SearchQuery::Filter(filter) => gateway.view_students(filter).await,
        };

        match reply {
            Ok(reply) if reply.is_success() => {
                self.criteria = SearchForm::default();
                StepOutcome {
                    transition: Transition::Close,
                    alert: None,
                    results: Some(reply.into_students()),
                }
            }
            Ok(reply) => StepOutcome {
                transition: Transition::Stay,
                alert: Some(reply.message_or("No students found.")),
                results: Some(Vec::new()),
            },
            Err(err) => {
                error!(%err, ?query, "search request failed");
                StepOutcome::stay("An error occurred while searching.")
            }
        }
    }
}

/// The one wizard a modal is showing.
#[derive(Debug, Clone)]
pub enum Wizard {
    Add(AddWizard),
    Edit(EditWizard),
    Delete(DeleteWizard),
    Search(SearchWizard),
}

impl Wizard {
    pub fn new(kind: ActionKind, delete_password: &str) -> Self {
        match kind {
            ActionKind::Add => Wizard::Add(AddWizard::default()),
            ActionKind::Edit => Wizard::Edit(EditWizard::default()),
            ActionKind::Delete => Wizard::Delete(DeleteWizard::new(delete_password)),
            ActionKind::Search => Wizard::Search(SearchWizard::default()),
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Wizard::Add(_) => ActionKind::Add,
            Wizard::Edit(_) => ActionKind::Edit,
            Wizard::Delete(_) => ActionKind::Delete,
            Wizard::Search(_) => ActionKind::Search,
        }
    }

    /// 1-based step index for display.
    pub fn step(&self) -> u8 {
        match self {
            Wizard::Edit(wizard) if wizard.step == EditStep::Edit => 2,
            Wizard::Delete(wizard) if wizard.step == DeleteStep::Confirm => 2,
            _ => 1,
        }
    }
}
