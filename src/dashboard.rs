use crate::charts;
use crate::errors::AppError;
use crate::gateway::{Gateway, StudentFilter};
use crate::modal::ActionModal;
use crate::models::{ChartAggregate, StudentRecord};
use crate::wizard::{
    DeleteStep, EditStep, SearchForm, StepOutcome, StudentForm, Wizard,
};
use tracing::{error, info};

/// A generated document ready to hand to the browser.
#[derive(Debug, Clone)]
pub struct PdfDownload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

pub fn pdf_filename(student_name: &str) -> String {
    format!("{student_name}-info.pdf")
}

/// Everything the dashboard page shows. One instance per server process.
#[derive(Debug)]
pub struct Dashboard {
    pub students: Vec<StudentRecord>,
    pub modal: ActionModal,
    pub menu_row: Option<usize>,
    pub charts: Option<ChartAggregate>,
    alert: Option<String>,
    mounted: bool,
    delete_password: String,
}

impl Dashboard {
    pub fn new(delete_password: impl Into<String>) -> Self {
        Self {
            students: Vec::new(),
            modal: ActionModal::default(),
            menu_row: None,
            charts: None,
            alert: None,
            mounted: false,
            delete_password: delete_password.into(),
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// First-render work: the full list fetch and the chart counts. Runs once.
    pub async fn mount(&mut self, gateway: &Gateway) {
        if self.mounted {
            return;
        }
        self.mounted = true;

        let (students, aggregate) =
            futures::join!(load_students(gateway), charts::fetch_aggregate(gateway));
        if let Some(students) = students {
            info!(count = students.len(), "loaded student list");
            self.students = students;
        }
        self.charts = Some(aggregate);
    }

    pub fn open_modal(&mut self, kind: &str) {
        self.modal.open(kind, &self.delete_password);
    }

    pub fn close_modal(&mut self) {
        self.modal.close();
    }

    /// Replaces the displayed list wholesale.
    pub fn report_results(&mut self, students: Vec<StudentRecord>) {
        self.students = students;
    }

    pub fn apply_outcome(&mut self, outcome: StepOutcome) {
        self.modal.apply(&outcome);
        if let Some(results) = outcome.results {
            self.report_results(results);
        }
        if outcome.alert.is_some() {
            self.alert = outcome.alert;
        }
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    /// Alerts show once.
    pub fn take_alert(&mut self) -> Option<String> {
        self.alert.take()
    }

    pub async fn submit_add(&mut self, form: StudentForm, gateway: &Gateway) -> Result<(), AppError> {
        let Some(Wizard::Add(wizard)) = self.modal.wizard_mut() else {
            return Err(AppError::bad_request("the add wizard is not open"));
        };
        let outcome = wizard.submit(form, gateway).await;
        self.apply_outcome(outcome);
        Ok(())
    }

    pub async fn submit_edit_lookup(&mut self, student_id: &str, gateway: &Gateway) -> Result<(), AppError> {
        let wizard = match self.modal.wizard_mut() {
            Some(Wizard::Edit(wizard)) if wizard.step == EditStep::Lookup => wizard,
            _ => return Err(AppError::bad_request("the edit lookup step is not active")),
        };
        let outcome = wizard.lookup(student_id, gateway).await;
        self.apply_outcome(outcome);
        Ok(())
    }

    pub async fn submit_edit(&mut self, form: StudentForm, gateway: &Gateway) -> Result<(), AppError> {
        let wizard = match self.modal.wizard_mut() {
            Some(Wizard::Edit(wizard)) if wizard.step == EditStep::Edit => wizard,
            _ => return Err(AppError::bad_request("the edit step is not active")),
        };
        let outcome = wizard.update(form, gateway).await;
        self.apply_outcome(outcome);
        Ok(())
    }

    pub fn submit_delete_unlock(&mut self, password: &str) -> Result<(), AppError> {
        let wizard = match self.modal.wizard_mut() {
            Some(Wizard::Delete(wizard)) if wizard.step == DeleteStep::Unlock => wizard,
            _ => return Err(AppError::bad_request("the delete password step is not active")),
        };
        let outcome = wizard.unlock(password);
        self.apply_outcome(outcome);
        Ok(())
    }

    pub async fn submit_delete(&mut self, student_id: &str, gateway: &Gateway) -> Result<(), AppError> {
        let wizard = match self.modal.wizard_mut() {
            Some(Wizard::Delete(wizard)) if wizard.step == DeleteStep::Confirm => wizard,
            _ => return Err(AppError::bad_request("the delete confirmation step is not active")),
        };
        let outcome = wizard.confirm(student_id, gateway).await;
        self.apply_outcome(outcome);
        Ok(())
    }

    pub async fn submit_search(&mut self, form: SearchForm, gateway: &Gateway) -> Result<(), AppError> {
        let Some(Wizard::Search(wizard)) = self.modal.wizard_mut() else {
            return Err(AppError::bad_request("the search wizard is not open"));
        };
        let outcome = wizard.submit(form, gateway).await;
        self.apply_outcome(outcome);
        Ok(())
    }

    /// At most one row menu is open; toggling the open row closes it.
    pub fn toggle_menu(&mut self, row: usize) {
        self.menu_row = if self.menu_row == Some(row) {
            None
        } else {
            Some(row)
        };
    }

    pub async fn download(&mut self, row: usize, gateway: &Gateway) -> Option<PdfDownload> {
        self.menu_row = None;
        let Some(record) = self.students.get(row).cloned() else {
            error!(row, "download requested for a row that is not displayed");
            self.alert = Some("Failed to download PDF.".to_string());
            return None;
        };

        match gateway.generate_pdf(&record).await {
            Ok(bytes) => Some(PdfDownload {
                filename: pdf_filename(&record.name),
                bytes,
            }),
            Err(err) => {
                error!(%err, student_id = %record.student_id, "document download failed");
                self.alert = Some("Failed to download PDF.".to_string());
                None
            }
        }
    }
}

async fn load_students(gateway: &Gateway) -> Option<Vec<StudentRecord>> {
    match gateway.view_students(&StudentFilter::default()).await {
        Ok(reply) if reply.is_success() => Some(reply.into_students()),
        Ok(reply) => {
            error!(status = %reply.status, "student list request was not successful");
            None
        }
        Err(err) => {
            error!(%err, "failed to load student list");
            None
        }
    }
}
