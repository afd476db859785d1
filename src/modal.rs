use crate::models::ModalSnapshot;
use crate::wizard::{StepOutcome, Transition, Wizard};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Add,
    Edit,
    Delete,
    Search,
}

impl ActionKind {
    pub const ALL: [ActionKind; 4] = [
        ActionKind::Add,
        ActionKind::Edit,
        ActionKind::Delete,
        ActionKind::Search,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Add => "add",
            ActionKind::Edit => "edit",
            ActionKind::Delete => "delete",
            ActionKind::Search => "search",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ActionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value.trim())
            .ok_or_else(|| format!("unknown action '{value}'"))
    }
}

/// What the open modal is showing.
#[derive(Debug, Clone)]
pub enum ModalContent {
    Wizard(Wizard),
    /// The requested kind was not recognized; keeps the raw text for the title.
    Unknown(String),
}

/// Overlay holding at most one wizard. Visibility is its only state of its
/// own; closing drops the wizard and all of its scratch input with it.
#[derive(Debug, Clone, Default)]
pub struct ActionModal {
    content: Option<ModalContent>,
}

impl ActionModal {
    pub fn open(&mut self, kind: &str, delete_password: &str) {
        self.content = Some(match kind.parse::<ActionKind>() {
            Ok(kind) => ModalContent::Wizard(Wizard::new(kind, delete_password)),
            Err(_) => ModalContent::Unknown(kind.trim().to_string()),
        });
    }

    pub fn close(&mut self) {
        self.content = None;
    }

    pub fn is_open(&self) -> bool {
        self.content.is_some()
    }

    pub fn content(&self) -> Option<&ModalContent> {
        self.content.as_ref()
    }

    pub fn wizard(&self) -> Option<&Wizard> {
        match &self.content {
            Some(ModalContent::Wizard(wizard)) => Some(wizard),
            _ => None,
        }
    }

    pub fn wizard_mut(&mut self) -> Option<&mut Wizard> {
        match &mut self.content {
            Some(ModalContent::Wizard(wizard)) => Some(wizard),
            _ => None,
        }
    }

    pub fn title(&self) -> String {
        let kind = match &self.content {
            Some(ModalContent::Wizard(wizard)) => wizard.kind().as_str().to_string(),
            Some(ModalContent::Unknown(kind)) => kind.clone(),
            None => String::new(),
        };
        format!("{} STUDENT", kind.to_uppercase()).trim().to_string()
    }

    /// The edit wizard draws its own close button inside its form.
    pub fn shows_close_button(&self) -> bool {
        !matches!(self.wizard(), Some(Wizard::Edit(_)))
    }

    /// Applies a step's transition. Returns true when the modal closed.
    pub fn apply(&mut self, outcome: &StepOutcome) -> bool {
        if outcome.transition == Transition::Close {
            self.close();
            return true;
        }
        false
    }

    pub fn snapshot(&self) -> ModalSnapshot {
        match &self.content {
            Some(ModalContent::Wizard(wizard)) => ModalSnapshot {
                open: true,
                kind: Some(wizard.kind().to_string()),
                step: Some(wizard.step()),
            },
            Some(ModalContent::Unknown(kind)) => ModalSnapshot {
                open: true,
                kind: Some(kind.clone()),
                step: None,
            },
            None => ModalSnapshot {
                open: false,
                kind: None,
                step: None,
            },
        }
    }
}
