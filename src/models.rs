use chrono::{DateTime, Local};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Program {
    Accountancy,
    Architecture,
    Education,
    Engineering,
    Medical,
}

impl Program {
    pub const ALL: [Program; 5] = [
        Program::Accountancy,
        Program::Architecture,
        Program::Education,
        Program::Engineering,
        Program::Medical,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Program::Accountancy => "Accountancy",
            Program::Architecture => "Architecture",
            Program::Education => "Education",
            Program::Engineering => "Engineering",
            Program::Medical => "Medical",
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Program {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        Program::ALL
            .into_iter()
            .find(|program| program.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| format!("unknown program '{value}'"))
    }
}

/// Year of study, always within 1..=4.
///
/// The gateway is loose about its JSON types, so both `2` and `"2"` are
/// accepted on the way in. It always goes out as a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearLevel(u8);

impl YearLevel {
    pub const ALL: [YearLevel; 4] = [YearLevel(1), YearLevel(2), YearLevel(3), YearLevel(4)];

    pub fn new(value: u8) -> Option<Self> {
        (1..=4).contains(&value).then_some(Self(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for YearLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for YearLevel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        value
            .parse::<u8>()
            .ok()
            .and_then(YearLevel::new)
            .ok_or_else(|| format!("year level must be 1-4, got '{value}'"))
    }
}

impl Serialize for YearLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.0)
    }
}

impl<'de> Deserialize<'de> for YearLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        let parsed = match Raw::deserialize(deserializer)? {
            Raw::Number(number) => u8::try_from(number).ok().and_then(YearLevel::new),
            Raw::Text(text) => text.parse().ok(),
        };
        parsed.ok_or_else(|| serde::de::Error::custom("year_level must be between 1 and 4"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub student_id: String,
    pub name: String,
    pub program: Program,
    pub year_level: YearLevel,
    pub email_address: String,
}

#[derive(Debug, Deserialize)]
pub struct OpenModalRequest {
    #[serde(default)]
    pub kind: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StudentIdRequest {
    pub student_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PasswordRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteRequest<'a> {
    pub student_id: &'a str,
}

/// Envelope shared by every JSON endpoint of the record gateway.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewayReply {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub students: Option<Vec<StudentRecord>>,
}

impl GatewayReply {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }

    /// Server message, or `fallback` when the server sent none.
    pub fn message_or(&self, fallback: &str) -> String {
        match self.message.as_deref().map(str::trim) {
            Some(message) if !message.is_empty() => message.to_string(),
            _ => fallback.to_string(),
        }
    }

    pub fn into_students(self) -> Vec<StudentRecord> {
        self.students.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgramCount {
    pub name: Program,
    pub value: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct YearCount {
    pub year: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartAggregate {
    pub programs: Vec<ProgramCount>,
    pub year_levels: Vec<YearCount>,
    pub computed_at: DateTime<Local>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModalSnapshot {
    pub open: bool,
    pub kind: Option<String>,
    pub step: Option<u8>,
}
