use crate::config::Config;
use crate::errors::GatewayError;
use crate::models::{DeleteRequest, GatewayReply, Program, StudentRecord, YearLevel};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};

/// How a single student is looked up on `search-student`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudentLookup {
    Name(String),
    StudentId(String),
}

impl StudentLookup {
    pub fn query_pair(&self) -> (&'static str, &str) {
        match self {
            StudentLookup::Name(name) => ("name", name),
            StudentLookup::StudentId(id) => ("student_id", id),
        }
    }
}

/// Optional constraints for `view-student`. `None` means unconstrained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StudentFilter {
    pub program: Option<Program>,
    pub year_level: Option<YearLevel>,
}

impl StudentFilter {
    pub fn program(program: Program) -> Self {
        Self {
            program: Some(program),
            year_level: None,
        }
    }

    pub fn year_level(year_level: YearLevel) -> Self {
        Self {
            program: None,
            year_level: Some(year_level),
        }
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(2);
        if let Some(program) = self.program {
            pairs.push(("program", program.to_string()));
        }
        if let Some(year_level) = self.year_level {
            pairs.push(("year_level", year_level.to_string()));
        }
        pairs
    }
}

/// Client for the external record gateway.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct Gateway {
    client: Client,
    base_url: String,
    suffix: String,
}

impl Gateway {
    pub fn new(base_url: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            suffix: suffix.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.gateway_url, &config.gateway_suffix)
    }

    pub fn endpoint(&self, name: &str) -> String {
        format!("{}/{}{}", self.base_url, name, self.suffix)
    }

    pub async fn add_student(&self, record: &StudentRecord) -> Result<GatewayReply, GatewayError> {
        let reply = self.post_json("add-student", record).await?;
        if reply.is_success() {
            info!(student_id = %record.student_id, "student added");
        }
        Ok(reply)
    }

    pub async fn search_students(&self, lookup: &StudentLookup) -> Result<GatewayReply, GatewayError> {
        let url = self.endpoint("search-student");
        debug!(%url, ?lookup, "searching students");
        let response = self
            .client
            .get(url)
            .query(&[lookup.query_pair()])
            .send()
            .await?;
        decode_reply(response).await
    }

    pub async fn edit_student(&self, record: &StudentRecord) -> Result<GatewayReply, GatewayError> {
        let reply = self.post_json("edit-student", record).await?;
        if reply.is_success() {
            info!(student_id = %record.student_id, "student updated");
        }
        Ok(reply)
    }

    pub async fn delete_student(&self, student_id: &str) -> Result<GatewayReply, GatewayError> {
        let reply = self
            .post_json("delete-student", &DeleteRequest { student_id })
            .await?;
        if reply.is_success() {
            info!(%student_id, "student deleted");
        }
        Ok(reply)
    }

    pub async fn view_students(&self, filter: &StudentFilter) -> Result<GatewayReply, GatewayError> {
        let url = self.endpoint("view-student");
        let pairs = filter.query_pairs();
        debug!(%url, ?pairs, "listing students");
        let mut request = self.client.get(url);
        if !pairs.is_empty() {
            request = request.query(&pairs);
        }
        decode_reply(request.send().await?).await
    }

    /// Asks the gateway to render a document for `record` and returns its bytes.
    pub async fn generate_pdf(&self, record: &StudentRecord) -> Result<Vec<u8>, GatewayError> {
        let response = self
            .client
            .post(self.endpoint("pdf-generation"))
            .json(record)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status(status));
        }
        Ok(response.bytes().await?.to_vec())
    }

    async fn post_json<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &T,
    ) -> Result<GatewayReply, GatewayError> {
        let response = self
            .client
            .post(self.endpoint(endpoint))
            .json(body)
            .send()
            .await?;
        decode_reply(response).await
    }
}

// The gateway reports business failures in the body, sometimes alongside a
// non-2xx status, so the body is decoded regardless of status.
async fn decode_reply(response: reqwest::Response) -> Result<GatewayReply, GatewayError> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_base_name_and_suffix() {
        let gateway = Gateway::new("http://localhost/hanlim-api/controllers/", ".php");
        assert_eq!(
            gateway.endpoint("view-student"),
            "http://localhost/hanlim-api/controllers/view-student.php"
        );

        let bare = Gateway::new("http://127.0.0.1:9000", "");
        assert_eq!(bare.endpoint("add-student"), "http://127.0.0.1:9000/add-student");
    }

    #[test]
    fn filter_emits_only_constrained_pairs() {
        assert!(StudentFilter::default().query_pairs().is_empty());
        assert_eq!(
            StudentFilter::program(Program::Engineering).query_pairs(),
            vec![("program", "Engineering".to_string())]
        );
        let both = StudentFilter {
            program: Some(Program::Medical),
            year_level: YearLevel::new(3),
        };
        assert_eq!(
            both.query_pairs(),
            vec![("program", "Medical".to_string()), ("year_level", "3".to_string())]
        );
    }

    #[test]
    fn lookup_picks_parameter_name() {
        assert_eq!(
            StudentLookup::Name("Alice".into()).query_pair(),
            ("name", "Alice")
        );
        assert_eq!(
            StudentLookup::StudentId("42".into()).query_pair(),
            ("student_id", "42")
        );
    }
}
