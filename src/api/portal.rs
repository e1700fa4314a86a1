//! ERP platform and login/timetable service.

use chrono::NaiveDate;
use reqwest::header::ACCEPT;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::auth::AuthContext;
use crate::config::Config;
use crate::error::{PortalError, Result};
use crate::models::quiz::Envelope;
use crate::models::user::{CardAction, LoginRequest, LoginResponse};
use crate::models::{AttendanceRecord, AttendanceReport, CourseAttendance, EvaluatedQuiz, TimeTable};

use super::quiz::HttpQuizBackend;

const ATTENDANCE_SUMMARY: &str = "api/v1/custom/getCFMappedWithStudentID";
const CARDS: &str = "api/v1/cards";
const EVALUATED_QUIZZES: &str = "api/v1/custom/myEvaluatedQuizzes";
const LOGIN: &str = "v2/login";
const TIMETABLE: &str = "timetable";

/// Client for everything except the quiz session itself.
#[derive(Debug, Clone)]
pub struct PortalClient {
    http: reqwest::Client,
    erp_url: Url,
    aims_url: Url,
    quiz_url: Url,
}

impl PortalClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("student-portal/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            erp_url: config.erp_url.clone(),
            aims_url: config.aims_url.clone(),
            quiz_url: config.quiz_url.clone(),
        })
    }

    /// Quiz backend bound to the logged-in student.
    pub fn quiz_backend(&self, auth: &AuthContext) -> HttpQuizBackend {
        HttpQuizBackend::new(self.http.clone(), self.quiz_url.clone(), auth.quiz_credentials())
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthContext> {
        if username.is_empty() || password.is_empty() {
            return Err(PortalError::Validation(
                "Please enter both username and password".to_string(),
            ));
        }

        let response = self
            .http
            .post(self.aims_url.join(LOGIN)?)
            .header(ACCEPT, "application/json")
            .json(&LoginRequest { username, password })
            .send()
            .await?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "login rejected");
            return Err(PortalError::Validation(
                "Invalid credentials. Please try again.".to_string(),
            ));
        }

        let login: LoginResponse = read_json(response).await?;
        Ok(AuthContext::new(login.token, login.user))
    }

    /// Per-course attendance summaries plus the aggregate row.
    #[instrument(skip_all)]
    pub async fn attendance(&self, auth: &AuthContext) -> Result<AttendanceReport> {
        let mut url = self.erp_url.join(ATTENDANCE_SUMMARY)?;
        url.set_query(Some("embed_attendance_summary=1"));

        let rows: Vec<CourseAttendance> = self.erp_list(self.http.get(url), auth).await?;
        info!(rows = rows.len(), "fetched attendance summary");
        Ok(AttendanceReport::from(rows))
    }

    /// Lecture-by-lecture attendance for one course mapping.
    #[instrument(skip(self, auth))]
    pub async fn attendance_records(&self, auth: &AuthContext, mapping_id: u64) -> Result<Vec<AttendanceRecord>> {
        let mut url = self.erp_url.join(CARDS)?;
        url.set_query(Some(&format!(
            "type=Attendance&sort_by=+datetime1&equalto___fk_student={}&equalto___cf_id={}",
            auth.user().id,
            mapping_id
        )));

        self.erp_list(self.http.get(url), auth).await
    }

    /// Every lecture recorded for the student on `date`, across courses,
    /// in start-time order.
    #[instrument(skip(self, auth))]
    pub async fn attendance_on(&self, auth: &AuthContext, date: NaiveDate) -> Result<Vec<AttendanceRecord>> {
        let mut url = self.erp_url.join(CARDS)?;
        url.set_query(Some(&format!(
            "type=Attendance&sort_by=+datetime1&equalto___fk_student={}&like___start_time={}",
            auth.user().id,
            date.format("%Y-%m-%d")
        )));

        let mut records: Vec<AttendanceRecord> = self.erp_list(self.http.get(url), auth).await?;
        // Unparseable start times sort last.
        records.sort_by_cached_key(|record| {
            let started = record.started_at();
            (started.is_none(), started)
        });
        Ok(records)
    }

    #[instrument(skip_all)]
    pub async fn evaluated_quizzes(&self, auth: &AuthContext) -> Result<Vec<EvaluatedQuiz>> {
        let url = self.erp_url.join(EVALUATED_QUIZZES)?;
        self.erp_list(self.http.get(url), auth).await
    }

    #[instrument(skip_all)]
    pub async fn timetable(&self, auth: &AuthContext) -> Result<TimeTable> {
        let response = self
            .http
            .post(self.aims_url.join(TIMETABLE)?)
            .header(ACCEPT, "application/json")
            .json(&json!({ "token": auth.token() }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PortalError::Server("Failed to load timetable".to_string()));
        }
        read_json(response).await
    }

    #[instrument(skip_all)]
    pub async fn change_password(
        &self,
        auth: &AuthContext,
        current: &str,
        new: &str,
        confirm: &str,
    ) -> Result<()> {
        if new != confirm {
            return Err(PortalError::Validation("New passwords do not match".to_string()));
        }
        if new.is_empty() {
            return Err(PortalError::Validation("New password must not be empty".to_string()));
        }

        self.patch_card(
            auth,
            &CardAction::ChangePassword {
                card_unique_code: &auth.user().username,
                current_password: current,
                password: new,
            },
            "Failed to change password",
        )
        .await
    }

    #[instrument(skip_all)]
    pub async fn set_pin(&self, auth: &AuthContext, pin: &str) -> Result<()> {
        validate_pin(pin)?;
        self.patch_card(
            auth,
            &CardAction::SetPin {
                card_unique_code: &auth.user().username,
                pin,
            },
            "Failed to change PIN",
        )
        .await
    }

    async fn patch_card(&self, auth: &AuthContext, action: &CardAction<'_>, fallback: &str) -> Result<()> {
        let response = self
            .http
            .patch(self.erp_url.join(CARDS)?)
            .bearer_auth(auth.token())
            .json(action)
            .send()
            .await?;

        let ok = response.status().is_success();
        let envelope: Envelope = read_json(response).await?;
        if ok {
            Ok(())
        } else {
            Err(PortalError::Server(
                envelope.message().unwrap_or(fallback).to_string(),
            ))
        }
    }

    /// GET against the ERP returning `{response: {data: [...]}}`.
    async fn erp_list<T: DeserializeOwned>(&self, request: RequestBuilder, auth: &AuthContext) -> Result<Vec<T>> {
        let response = request.bearer_auth(auth.token()).send().await?;
        if !response.status().is_success() {
            return Err(PortalError::Server(format!(
                "ERP request failed with status {}",
                response.status()
            )));
        }

        let envelope: Envelope<Vec<T>> = read_json(response).await?;
        envelope
            .into_data()
            .ok_or_else(|| PortalError::UnexpectedResponse("missing response.data".to_string()))
    }
}

/// PINs are exactly four digits.
pub fn validate_pin(pin: &str) -> Result<()> {
    if pin.len() == 4 && pin.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(PortalError::Validation("PIN must be 4 digits".to_string()))
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let text = response.text().await?;
    debug!(bytes = text.len(), "read response body");
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_pin() {
        assert!(validate_pin("0427").is_ok());
        assert!(validate_pin("427").is_err());
        assert!(validate_pin("04a7").is_err());
        assert!(validate_pin("04270").is_err());
    }
}
