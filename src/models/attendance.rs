//! Attendance payloads from the ERP platform.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};

use super::time;

/// Course code of the aggregate row in the attendance summary listing.
pub const TOTAL_COURSE_CODE: &str = "Total";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseData {
    #[serde(default)]
    pub course_code: String,
    #[serde(default)]
    pub course_name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AttendanceSummary {
    #[serde(rename = "Present", default)]
    pub present: u32,
    #[serde(rename = "Absent", default)]
    pub absent: u32,
    #[serde(rename = "Total", default)]
    pub total: u32,
    #[serde(rename = "Percent", default, deserialize_with = "percent")]
    pub percent: f64,
}

impl AttendanceSummary {
    /// Lectures missed, derived from the counts rather than trusting `Absent`.
    pub fn missed(&self) -> u32 {
        self.total.saturating_sub(self.present)
    }
}

/// One course-faculty mapping with its embedded attendance summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseAttendance {
    /// Mapping id used to filter daily attendance cards.
    #[serde(default)]
    pub id: Option<u64>,
    pub cf_id: u64,
    #[serde(default)]
    pub cdata: CourseData,
    #[serde(default)]
    pub faculty_name: Option<String>,
    #[serde(default)]
    pub attendance_summary: AttendanceSummary,
}

impl CourseAttendance {
    pub fn is_aggregate(&self) -> bool {
        self.cdata.course_code == TOTAL_COURSE_CODE
    }
}

/// Attendance summary listing split into the aggregate row and the courses
/// that have at least one lecture recorded.
#[derive(Debug, Clone, Default)]
pub struct AttendanceReport {
    pub overall: Option<CourseAttendance>,
    pub courses: Vec<CourseAttendance>,
}

impl From<Vec<CourseAttendance>> for AttendanceReport {
    fn from(rows: Vec<CourseAttendance>) -> Self {
        let mut report = AttendanceReport::default();
        for row in rows {
            if row.is_aggregate() {
                report.overall = Some(row);
            } else if row.attendance_summary.total > 0 {
                report.courses.push(row);
            }
        }
        report
    }
}

/// A single attendance card (one lecture).
#[derive(Debug, Clone, Deserialize)]
pub struct AttendanceRecord {
    pub id: u64,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub date_formatted: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default)]
    pub faculty_name: Option<String>,
}

impl AttendanceRecord {
    pub fn is_present(&self) -> bool {
        self.status.eq_ignore_ascii_case("present")
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        time::parse_timestamp(&self.start_time)
    }
}

/// The ERP sends `Percent` as a string ("82.5"); older rows use a number.
fn percent<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) if s.trim().is_empty() => Ok(0.0),
        Raw::Text(s) => s
            .trim()
            .trim_end_matches('%')
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid percentage: {s}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(code: &str, present: u32, total: u32) -> CourseAttendance {
        CourseAttendance {
            id: Some(1),
            cf_id: 10,
            cdata: CourseData {
                course_code: code.to_string(),
                course_name: code.to_string(),
            },
            faculty_name: None,
            attendance_summary: AttendanceSummary {
                present,
                absent: total - present,
                total,
                percent: 0.0,
            },
        }
    }

    #[test]
    fn test_summary_accepts_string_and_number_percent() {
        let s: AttendanceSummary =
            serde_json::from_str(r#"{"Present": 30, "Absent": 10, "Total": 40, "Percent": "75.00"}"#).unwrap();
        assert_eq!(s.percent, 75.0);
        assert_eq!(s.missed(), 10);

        let s: AttendanceSummary = serde_json::from_str(r#"{"Present": 1, "Total": 2, "Percent": 50}"#).unwrap();
        assert_eq!(s.percent, 50.0);
    }

    #[test]
    fn test_report_splits_aggregate_and_skips_empty_courses() {
        let report = AttendanceReport::from(vec![
            row("KCS501", 20, 25),
            row(TOTAL_COURSE_CODE, 50, 60),
            row("KCS599", 0, 0),
            row("KCS502", 30, 35),
        ]);

        assert_eq!(report.overall.map(|o| o.attendance_summary.present), Some(50));
        let codes: Vec<_> = report.courses.iter().map(|c| c.cdata.course_code.as_str()).collect();
        assert_eq!(codes, ["KCS501", "KCS502"]);
    }
}
