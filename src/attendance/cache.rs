//! Best-effort on-disk copy of the last fetched attendance summaries.
//!
//! Write-through: every store rewrites the file. There is no eviction; a
//! refresh replaces the whole set.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{PortalError, Result};
use crate::models::CourseAttendance;

const CACHE_FILE: &str = "attendance.json";

pub struct AttendanceCache {
    path: PathBuf,
    courses: BTreeMap<u64, CourseAttendance>,
}

impl AttendanceCache {
    /// Opens the cache in `dir`. A missing or unreadable file starts empty.
    pub fn open<P: AsRef<Path>>(dir: P) -> Self {
        let path = dir.as_ref().join(CACHE_FILE);
        let courses = match fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str::<Vec<CourseAttendance>>(&json)
                .map(|rows| rows.into_iter().map(|c| (c.cf_id, c)).collect())
                .unwrap_or_else(|err| {
                    warn!(path = %path.display(), %err, "ignoring corrupt attendance cache");
                    BTreeMap::new()
                }),
            Err(_) => BTreeMap::new(),
        };

        debug!(path = %path.display(), entries = courses.len(), "opened attendance cache");
        Self { path, courses }
    }

    pub fn get(&self, cf_id: u64) -> Option<&CourseAttendance> {
        self.courses.get(&cf_id)
    }

    pub fn courses(&self) -> impl Iterator<Item = &CourseAttendance> {
        self.courses.values()
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Inserts or overwrites the given courses and persists.
    pub fn store(&mut self, courses: &[CourseAttendance]) -> Result<()> {
        for course in courses {
            self.courses.insert(course.cf_id, course.clone());
        }
        self.persist()
    }

    /// Replaces the cached set with `courses` and persists.
    pub fn refresh(&mut self, courses: &[CourseAttendance]) -> Result<()> {
        self.courses.clear();
        self.store(courses)
    }

    fn persist(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| PortalError::Cache(format!("{}: {e}", dir.display())))?;
        }
        let rows: Vec<&CourseAttendance> = self.courses.values().collect();
        let json = serde_json::to_string_pretty(&rows).map_err(|e| PortalError::Cache(e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| PortalError::Cache(format!("{}: {e}", self.path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::attendance::{AttendanceSummary, CourseData};

    fn course(cf_id: u64, present: u32) -> CourseAttendance {
        CourseAttendance {
            id: Some(cf_id + 1000),
            cf_id,
            cdata: CourseData {
                course_code: format!("KCS{cf_id}"),
                course_name: "Course".to_string(),
            },
            faculty_name: Some("Dr. Rao".to_string()),
            attendance_summary: AttendanceSummary {
                present,
                absent: 40 - present,
                total: 40,
                percent: f64::from(present) * 2.5,
            },
        }
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("portal-cache-{name}-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_store_writes_through() {
        let dir = temp_dir("store");
        let mut cache = AttendanceCache::open(&dir);
        assert!(cache.is_empty());

        cache.store(&[course(1, 30), course(2, 20)]).unwrap();
        cache.store(&[course(1, 31)]).unwrap();

        let reopened = AttendanceCache::open(&dir);
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.get(1).map(|c| c.attendance_summary.present), Some(31));
        assert_eq!(reopened.get(2), Some(&course(2, 20)));
    }

    #[test]
    fn test_refresh_replaces_everything() {
        let dir = temp_dir("refresh");
        let mut cache = AttendanceCache::open(&dir);
        cache.store(&[course(1, 30), course(2, 20)]).unwrap();
        cache.refresh(&[course(3, 10)]).unwrap();

        let reopened = AttendanceCache::open(&dir);
        let ids: Vec<u64> = reopened.courses().map(|c| c.cf_id).collect();
        assert_eq!(ids, [3]);
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = temp_dir("corrupt");
        fs::write(dir.join(CACHE_FILE), "{not json").unwrap();
        assert!(AttendanceCache::open(&dir).is_empty());
    }
}
