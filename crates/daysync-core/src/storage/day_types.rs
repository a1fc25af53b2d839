//! Loading day templates and the calendar-assignment list from the data folder.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use tracing::debug;

use super::read_json;
use crate::config::{ANALYTICS_CONFIG_MARKER, CALENDAR_FILE};
use crate::error::{CoreError, Result};
use crate::schedule::{CalendarEntry, DayType};

/// Whether a file in the data folder holds a day template.
pub fn is_day_type_file(file_name: &str) -> bool {
    file_name.ends_with(".json")
        && !file_name.contains(ANALYTICS_CONFIG_MARKER)
        && file_name != CALENDAR_FILE
}

/// Day-type name for a file: the text before the first `.`.
pub fn day_type_name(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or(file_name)
}

/// Load every day template in `folder`, keyed by name, in file name order.
///
/// Two files with the same stem (`a.json`, `a.v2.json`) collide; the later
/// one in file name order wins.
pub fn load_day_types(folder: &Path) -> Result<IndexMap<String, DayType>> {
    let read_dir = fs::read_dir(folder).map_err(|source| CoreError::Read {
        path: folder.to_path_buf(),
        source,
    })?;

    let mut file_names = Vec::new();
    for entry in read_dir {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if is_day_type_file(name) {
                file_names.push(name.to_string());
            }
        }
    }
    file_names.sort();

    let mut day_types = IndexMap::new();
    for file_name in &file_names {
        let mut day_type: DayType = read_json(&folder.join(file_name))?;
        day_type.name = day_type_name(file_name).to_string();
        debug!(
            "Loaded day type '{}' with {} activities",
            day_type.name,
            day_type.activities.len()
        );
        day_types.insert(day_type.name.clone(), day_type);
    }
    Ok(day_types)
}

/// Load the ordered calendar-assignment list from `folder/calendar.json`.
pub fn load_calendar(folder: &Path) -> Result<Vec<CalendarEntry>> {
    read_json(&folder.join(CALENDAR_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const WORKDAY: &str = r#"{"activities": [
        {"name": "gym", "start_time": "07:00", "end_time": "08:00"},
        {"name": "work", "start_time": "09:00", "end_time": "17:30"}
    ]}"#;

    fn folder_with(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (name, content) in files {
            fs::write(dir.path().join(name), content).unwrap();
        }
        dir
    }

    #[test]
    fn file_filter_excludes_reserved_names() {
        assert!(is_day_type_file("workday.json"));
        assert!(!is_day_type_file("calendar.json"));
        assert!(!is_day_type_file("analytics_config.json"));
        assert!(!is_day_type_file("my_analytics_config_v2.json"));
        assert!(!is_day_type_file("notes.txt"));
    }

    #[test]
    fn name_is_text_before_first_dot() {
        assert_eq!(day_type_name("workday.json"), "workday");
        assert_eq!(day_type_name("weekend.v2.json"), "weekend");
    }

    #[test]
    fn loads_only_day_type_files_in_name_order() {
        let dir = folder_with(&[
            ("workday.json", WORKDAY),
            ("rest.json", r#"{"activities": []}"#),
            ("calendar.json", "[]"),
            ("analytics_config.json", "{}"),
            ("readme.md", "ignored"),
        ]);

        let day_types = load_day_types(dir.path()).unwrap();
        let names: Vec<&str> = day_types.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["rest", "workday"]);

        let workday = &day_types["workday"];
        assert_eq!(workday.name, "workday");
        assert_eq!(workday.activities.len(), 2);
        assert_eq!(workday.activities[1].duration_hours(), 8.5);
    }

    #[test]
    fn subdirectories_are_ignored() {
        let dir = folder_with(&[("workday.json", WORKDAY)]);
        fs::create_dir(dir.path().join("archive.json")).unwrap();

        let day_types = load_day_types(dir.path()).unwrap();
        assert_eq!(day_types.len(), 1);
    }

    #[test]
    fn malformed_day_type_is_fatal() {
        let dir = folder_with(&[("workday.json", r#"{"activities": 3}"#)]);
        let err = load_day_types(dir.path()).unwrap_err();
        assert!(matches!(err, CoreError::Parse { .. }));
    }

    #[test]
    fn calendar_keeps_file_order() {
        let dir = folder_with(&[(
            "calendar.json",
            r#"[
                {"date": "2024-06-03", "type": "workday"},
                {"date": "2024-06-01", "type": "rest"}
            ]"#,
        )]);

        let entries = load_calendar(dir.path()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].day_type, "workday");
        assert_eq!(entries[1].date, "2024-06-01");
    }

    #[test]
    fn missing_calendar_is_fatal() {
        let dir = folder_with(&[("workday.json", WORKDAY)]);
        assert!(matches!(
            load_calendar(dir.path()).unwrap_err(),
            CoreError::Read { .. }
        ));
    }
}
