use std::{collections::BTreeMap, sync::Arc};

use crate::storage::entities::{ActivityRecord, Category};

#[derive(Debug, PartialEq)]
pub struct SiteUsage {
    pub domain: Arc<str>,
    pub seconds: f64,
}

#[derive(Debug, PartialEq)]
pub struct CategoryUsage {
    pub category: Category,
    pub seconds: f64,
}

/// Total browser time per detail (domain), ordered by domain.
pub fn time_per_site(records: &[ActivityRecord]) -> Vec<SiteUsage> {
    let mut map = BTreeMap::<Arc<str>, f64>::new();
    for v in records.iter().filter(|v| v.category == Category::Browser) {
        *map.entry(v.detail.clone()).or_default() += v.duration_seconds;
    }
    map.into_iter()
        .map(|(domain, seconds)| SiteUsage { domain, seconds })
        .collect()
}

/// Total time per category, ordered by category name.
pub fn time_per_category(records: &[ActivityRecord]) -> Vec<CategoryUsage> {
    let mut map = BTreeMap::<String, CategoryUsage>::new();
    for v in records {
        map.entry(v.category.to_string())
            .or_insert_with(|| CategoryUsage {
                category: v.category,
                seconds: 0.,
            })
            .seconds += v.duration_seconds;
    }
    map.into_values().collect()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

    use super::{time_per_category, time_per_site, CategoryUsage, SiteUsage};
    use crate::storage::entities::{ActivityRecord, Category};

    const TEST_START_DATE: NaiveDateTime =
        NaiveDateTime::new(NaiveDate::from_ymd_opt(2018, 7, 4).unwrap(), NaiveTime::MIN);

    fn record(category: Category, detail: &str, seconds: i64) -> ActivityRecord {
        ActivityRecord::new(
            "window".into(),
            category,
            detail.into(),
            TEST_START_DATE,
            TEST_START_DATE + Duration::seconds(seconds),
        )
    }

    fn test_records() -> Vec<ActivityRecord> {
        vec![
            record(Category::Browser, "github.com", 30),
            record(Category::Application, "N/A", 100),
            record(Category::Browser, "docs.rs", 15),
            record(Category::Browser, "github.com", 5),
        ]
    }

    #[test]
    fn test_time_per_site() {
        assert_eq!(
            time_per_site(&test_records()),
            vec![
                SiteUsage {
                    domain: "docs.rs".into(),
                    seconds: 15.
                },
                SiteUsage {
                    domain: "github.com".into(),
                    seconds: 35.
                },
            ]
        );
    }

    #[test]
    fn test_time_per_category() {
        assert_eq!(
            time_per_category(&test_records()),
            vec![
                CategoryUsage {
                    category: Category::Application,
                    seconds: 100.
                },
                CategoryUsage {
                    category: Category::Browser,
                    seconds: 50.
                },
            ]
        );
    }

    #[test]
    fn test_no_browser_rows() {
        let records = vec![record(Category::Application, "N/A", 10)];
        assert!(time_per_site(&records).is_empty());
    }
}
