use intel_core::{CoreError, CourseSeed};
use scrape_pipeline::catalog::parse_page;
use scrape_pipeline::{collect_active_courses, CatalogItem, CoursePage, CoursePageSource};
use serde_json::json;
use std::sync::Mutex;
use tokio_test::{assert_err, assert_ok};

fn item(code: &str, subject: &str, status: &str) -> CatalogItem {
    CatalogItem {
        code: Some(code.to_string()),
        description: Some(format!("  {} description. ", code)),
        subject_code: Some(subject.to_string()),
        status: Some(status.to_string()),
    }
}

/// Serves a fixed catalog in pages and records every request.
struct FakeCatalog {
    items: Vec<CatalogItem>,
    list_length: u32,
    requests: Mutex<Vec<(String, u32, u32)>>,
}

impl FakeCatalog {
    fn new(items: Vec<CatalogItem>) -> Self {
        let list_length = items.len() as u32;
        Self {
            items,
            list_length,
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl CoursePageSource for FakeCatalog {
    async fn fetch_page(
        &self,
        query: &str,
        skip: u32,
        limit: u32,
    ) -> Result<Option<CoursePage>, CoreError> {
        self.requests
            .lock()
            .unwrap()
            .push((query.to_string(), skip, limit));
        let items = self
            .items
            .iter()
            .skip(skip as usize)
            .take(limit as usize)
            .cloned()
            .collect();
        Ok(Some(CoursePage {
            list_length: self.list_length,
            items,
        }))
    }
}

struct BrokenCatalog;

impl CoursePageSource for BrokenCatalog {
    async fn fetch_page(
        &self,
        _query: &str,
        _skip: u32,
        _limit: u32,
    ) -> Result<Option<CoursePage>, CoreError> {
        Err(CoreError::RequestFailed {
            message: "calendar unavailable".to_string(),
            status_code: Some(502),
        })
    }
}

#[tokio::test]
async fn test_pages_until_list_length() {
    let catalog = FakeCatalog::new(vec![
        item("CPSC217", "CPSC", "Active"),
        item("MATH211", "MATH", "Active"),
        item("CPSC219", "CPSC", "Inactive"),
        item("CPSC231", "CPSC", "Active"),
        item("CPSC233", "CPSC", "Active"),
    ]);

    let courses = assert_ok!(collect_active_courses(&catalog, "CPSC", 2).await);
    assert_eq!(
        courses,
        vec![
            CourseSeed {
                code: "CPSC217".to_string(),
                description: "CPSC217 description.".to_string(),
            },
            CourseSeed {
                code: "CPSC231".to_string(),
                description: "CPSC231 description.".to_string(),
            },
            CourseSeed {
                code: "CPSC233".to_string(),
                description: "CPSC233 description.".to_string(),
            },
        ]
    );

    let requests = catalog.requests.lock().unwrap().clone();
    let skips: Vec<_> = requests.iter().map(|(_, skip, _)| *skip).collect();
    assert_eq!(skips, vec![0, 2, 4]);
    assert!(requests.iter().all(|(query, _, limit)| query == "CPSC" && *limit == 2));
}

#[tokio::test]
async fn test_missing_data_stops_paging() {
    assert!(assert_ok!(parse_page(json!({ "errors": [{ "message": "bad query" }] }))).is_none());
    assert!(assert_ok!(parse_page(json!({ "data": null }))).is_none());

    let page = assert_ok!(parse_page(json!({
        "data": { "searchCourses": {
            "listLength": 1,
            "data": [{ "code": "CPSC355", "description": "Computing Machinery I",
                       "subjectCode": "CPSC", "status": "Active" }]
        }}
    })))
    .unwrap();
    assert_eq!(page.list_length, 1);
    assert_eq!(page.items[0].subject_code.as_deref(), Some("CPSC"));
}

#[tokio::test]
async fn test_errors_propagate() {
    assert_err!(collect_active_courses(&BrokenCatalog, "CPSC", 100).await);
    assert_err!(collect_active_courses(&FakeCatalog::new(Vec::new()), "CPSC", 0).await);
}

#[tokio::test]
async fn test_empty_catalog() {
    let catalog = FakeCatalog::new(Vec::new());
    let courses = assert_ok!(collect_active_courses(&catalog, "CPSC", 100).await);
    assert!(courses.is_empty());
    assert_eq!(catalog.requests.lock().unwrap().len(), 1);
}
