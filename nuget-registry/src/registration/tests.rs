//! Tests for the registration resource

#[cfg(test)]
mod registration_tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use chrono::{TimeZone, Utc};
    use serde_json::Value;

    use crate::package::{DependencyGroup, Package, PackageDependency};
    use crate::package_service::{MemoryPackageService, PackageService};
    use crate::registration::*;
    use crate::test_utils::create_memory_test_state;
    use crate::{AppError, AppResult, PackageVersion, ServerLinks};

    /// Store wrapper that records how often it was queried.
    struct CountingService {
        inner: MemoryPackageService,
        calls: AtomicUsize,
    }

    impl CountingService {
        fn new(packages: Vec<Package>) -> Self {
            CountingService {
                inner: MemoryPackageService::with_packages(packages),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PackageService for CountingService {
        async fn find_all_versions(
            &self,
            id: &str,
            include_unlisted: bool,
            include_dependencies: bool,
        ) -> AppResult<Vec<Package>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner
                .find_all_versions(id, include_unlisted, include_dependencies)
                .await
        }
    }

    fn package(id: &str, version: &str, downloads: u64) -> Package {
        let mut package = Package::new(
            id,
            PackageVersion::parse(version).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        );
        package.downloads = downloads;
        package
    }

    fn unlisted(mut package: Package) -> Package {
        package.listed = false;
        package
    }

    fn links() -> ServerLinks {
        ServerLinks::new("http://localhost:5000", "api").unwrap()
    }

    #[tokio::test]
    async fn test_index_bounds_follow_version_precedence() {
        let service = CountingService::new(vec![
            package("Foo", "2.0.0-beta", 1),
            package("Foo", "1.0.0", 1),
            package("Foo", "1.5.0", 1),
        ]);

        let index = build_index(&service, &links(), "Foo").await.unwrap();

        assert_eq!(index.count, 3);
        assert_eq!(index.lower, "1.0.0");
        assert_eq!(index.upper, "2.0.0-beta");
        assert_eq!(index.items.len(), 1);

        let page = &index.items[0];
        assert_eq!(page.count, 3);
        assert_eq!(page.lower, index.lower);
        assert_eq!(page.upper, index.upper);
        let versions: Vec<_> = page
            .items
            .iter()
            .map(|leaf| leaf.catalog_entry.version.as_str())
            .collect();
        assert_eq!(versions, vec!["1.0.0", "1.5.0", "2.0.0-beta"]);
    }

    #[tokio::test]
    async fn test_index_sums_downloads() {
        let service = CountingService::new(vec![
            package("Foo", "1.0.0", 1000),
            package("Foo", "2.0.0", 2500),
        ]);

        let index = build_index(&service, &links(), "Foo").await.unwrap();
        assert_eq!(index.count, 2);
        assert_eq!(index.total_downloads, 3500);
        assert_eq!(
            index.index_uri,
            "http://localhost:5000/api/v3/registration/foo/index.json"
        );
        assert_eq!(
            index.items[0].page_uri,
            "http://localhost:5000/api/v3/registration/foo/index.json#page/1.0.0/2.0.0"
        );
    }

    #[tokio::test]
    async fn test_index_download_total_saturates() {
        let service = CountingService::new(vec![
            package("Foo", "1.0.0", u64::MAX),
            package("Foo", "2.0.0", 5),
        ]);

        let index = build_index(&service, &links(), "Foo").await.unwrap();
        assert_eq!(index.total_downloads, u64::MAX);
    }

    #[tokio::test]
    async fn test_index_single_version_bounds_match() {
        let service = CountingService::new(vec![package("Solo", "0.1.0", 0)]);

        let index = build_index(&service, &links(), "Solo").await.unwrap();
        assert_eq!(index.lower, "0.1.0");
        assert_eq!(index.upper, "0.1.0");
        assert_eq!(index.count, 1);
    }

    #[tokio::test]
    async fn test_index_of_unknown_package_is_not_found() {
        let service = CountingService::new(Vec::new());

        let result = build_index(&service, &links(), "Missing").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_index_skips_unlisted_versions() {
        let service = CountingService::new(vec![
            package("Foo", "1.0.0", 10),
            unlisted(package("Foo", "2.0.0", 99)),
        ]);

        let index = build_index(&service, &links(), "Foo").await.unwrap();
        assert_eq!(index.count, 1);
        assert_eq!(index.upper, "1.0.0");
        assert_eq!(index.total_downloads, 10);

        let only_unlisted = CountingService::new(vec![unlisted(package("Bar", "1.0.0", 0))]);
        let result = build_index(&only_unlisted, &links(), "Bar").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_index_catalog_entry_carries_metadata_and_dependencies() {
        let mut foo = package("Foo", "1.0.0", 0);
        foo.description = Some("Foo library".to_string());
        foo.authors = vec!["Ann".to_string(), "Bo".to_string()];
        foo.tags = vec!["json".to_string()];
        foo.dependency_groups = vec![DependencyGroup {
            target_framework: Some("net8.0".to_string()),
            dependencies: vec![PackageDependency {
                id: "Bar.Core".to_string(),
                range: "[2.0.0, )".to_string(),
            }],
        }];
        let service = CountingService::new(vec![foo]);

        let index = build_index(&service, &links(), "Foo").await.unwrap();
        let leaf = &index.items[0].items[0];
        let entry = &leaf.catalog_entry;

        assert_eq!(
            leaf.registration_uri,
            "http://localhost:5000/api/v3/registration/foo/1.0.0.json"
        );
        assert_eq!(leaf.package_content_uri, entry.package_content_uri);
        assert_eq!(
            entry.catalog_uri,
            format!("{PLACEHOLDER_CATALOG_BASE}Foo.1.0.0.json")
        );
        assert_eq!(entry.entry_type, CATALOG_ENTRY_TYPE);
        assert_eq!(entry.description, "Foo library");
        assert_eq!(entry.authors, "Ann, Bo");
        assert_eq!(entry.title, "");
        assert_eq!(entry.registration_uri, index.index_uri);

        let dependency = &entry.dependency_groups[0].dependencies[0];
        assert_eq!(dependency.id, "Bar.Core");
        assert_eq!(
            dependency.registration,
            "http://localhost:5000/api/v3/registration/bar.core/index.json"
        );
    }

    #[tokio::test]
    async fn test_leaf_links_back_to_index() {
        let service = CountingService::new(vec![package("Foo", "1.0.0", 42)]);
        let links = links();

        let index = build_index(&service, &links, "Foo").await.unwrap();
        let leaf = build_leaf(&service, &links, "Foo", "1.0.0").await.unwrap();

        assert_eq!(leaf.registration_index_uri, index.index_uri);
        assert_eq!(leaf.registration_uri, index.items[0].items[0].registration_uri);
        assert_eq!(leaf.downloads, 42);
        assert!(leaf.listed);
        assert_eq!(
            leaf.package_content_uri,
            "http://localhost:5000/api/v3/package/foo/1.0.0/foo.1.0.0.nupkg"
        );
    }

    #[tokio::test]
    async fn test_leaf_resolves_unlisted_version() {
        let service = CountingService::new(vec![unlisted(package("Foo", "2.0.0", 7))]);

        let leaf = build_leaf(&service, &links(), "foo", "2.0").await.unwrap();
        assert!(!leaf.listed);
        assert_eq!(leaf.downloads, 7);
        assert_eq!(
            leaf.registration_uri,
            "http://localhost:5000/api/v3/registration/foo/2.0.0.json"
        );
    }

    #[tokio::test]
    async fn test_leaf_rejects_bad_version_without_querying() {
        let service = CountingService::new(vec![package("Foo", "1.0.0", 0)]);

        let result = build_leaf(&service, &links(), "Foo", "not-a-version").await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
        assert_eq!(service.calls(), 0);
    }

    #[tokio::test]
    async fn test_leaf_missing_version_is_not_found() {
        let service = CountingService::new(vec![package("Foo", "1.0.0", 0)]);

        let result = build_leaf(&service, &links(), "Foo", "9.9.9").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(service.calls(), 1);
    }

    #[tokio::test]
    async fn test_http_index_and_leaf() {
        let state = create_memory_test_state(vec![
            package("Foo", "1.0.0", 1000),
            package("Foo", "1.1.0-RC1", 2500),
        ]);
        let server = TestServer::new(crate::build_router(state)).unwrap();

        let response = server
            .get("/api/v3/registration/Foo/index.json")
            .add_header("host", "feed.example")
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(
            body["@id"],
            "http://feed.example/api/v3/registration/foo/index.json"
        );
        assert_eq!(body["count"], 2);
        assert_eq!(body["totalDownloads"], 3500);
        assert_eq!(body["lower"], "1.0.0");
        assert_eq!(body["upper"], "1.1.0-RC1");
        let leaf = &body["items"][0]["items"][1];
        assert_eq!(leaf["catalogEntry"]["@type"], "PackageDetails");
        assert_eq!(
            leaf["packageContent"],
            "http://feed.example/api/v3/package/foo/1.1.0-rc1/foo.1.1.0-rc1.nupkg"
        );

        let response = server
            .get("/api/v3/registration/foo/1.1.0-rc1.json")
            .add_header("host", "feed.example")
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["listed"], true);
        assert_eq!(body["downloads"], 2500);
        assert_eq!(
            body["registration"],
            "http://feed.example/api/v3/registration/foo/index.json"
        );
        assert!(body["published"].as_str().unwrap().starts_with("2024-03-01T12:00:00"));
    }

    #[tokio::test]
    async fn test_http_error_statuses() {
        let state = create_memory_test_state(vec![package("Foo", "1.0.0", 0)]);
        let server = TestServer::new(crate::build_router(state)).unwrap();

        let response = server.get("/api/v3/registration/foo/not-a-version.json").await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["code"], "validation_error");

        server
            .get("/api/v3/registration/foo/9.9.9.json")
            .await
            .assert_status_not_found();
        server
            .get("/api/v3/registration/foo/1.0.0")
            .await
            .assert_status_not_found();
        server
            .get("/api/v3/registration/missing/index.json")
            .await
            .assert_status_not_found();
        server
            .get("/api/v3/registration/foo..bar/index.json")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
