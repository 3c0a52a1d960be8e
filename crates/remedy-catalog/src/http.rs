//! HTTP implementation of [`PatchSource`] against the vulnerability database.

use async_trait::async_trait;
use futures::future;
use serde::Deserialize;
use tracing::debug;

use remedy_core::{PackageAndVersion, PatchDescriptor};

use crate::error::{CatalogError, Result};
use crate::PatchSource;

/// Patch source backed by the hosted vulnerability database.
///
/// One `GET {base}/test/npm/{name}/{version}` per release, then one GET per
/// patch URL to download the raw diff texts. Diff downloads for a single
/// patch run concurrently; releases are tested one at a time.
pub struct HttpPatchSource {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

/// Response shape of the `test/npm` endpoint. Fields we do not use
/// (severity, descriptions, upgrade paths) are simply not declared.
#[derive(Debug, Deserialize)]
struct TestResponse {
    #[serde(default)]
    issues: Issues,
}

#[derive(Debug, Default, Deserialize)]
struct Issues {
    #[serde(default)]
    vulnerabilities: Vec<VulnerabilityIssue>,
}

#[derive(Debug, Deserialize)]
struct VulnerabilityIssue {
    id: String,
    #[serde(default)]
    patches: Vec<PatchMeta>,
}

#[derive(Debug, Deserialize)]
struct PatchMeta {
    id: String,
    #[serde(default)]
    urls: Vec<String>,
}

impl HttpPatchSource {
    /// Create a source against `base_url`, optionally authenticated.
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            token,
        }
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.header("Authorization", format!("token {token}")),
            None => request,
        }
    }

    async fn test_release(&self, package: &PackageAndVersion) -> Result<TestResponse> {
        let url = format!(
            "{}/test/npm/{}/{}",
            self.base_url.trim_end_matches('/'),
            package.name,
            package.version
        );
        debug!(url = %url, "testing release against vulnerability database");

        let response = self
            .authorized(self.client.get(&url))
            .header("Content-Type", "application/json")
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(CatalogError::Status {
                status: response.status().as_u16(),
                url,
            });
        }
        response
            .json()
            .await
            .map_err(|e| CatalogError::MalformedResponse(e.to_string()))
    }

    async fn fetch_diff(&self, url: &str) -> Result<String> {
        let response = self.authorized(self.client.get(url)).send().await?;
        if !response.status().is_success() {
            return Err(CatalogError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl PatchSource for HttpPatchSource {
    async fn patches_for(
        &self,
        package: &PackageAndVersion,
        vulnerability_ids: &[String],
    ) -> Result<Vec<PatchDescriptor>> {
        let report = self.test_release(package).await?;

        let mut descriptors = Vec::new();
        for vulnerability in report.issues.vulnerabilities {
            if !vulnerability_ids.contains(&vulnerability.id) {
                continue;
            }
            for patch in vulnerability.patches {
                let diffs =
                    future::try_join_all(patch.urls.iter().map(|url| self.fetch_diff(url)))
                        .await?;
                descriptors.push(PatchDescriptor { id: patch.id, diffs });
            }
        }
        Ok(descriptors)
    }
}
