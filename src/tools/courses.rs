//! Live course catalog lookups.

use crate::catalog::{CatalogUrls, CourseCode, Quarter, Term};
use crate::convert::MarkdownConverter;
use crate::error::Result;
use tracing::info;

/// Fetches catalog pages as markdown.
#[derive(Clone)]
pub struct CourseLookup {
    converter: MarkdownConverter,
    urls: CatalogUrls,
}

impl CourseLookup {
    pub fn new(converter: MarkdownConverter, urls: CatalogUrls) -> Self {
        Self { converter, urls }
    }

    pub fn urls(&self) -> &CatalogUrls {
        &self.urls
    }

    /// Course listing for a whole year, or one quarter of it.
    pub async fn list_courses(&self, term: &Term) -> Result<String> {
        let url = self.urls.list_courses(term);
        info!("Listing courses for {}", term);
        self.converter.convert(&url).await
    }

    /// Catalog page of one course section.
    pub async fn course_detail(&self, code: &CourseCode, year: u16, quarter: Quarter) -> Result<String> {
        let url = self.urls.course_detail(code, year, quarter);
        info!("Fetching course {} for {} {}", code, quarter, year);
        self.converter.convert(&url).await
    }
}
