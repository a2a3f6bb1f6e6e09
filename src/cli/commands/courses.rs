//! Course catalog commands.

use super::check_ready;
use crate::catalog::{CatalogUrls, CourseCode, Quarter, Term};
use crate::cli::preflight::Operation;
use crate::cli::Output;
use crate::config::Settings;
use crate::convert::{HttpFetcher, MarkdownConverter};
use crate::tools::CourseLookup;
use anyhow::Result;
use std::sync::Arc;

fn course_lookup(settings: &Settings) -> Result<CourseLookup> {
    let converter = MarkdownConverter::with_options(Arc::new(HttpFetcher::new(&settings.fetch)?), settings.convert);
    Ok(CourseLookup::new(converter, CatalogUrls::from_settings(&settings.catalog)))
}

/// List the courses of a year or one quarter.
pub async fn run_courses(quarter: Option<Quarter>, year: Option<i64>, settings: Settings) -> Result<()> {
    check_ready(Operation::Browse, &settings)?;

    let term = Term::new(year.unwrap_or(settings.catalog.default_year as i64), quarter)?;
    let lookup = course_lookup(&settings)?;

    let spinner = Output::spinner(&format!("Fetching {}", lookup.urls().list_courses(&term)));
    let result = lookup.list_courses(&term).await;
    spinner.finish_and_clear();

    println!("{}", result?);
    Ok(())
}

/// Show one course section's catalog page.
pub async fn run_course(code: &str, quarter: Option<Quarter>, year: Option<i64>, settings: Settings) -> Result<()> {
    check_ready(Operation::Browse, &settings)?;

    let code = CourseCode::parse(code)?;
    let quarter = quarter.unwrap_or(Quarter::Spring);
    let term = Term::new(year.unwrap_or(settings.catalog.default_year as i64), Some(quarter))?;
    let lookup = course_lookup(&settings)?;

    let spinner = Output::spinner(&format!("Fetching {}", code));
    let result = lookup.course_detail(&code, term.year(), quarter).await;
    spinner.finish_and_clear();

    println!("{}", result?);
    Ok(())
}
