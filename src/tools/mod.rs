//! Tools the agent can call.
//!
//! Two live catalog lookups and two similarity searches, one per collection.
//! Arguments arrive as model-written JSON and are validated here before any
//! request is made.

mod courses;
mod search;

pub use courses::CourseLookup;
pub use search::{format_results, search_index, KnowledgeSearch};

use crate::agent::ToolSpec;
use crate::catalog::{CourseCode, Quarter, Term};
use crate::error::{AssistantError, Result};
use crate::orchestrator::Collection;
use serde_json::Value;
use tracing::debug;

/// A validated tool call.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    /// List the courses of a year, or of one quarter.
    ListCourses { term: Term },

    /// Fetch one course section's catalog page.
    CourseDetail {
        code: CourseCode,
        year: u16,
        quarter: Quarter,
    },

    /// Search pages for enrolled students.
    SearchInternalInfo { query: String },

    /// Search public program pages.
    SearchExternalInfo { query: String },
}

impl ToolCall {
    pub fn name(&self) -> &'static str {
        match self {
            ToolCall::ListCourses { .. } => "list_courses",
            ToolCall::CourseDetail { .. } => "course_detail",
            ToolCall::SearchInternalInfo { .. } => "search_internal_info",
            ToolCall::SearchExternalInfo { .. } => "search_external_info",
        }
    }
}

/// Tool execution context.
#[derive(Clone)]
pub struct ToolContext {
    pub courses: CourseLookup,
    pub search: KnowledgeSearch,
    pub default_year: u16,
}

impl ToolContext {
    pub fn new(courses: CourseLookup, search: KnowledgeSearch, default_year: u16) -> Self {
        Self {
            courses,
            search,
            default_year,
        }
    }

    /// Parse a model-issued call with this context's default year.
    pub fn parse(&self, name: &str, arguments: &str) -> Result<ToolCall> {
        parse_tool_call(name, arguments, self.default_year)
    }

    /// Execute a tool call and return the result as a string.
    pub async fn execute(&self, tool: &ToolCall) -> Result<String> {
        match tool {
            ToolCall::ListCourses { term } => self.courses.list_courses(term).await,
            ToolCall::CourseDetail {
                code,
                year,
                quarter,
            } => self.courses.course_detail(code, *year, *quarter).await,
            ToolCall::SearchInternalInfo { query } => {
                self.search.search_formatted(Collection::Internal, query).await
            }
            ToolCall::SearchExternalInfo { query } => {
                self.search.search_formatted(Collection::External, query).await
            }
        }
    }
}

/// Get the tool definitions offered to the model.
pub fn tool_definitions() -> Vec<ToolSpec> {
    let quarter_schema = serde_json::json!({
        "type": "string",
        "enum": ["summer", "autumn", "winter", "spring"]
    });

    vec![
        ToolSpec {
            name: "list_courses".to_string(),
            description: "List MPCS courses for a year and optional quarter \
                (summer, autumn, winter, spring). Leave the quarter out to list the whole year. \
                Each course has its code, name, link, instructor, location and meeting times. \
                The source link URL is on the last line of the output."
                .to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "quarter": quarter_schema.clone(),
                    "year": {
                        "type": "integer",
                        "description": "Calendar year of the quarter; defaults to the current catalog year"
                    }
                }
            }),
        },
        ToolSpec {
            name: "course_detail".to_string(),
            description: "Get the catalog page of one MPCS course section. The code has the form \
                mpcs-<5 digit number>-<1 digit section number>; the quarter defaults to spring. \
                The page has the name, section, instructor, location, meeting times, \
                description, coursework, textbook, prerequisites and eligible programs. \
                The source link URL is on the last line of the output."
                .to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "code": {
                        "type": "string",
                        "description": "Course code including the section number, e.g. mpcs-51030-1"
                    },
                    "quarter": quarter_schema,
                    "year": {
                        "type": "integer",
                        "description": "Calendar year of the quarter; defaults to the current catalog year"
                    }
                },
                "required": ["code"]
            }),
        },
        ToolSpec {
            name: "search_internal_info".to_string(),
            description: "Return the best matching passages from the MPCS website for \
                current students: registration procedures, course requests, degree requirements, \
                practicum, graduation application, program policies, placement exams, \
                computing environment and contacts. Each passage names its source URL."
                .to_string(),
            parameters: query_schema(),
        },
        ToolSpec {
            name: "search_external_info".to_string(),
            description: "Return the best matching passages from the public MPCS website: \
                about the program, the 9 course, 12 course, joint and predoctoral programs, \
                admission, faculty, career outcomes, alumni, contact and FAQs. \
                Each passage names its source URL."
                .to_string(),
            parameters: query_schema(),
        },
    ]
}

fn query_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "query": {
                "type": "string",
                "description": "The search query"
            }
        },
        "required": ["query"]
    })
}

/// Parse a tool call from the model's name and JSON arguments.
///
/// `list_courses` treats an unrecognised quarter as "whole year";
/// `course_detail` rejects it.
pub fn parse_tool_call(name: &str, arguments: &str, default_year: u16) -> Result<ToolCall> {
    let args: Value = if arguments.trim().is_empty() {
        Value::Object(Default::default())
    } else {
        serde_json::from_str(arguments)
            .map_err(|e| AssistantError::InvalidInput(format!("Invalid tool arguments: {}", e)))?
    };

    match name {
        "list_courses" => {
            let year = year_arg(&args, default_year)?;
            let quarter = match quarter_arg(&args) {
                Some(raw) => match raw.parse::<Quarter>() {
                    Ok(q) => Some(q),
                    Err(_) => {
                        debug!("Unknown quarter '{}', listing the whole year", raw);
                        None
                    }
                },
                None => None,
            };
            Ok(ToolCall::ListCourses {
                term: Term::new(year, quarter)?,
            })
        }
        "course_detail" => {
            let raw_code = args["code"]
                .as_str()
                .ok_or_else(|| AssistantError::InvalidInput("Missing 'code' argument".to_string()))?;
            let code = CourseCode::parse(raw_code)?;
            let quarter = match quarter_arg(&args) {
                Some(raw) => raw.parse::<Quarter>()?,
                None => Quarter::Spring,
            };
            let term = Term::new(year_arg(&args, default_year)?, Some(quarter))?;
            Ok(ToolCall::CourseDetail {
                code,
                year: term.year(),
                quarter,
            })
        }
        "search_internal_info" => Ok(ToolCall::SearchInternalInfo {
            query: query_arg(&args)?,
        }),
        "search_external_info" => Ok(ToolCall::SearchExternalInfo {
            query: query_arg(&args)?,
        }),
        _ => Err(AssistantError::InvalidInput(format!("Unknown tool: {}", name))),
    }
}

fn quarter_arg(args: &Value) -> Option<&str> {
    args["quarter"].as_str().map(str::trim).filter(|q| !q.is_empty())
}

/// Year as a JSON number or numeric string; absent or null means the default.
fn year_arg(args: &Value, default_year: u16) -> Result<i64> {
    match &args["year"] {
        Value::Null => Ok(default_year as i64),
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| AssistantError::InvalidInput(format!("Invalid year: {}", n))),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| AssistantError::InvalidInput(format!("Invalid year: '{}'", s))),
        other => Err(AssistantError::InvalidInput(format!("Invalid year: {}", other))),
    }
}

fn query_arg(args: &Value) -> Result<String> {
    let query = args["query"]
        .as_str()
        .map(str::trim)
        .ok_or_else(|| AssistantError::InvalidInput("Missing 'query' argument".to_string()))?;
    if query.is_empty() {
        return Err(AssistantError::InvalidInput("Query must not be empty".to_string()));
    }
    Ok(query.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_courses_defaults_year() {
        let tool = parse_tool_call("list_courses", "{}", 2024).unwrap();
        assert_eq!(
            tool,
            ToolCall::ListCourses {
                term: Term::new(2024, None).unwrap()
            }
        );
    }

    #[test]
    fn test_parse_list_courses_unknown_quarter_is_whole_year() {
        let tool = parse_tool_call("list_courses", r#"{"quarter": "midsummer", "year": 2023}"#, 2024).unwrap();
        match tool {
            ToolCall::ListCourses { term } => {
                assert_eq!(term.year(), 2023);
                assert_eq!(term.quarter(), None);
            }
            _ => panic!("Expected ListCourses tool"),
        }
    }

    #[test]
    fn test_parse_list_courses_string_year() {
        let tool = parse_tool_call("list_courses", r#"{"quarter": "Winter", "year": "2024"}"#, 2024).unwrap();
        assert_eq!(
            tool,
            ToolCall::ListCourses {
                term: Term::new(2024, Some(Quarter::Winter)).unwrap()
            }
        );
    }

    #[test]
    fn test_parse_course_detail() {
        let tool = parse_tool_call(
            "course_detail",
            r#"{"code": "MPCS 51030 1", "quarter": "autumn", "year": 2024}"#,
            2024,
        )
        .unwrap();
        match tool {
            ToolCall::CourseDetail { code, year, quarter } => {
                assert_eq!(code.as_str(), "mpcs-51030-1");
                assert_eq!(year, 2024);
                assert_eq!(quarter, Quarter::Autumn);
            }
            _ => panic!("Expected CourseDetail tool"),
        }
    }

    #[test]
    fn test_parse_course_detail_defaults_to_spring() {
        let tool = parse_tool_call("course_detail", r#"{"code": "mpcs-52060-1"}"#, 2024).unwrap();
        assert!(matches!(
            tool,
            ToolCall::CourseDetail {
                quarter: Quarter::Spring,
                year: 2024,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_course_detail_rejects_unknown_quarter() {
        let err = parse_tool_call(
            "course_detail",
            r#"{"code": "mpcs-52060-1", "quarter": "midsummer"}"#,
            2024,
        )
        .unwrap_err();
        assert!(matches!(err, AssistantError::InvalidInput(_)));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(parse_tool_call("search_internal_info", r#"{"query": "  "}"#, 2024).is_err());
        assert!(parse_tool_call("search_external_info", "{}", 2024).is_err());
        assert!(parse_tool_call("list_courses", r#"{"year": 1990}"#, 2024).is_err());
        assert!(parse_tool_call("list_courses", r#"{"year": 2150}"#, 2024).is_err());
        assert!(parse_tool_call("list_courses", "not json", 2024).is_err());
        assert!(parse_tool_call("enroll_student", "{}", 2024).is_err());
    }

    #[test]
    fn test_tool_definitions_cover_all_tools() {
        let names: Vec<_> = tool_definitions().into_iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec![
                "list_courses",
                "course_detail",
                "search_internal_info",
                "search_external_info"
            ]
        );
    }
}
