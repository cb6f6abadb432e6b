//! Deterministic rule-based generation service.
//!
//! Stands in for an external language model: a few text patterns over the
//! request decide whether a folder has to be resolved first, and the query
//! for each step is assembled from recognized document types and years. The
//! engine only sees the `GenerationService` trait, so swapping in a real
//! model is a drop-in change.

use seeker_core::services::{GeneratedQuery, GenerationService, QueryContext, RefusalKind};
use seeker_core::{AgentError, Result};
use serde_json::{json, Value};

const FIND_FOLDER_PREFIX: &str = "find the folder named ";
const LIST_IN_FOLDER: &str = "list documents in the resolved folder";

/// Document types the rules recognize in request text.
const DOCUMENT_TYPES: &[(&str, &str)] = &[
    ("w2", "W2"),
    ("w-2", "W2"),
    ("1099", "1099"),
    ("receipt", "RECEIPT"),
    ("invoice", "INVOICE"),
    ("k1", "K1"),
    ("k-1", "K1"),
];

/// Pattern-rule generation over the request text.
pub struct RuleBasedGeneration;

impl GenerationService for RuleBasedGeneration {
    fn generate_plan(&self, request: &str, _feedback: &[String]) -> Result<Value> {
        if let Some(folder) = folder_reference(request) {
            return Ok(json!({
                "kind": "multi",
                "rationale": "The request names a folder that must be resolved first",
                "step_count": 2,
                "steps": [
                    {"index": 1, "description": format!("{FIND_FOLDER_PREFIX}{folder}")},
                    {"index": 2, "description": LIST_IN_FOLDER, "depends_on": 1}
                ]
            }));
        }

        Ok(json!({
            "kind": "single",
            "rationale": "The request maps to one direct document filter",
            "step_count": 1,
            "steps": [
                {"index": 1, "description": format!("find documents matching: {request}")}
            ]
        }))
    }

    fn generate_query(&self, ctx: &QueryContext<'_>) -> Result<GeneratedQuery> {
        if let Some(name) = ctx.step_description.strip_prefix(FIND_FOLDER_PREFIX) {
            return Ok(GeneratedQuery::Query(json!({
                "bool": {
                    "must": [
                        {"term": {"entityType": "FOLDER"}},
                        {"term": {"commonAttributes.name.keyword": name}}
                    ]
                }
            })));
        }

        if ctx.step_description == LIST_IN_FOLDER {
            return self.folder_contents_query(ctx);
        }

        self.direct_document_query(ctx)
    }
}

impl RuleBasedGeneration {
    /// Query for the contents of the folder resolved by the prior step.
    fn folder_contents_query(&self, ctx: &QueryContext<'_>) -> Result<GeneratedQuery> {
        let folder = ctx
            .prior_result
            .and_then(|result| result.documents.as_one())
            .ok_or_else(|| {
                AgentError::generation("folder listing step has no resolved folder to work from")
            })?;
        let path = folder
            .get("organizationAttributes")
            .and_then(|o| o.get("folderPath"))
            .and_then(Value::as_str)
            .ok_or_else(|| AgentError::generation("resolved folder carries no folderPath"))?;

        Ok(GeneratedQuery::Query(json!({
            "bool": {
                "must": [
                    {"term": {"entityType": "DOCUMENT"}},
                    {"term": {"organizationAttributes.folderPath": path}}
                ]
            }
        })))
    }

    /// Single-step query assembled from recognized tokens in the request.
    fn direct_document_query(&self, ctx: &QueryContext<'_>) -> Result<GeneratedQuery> {
        let request = ctx.original_request.to_lowercase();
        let mut must = vec![json!({"term": {"entityType": "DOCUMENT"}})];

        if let Some(doc_type) = DOCUMENT_TYPES
            .iter()
            .find(|(token, _)| contains_token(&request, token))
            .map(|(_, doc_type)| *doc_type)
        {
            must.push(json!({"term": {"commonAttributes.documentType": doc_type}}));
        }
        if let Some(year) = year_token(&request) {
            must.push(json!({"term": {"commonAttributes.taxYear": year}}));
        }

        // Only the entity filter means nothing in the request was understood.
        if must.len() == 1 {
            return Ok(GeneratedQuery::Refused {
                kind: RefusalKind::AmbiguousRequest,
                message: format!(
                    "the request '{}' names no recognizable document type, year, or folder",
                    ctx.original_request
                ),
            });
        }

        Ok(GeneratedQuery::Query(json!({"bool": {"must": must}})))
    }
}

/// Extracts the folder name from "... in the <name> folder ..." phrasing.
fn folder_reference(request: &str) -> Option<String> {
    let lower = request.to_lowercase();
    let start = lower.find("in the ")? + "in the ".len();
    let end = lower[start..].find(" folder")? + start;
    let name = request[start..end].trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// First standalone 19xx/20xx token in the request.
fn year_token(request: &str) -> Option<String> {
    request
        .split(|c: char| !c.is_ascii_digit())
        .find(|token| {
            token.len() == 4 && (token.starts_with("19") || token.starts_with("20"))
        })
        .map(str::to_string)
}

/// Whole-word containment so "w2" does not match inside "w20".
fn contains_token(text: &str, token: &str) -> bool {
    text.split(|c: char| c.is_whitespace() || c == ',' || c == '.')
        .any(|word| word == token)
}

/// Built-in demo corpus mirroring the backend's document shape.
pub fn sample_corpus() -> Vec<Value> {
    vec![
        json!({
            "entityType": "FOLDER",
            "systemAttributes": {"id": "folder-1", "createDate": 1700000000000u64, "size": 0},
            "commonAttributes": {"name": "Tax Documents", "description": "Tax-related documents"},
            "organizationAttributes": {"folderPath": "root/Tax Documents"}
        }),
        json!({
            "entityType": "FOLDER",
            "systemAttributes": {"id": "folder-2", "createDate": 1700000000000u64, "size": 0},
            "commonAttributes": {"name": "Taxes", "description": "Personal tax papers"},
            "organizationAttributes": {"folderPath": "root/Personal/Taxes"}
        }),
        json!({
            "entityType": "FOLDER",
            "systemAttributes": {"id": "folder-3", "createDate": 1700000000000u64, "size": 0},
            "commonAttributes": {"name": "Taxes", "description": "Business tax papers"},
            "organizationAttributes": {"folderPath": "root/Business/Taxes"}
        }),
        json!({
            "entityType": "DOCUMENT",
            "systemAttributes": {"id": "doc-1", "createDate": 1710000000000u64, "size": 326603},
            "commonAttributes": {"name": "W2_2024.pdf", "documentType": "W2", "taxYear": "2024"},
            "organizationAttributes": {"folderPath": "root/Tax Documents", "parentFolderId": "folder-1"}
        }),
        json!({
            "entityType": "DOCUMENT",
            "systemAttributes": {"id": "doc-2", "createDate": 1680000000000u64, "size": 210500},
            "commonAttributes": {"name": "W2_2023.pdf", "documentType": "W2", "taxYear": "2023"},
            "organizationAttributes": {"folderPath": "root/Tax Documents", "parentFolderId": "folder-1"}
        }),
        json!({
            "entityType": "DOCUMENT",
            "systemAttributes": {"id": "doc-3", "createDate": 1712000000000u64, "size": 98234},
            "commonAttributes": {"name": "1099_2024.pdf", "documentType": "1099", "taxYear": "2024"},
            "organizationAttributes": {"folderPath": "root/Tax Documents", "parentFolderId": "folder-1"}
        }),
        json!({
            "entityType": "DOCUMENT",
            "systemAttributes": {"id": "doc-4", "createDate": 1715000000000u64, "size": 15400},
            "commonAttributes": {"name": "receipt_q1.pdf", "documentType": "RECEIPT", "taxYear": "2024"},
            "organizationAttributes": {"folderPath": "root/Personal/Taxes", "parentFolderId": "folder-2"}
        }),
        json!({
            "entityType": "DOCUMENT",
            "systemAttributes": {"id": "doc-5", "createDate": 1716000000000u64, "size": 44800},
            "commonAttributes": {"name": "invoice_042.pdf", "documentType": "INVOICE", "taxYear": "2024"},
            "organizationAttributes": {"folderPath": "root/Business/Taxes", "parentFolderId": "folder-3"}
        }),
    ]
}
