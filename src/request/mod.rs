pub mod builder;
pub mod reply;

pub use builder::build;
pub use reply::Reply;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ClipwiseError, Result};

/// Parameter name that always carries the captured or submitted text.
pub const CONTENT_PARAM: &str = "content";

/// Parameters for the `reply` template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyParams {
    pub keyword: String,
    pub style: String,
    pub content: String,
    pub context: String,
}

/// Parameters for the `rewrite` template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteParams {
    pub style: String,
    pub content: String,
}

/// A request for one named prompt template.
///
/// Recognized templates carry typed parameter records. Anything else is
/// forwarded untouched as `Custom`; the backend owns template validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateRequest {
    Reply(ReplyParams),
    Rewrite(RewriteParams),
    Custom {
        template: String,
        params: BTreeMap<String, String>,
    },
}

impl TemplateRequest {
    /// Validate a template name and a loose parameter map into a typed request.
    pub fn from_parts(template: &str, params: &BTreeMap<String, String>) -> Result<Self> {
        let template = template.trim();
        if template.is_empty() {
            return Err(ClipwiseError::InvalidRequest {
                reason: "template name is empty".into(),
            });
        }

        let request = match template {
            "reply" => TemplateRequest::Reply(ReplyParams {
                keyword: required(template, params, "keyword")?,
                style: required(template, params, "style")?,
                content: required(template, params, CONTENT_PARAM)?,
                context: required(template, params, "context")?,
            }),
            "rewrite" => TemplateRequest::Rewrite(RewriteParams {
                style: required(template, params, "style")?,
                content: required(template, params, CONTENT_PARAM)?,
            }),
            other => TemplateRequest::Custom {
                template: other.to_string(),
                params: params.clone(),
            },
        };
        Ok(request)
    }

    /// The template name as sent on the wire.
    pub fn template(&self) -> &str {
        match self {
            TemplateRequest::Reply(_) => "reply",
            TemplateRequest::Rewrite(_) => "rewrite",
            TemplateRequest::Custom { template, .. } => template,
        }
    }

    /// Flatten the typed parameters into the wire map.
    pub fn params(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        match self {
            TemplateRequest::Reply(p) => {
                map.insert("keyword".into(), p.keyword.clone());
                map.insert("style".into(), p.style.clone());
                map.insert(CONTENT_PARAM.into(), p.content.clone());
                map.insert("context".into(), p.context.clone());
            }
            TemplateRequest::Rewrite(p) => {
                map.insert("style".into(), p.style.clone());
                map.insert(CONTENT_PARAM.into(), p.content.clone());
            }
            TemplateRequest::Custom { params, .. } => {
                map.extend(params.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }
        map
    }
}

fn required(template: &str, params: &BTreeMap<String, String>, name: &str) -> Result<String> {
    params
        .get(name)
        .cloned()
        .ok_or_else(|| ClipwiseError::InvalidRequest {
            reason: format!("template '{}' requires parameter '{}'", template, name),
        })
}

/// Parse `key=value` pairs, as accepted on the command line.
pub fn parse_param(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got '{}'", raw)),
    }
}
