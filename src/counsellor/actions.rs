//! Parsing the model's reply: splitting visible text from the trailing
//! fenced actions block, then decoding the block into raw actions.
//!
//! The two layers are independent so a malformed JSON body still strips
//! the block from what the user sees.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Literal tag opening the actions block.
pub const ACTIONS_MARKER: &str = "```actions";

const FENCE: &str = "```";

/// One `{type, payload}` record as emitted by the model, before dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAction {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
}

/// Why the action list came back empty despite a marker being present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseIssue {
    /// Marker found but no closing fence after it.
    UnterminatedBlock,
    /// Block body was not a valid JSON array of `{type, payload}` objects.
    MalformedJson(String),
}

/// Result of splitting a reply.
#[derive(Debug, Clone)]
pub struct ParsedReply {
    /// Text shown to the user. The marker and everything after it is
    /// always stripped, even when the block fails to parse.
    pub visible: String,
    pub actions: Vec<RawAction>,
    pub issue: Option<ParseIssue>,
}

impl ParsedReply {
    fn plain(visible: &str) -> Self {
        Self {
            visible: visible.trim().to_string(),
            actions: Vec::new(),
            issue: None,
        }
    }
}

/// Extract the body between the marker and the next fence.
/// Returns `None` when the marker is absent.
fn extract_block(content: &str) -> Option<(usize, Result<&str, ParseIssue>)> {
    let start = content.find(ACTIONS_MARKER)?;
    let body_start = start + ACTIONS_MARKER.len();
    let body = &content[body_start..];
    match body.find(FENCE) {
        Some(end) => Some((start, Ok(body[..end].trim()))),
        None => Some((start, Err(ParseIssue::UnterminatedBlock))),
    }
}

/// Split a model reply into visible text and its action list.
pub fn parse_reply(content: &str) -> ParsedReply {
    let Some((marker_at, block)) = extract_block(content) else {
        return ParsedReply::plain(content);
    };

    let visible = content[..marker_at].trim().to_string();
    match block {
        Err(issue) => {
            debug!("Actions block had no closing fence");
            ParsedReply {
                visible,
                actions: Vec::new(),
                issue: Some(issue),
            }
        }
        Ok(body) => match serde_json::from_str::<Vec<RawAction>>(body) {
            Ok(actions) => ParsedReply {
                visible,
                actions,
                issue: None,
            },
            Err(e) => {
                debug!(error = %e, "Actions block was not valid JSON");
                ParsedReply {
                    visible,
                    actions: Vec::new(),
                    issue: Some(ParseIssue::MalformedJson(e.to_string())),
                }
            }
        },
    }
}
