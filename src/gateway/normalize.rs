//! Maps heterogeneous backend payloads into the canonical poll shape.
//!
//! Backends disagree on field names (`pollId`/`id`/`_id`, `choices`/`options`,
//! `count`/`votes`) and some return choices as bare strings or wrap a single
//! poll in a one-element array. All of that variance is absorbed here, once,
//! so nothing downstream branches on payload shape.

use serde_json::{Map, Value};

use crate::error::PollError;
use crate::models::{Choice, Poll};

pub fn polls_from_value(value: &Value) -> Result<Vec<Poll>, PollError> {
    let items = value
        .as_array()
        .ok_or_else(|| PollError::Transport("poll list response is not an array".to_string()))?;
    items.iter().map(poll_from_value).collect()
}

pub fn poll_from_value(value: &Value) -> Result<Poll, PollError> {
    // Some backends wrap a single poll in a one-element array.
    let value = match value {
        Value::Array(items) => items
            .first()
            .ok_or_else(|| PollError::Transport("empty poll response".to_string()))?,
        other => other,
    };

    let obj = value
        .as_object()
        .ok_or_else(|| PollError::Transport("poll response is not an object".to_string()))?;

    let id = string_field(obj, &["pollId", "id", "_id"])
        .ok_or_else(|| PollError::Transport("poll response has no id".to_string()))?;

    let title = string_field(obj, &["title", "question", "topic"])
        .unwrap_or_else(|| "Untitled Poll".to_string());

    let creator_id = string_field(obj, &["creatorId", "creator_id"]).unwrap_or_default();

    let choices = obj
        .get("choices")
        .or_else(|| obj.get("options"))
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .enumerate()
                .map(|(index, item)| choice_from_value(item, index))
                .collect()
        })
        .unwrap_or_default();

    Ok(Poll {
        id,
        title,
        creator_id,
        choices,
    })
}

fn choice_from_value(value: &Value, index: usize) -> Choice {
    // Bare string choices carry no tally; they get a positional id.
    if let Value::String(text) = value {
        return Choice {
            id: index.to_string(),
            text: text.clone(),
            count: 0,
        };
    }

    let empty = Map::new();
    let obj = value.as_object().unwrap_or(&empty);
    Choice {
        id: string_field(obj, &["id", "_id"]).unwrap_or_else(|| index.to_string()),
        text: string_field(obj, &["text", "option"]).unwrap_or_else(|| "Option".to_string()),
        count: obj
            .get("count")
            .or_else(|| obj.get("votes"))
            .and_then(Value::as_u64)
            .unwrap_or(0),
    }
}

/// First of `keys` present with a string or numeric value. Numeric ids are
/// rendered as strings so ids stay uniform downstream.
fn string_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match obj.get(*key) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
