//! n8n 响应整形
//!
//! n8n webhook 的返回形态并不统一：可能是 `[{"json": {...}}]` 的 item 数组、
//! 单元素数组、`{data: [...]}` / `{files: [...]}` 包装对象、纯文本或空 body。
//! 这里的函数把它们整理成稳定的形态，纯函数，不依赖 axum/reqwest。

use serde_json::{json, Map, Value};

/// 常见的列表包装字段
const LIST_KEYS: [&str; 4] = ["files", "data", "items", "results"];

/// 常见的错误信息字段
const MESSAGE_KEYS: [&str; 4] = ["message", "error", "msg", "errorMessage"];

/// 解码上游 body
///
/// - 空 body → `{"success": true}`
/// - 声明为 JSON 或以 `{`/`[` 开头 → 严格解析，失败返回错误
/// - 其余文本 → `{"success": true, "message": text}`
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> Result<Value, serde_json::Error> {
    let text = String::from_utf8_lossy(bytes);
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return Ok(json!({ "success": true }));
    }

    let declared_json = content_type
        .map(|ct| ct.to_ascii_lowercase().contains("json"))
        .unwrap_or(false);

    if declared_json || trimmed.starts_with('{') || trimmed.starts_with('[') {
        return serde_json::from_str(trimmed);
    }

    Ok(json!({ "success": true, "message": trimmed }))
}

/// 展开 n8n item 数组：`[{"json": {...}}, ...]` → `[{...}, ...]`
///
/// 只有当数组非空且每个元素都是带 `json` 字段的对象时才展开
pub fn unwrap_items(value: Value) -> Value {
    match value {
        Value::Array(items)
            if !items.is_empty()
                && items
                    .iter()
                    .all(|item| item.get("json").map_or(false, Value::is_object)) =>
        {
            Value::Array(
                items
                    .into_iter()
                    .filter_map(|mut item| item.get_mut("json").map(Value::take))
                    .collect(),
            )
        }
        other => other,
    }
}

/// 整形为单个结果对象：展开 item 数组，元素为对象的单元素数组取其元素
pub fn normalize_object(value: Value) -> Value {
    match unwrap_items(value) {
        Value::Array(mut items) if items.len() == 1 && items[0].is_object() => items.remove(0),
        other => other,
    }
}

/// 提取列表
///
/// 支持裸数组、item 数组、`files`/`data`/`items`/`results` 包装字段，
/// 以及只含一个包装对象的数组；单个对象视为单元素列表，`null` 视为空列表
pub fn extract_list(value: &Value) -> Vec<Value> {
    match unwrap_items(value.clone()) {
        Value::Array(items) => {
            if items.len() == 1 {
                if let Some(inner) = list_field(&items[0]) {
                    return extract_list(inner);
                }
            }
            items
        }
        Value::Object(map) => match list_field_in(&map) {
            Some(inner) => extract_list(inner),
            None => vec![Value::Object(map)],
        },
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

fn list_field(value: &Value) -> Option<&Value> {
    value.as_object().and_then(list_field_in)
}

fn list_field_in(map: &Map<String, Value>) -> Option<&Value> {
    LIST_KEYS
        .iter()
        .filter_map(|key| map.get(*key))
        .find(|v| v.is_array())
}

/// 按顺序取第一个非空字符串字段（数字会转为字符串）
pub fn string_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match value.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// 提取人类可读的错误信息，包括 `{"error": {"message": "..."}}` 形式
pub fn extract_message(value: &Value) -> Option<String> {
    let value = normalize_object(value.clone());
    if let Some(message) = string_field(&value, &MESSAGE_KEYS) {
        return Some(message);
    }
    value.get("error").and_then(|e| string_field(e, &MESSAGE_KEYS))
}
