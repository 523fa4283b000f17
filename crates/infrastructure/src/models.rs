use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, SecondsFormat, Utc};
use domain::{Priority, Todo, TodoId, UserId};
use std::collections::HashMap;

use crate::StoreError;

/// 所有者 + 作成日時で引く GSI
pub const USER_CREATED_AT_INDEX: &str = "userId-createdAt-index";

/// DynamoDB 上の属性名
pub mod attr {
    pub const ID: &str = "id";
    pub const TITLE: &str = "title";
    pub const CATEGORY: &str = "category";
    pub const PRIORITY: &str = "priority";
    pub const COMPLETED: &str = "completed";
    pub const USER_ID: &str = "userId";
    pub const CREATED_AT: &str = "createdAt";
}

/// 作成日時をソートキー用の固定長文字列に変換
///
/// ミリ秒精度・UTC（`Z` 表記）で桁数を揃え、辞書順と時刻順を一致させる。
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::MalformedItem(format!("createdAt {raw}: {e}")))
}

/// ToDo レコードを DynamoDB アイテムへ変換
pub fn todo_to_item(todo: &Todo) -> HashMap<String, AttributeValue> {
    let mut item = HashMap::new();
    item.insert(
        attr::ID.to_string(),
        AttributeValue::S(todo.id.as_str().to_string()),
    );
    item.insert(attr::TITLE.to_string(), AttributeValue::S(todo.title.clone()));
    item.insert(
        attr::CATEGORY.to_string(),
        AttributeValue::S(todo.category.clone()),
    );
    item.insert(
        attr::PRIORITY.to_string(),
        AttributeValue::S(todo.priority.as_str().to_string()),
    );
    item.insert(
        attr::COMPLETED.to_string(),
        AttributeValue::Bool(todo.completed),
    );
    // 所有者なしのレコードは GSI に載らない（スパースインデックス）
    if let Some(user_id) = &todo.user_id {
        item.insert(
            attr::USER_ID.to_string(),
            AttributeValue::S(user_id.as_str().to_string()),
        );
    }
    item.insert(
        attr::CREATED_AT.to_string(),
        AttributeValue::S(format_timestamp(todo.created_at)),
    );
    item
}

/// DynamoDB アイテムから ToDo レコードを復元
pub fn item_to_todo(item: &HashMap<String, AttributeValue>) -> Result<Todo, StoreError> {
    let id = TodoId::from_string(get_s(item, attr::ID)?.to_string())
        .map_err(|e| StoreError::MalformedItem(e.to_string()))?;
    let priority = get_s(item, attr::PRIORITY)?
        .parse::<Priority>()
        .map_err(|e| StoreError::MalformedItem(e.to_string()))?;
    let completed = *item
        .get(attr::COMPLETED)
        .and_then(|v| v.as_bool().ok())
        .ok_or_else(|| missing(attr::COMPLETED))?;
    let user_id = match item.get(attr::USER_ID).and_then(|v| v.as_s().ok()) {
        Some(raw) => Some(
            UserId::from_string(raw.clone())
                .map_err(|e| StoreError::MalformedItem(e.to_string()))?,
        ),
        None => None,
    };

    Ok(Todo {
        id,
        title: get_s(item, attr::TITLE)?.to_string(),
        category: get_s(item, attr::CATEGORY)?.to_string(),
        priority,
        completed,
        user_id,
        created_at: parse_timestamp(get_s(item, attr::CREATED_AT)?)?,
    })
}

fn get_s<'a>(item: &'a HashMap<String, AttributeValue>, name: &str) -> Result<&'a str, StoreError> {
    item.get(name)
        .and_then(|v| v.as_s().ok())
        .map(String::as_str)
        .ok_or_else(|| missing(name))
}

fn missing(name: &str) -> StoreError {
    StoreError::MalformedItem(format!("missing or mistyped attribute: {name}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use domain::NewTodo;

    fn sample(owner: Option<&str>) -> Todo {
        let mut todo = Todo::create(
            NewTodo {
                title: "Buy milk".to_string(),
                category: "errands".to_string(),
                priority: Priority::Low,
                completed: false,
            },
            owner.map(|o| UserId::from_string(o.to_string()).unwrap()),
            Utc::now(),
        );
        // DynamoDB にはミリ秒までしか保存しない
        todo.created_at = Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap();
        todo
    }

    #[test]
    fn test_item_conversion_preserves_record() {
        let todo = sample(Some("u1"));
        let item = todo_to_item(&todo);

        assert_eq!(item.get("userId").unwrap().as_s().unwrap(), "u1");
        assert_eq!(
            item.get("createdAt").unwrap().as_s().unwrap(),
            "2024-03-15T09:30:00.000Z"
        );
        assert_eq!(item_to_todo(&item).unwrap(), todo);
    }

    #[test]
    fn test_ownerless_record_has_no_user_attribute() {
        let todo = sample(None);
        let item = todo_to_item(&todo);

        assert!(!item.contains_key("userId"));
        assert_eq!(item_to_todo(&item).unwrap().user_id, None);
    }

    #[test]
    fn test_malformed_item_is_rejected() {
        let mut item = todo_to_item(&sample(Some("u1")));
        item.insert("priority".to_string(), AttributeValue::S("urgent".to_string()));
        assert!(matches!(item_to_todo(&item), Err(StoreError::MalformedItem(_))));

        let mut item = todo_to_item(&sample(Some("u1")));
        item.remove("title");
        assert!(matches!(item_to_todo(&item), Err(StoreError::MalformedItem(_))));
    }

    #[test]
    fn test_timestamp_format_is_fixed_width() {
        let a = format_timestamp(Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap());
        let b = format_timestamp(
            Utc.with_ymd_and_hms(2024, 3, 15, 23, 59, 59).unwrap() + chrono::Duration::milliseconds(999),
        );
        assert_eq!(a.len(), b.len());
        assert!(a < b);
        assert_eq!(parse_timestamp(&a).unwrap(), Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap());
    }
}
