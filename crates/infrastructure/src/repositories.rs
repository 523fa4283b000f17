use async_trait::async_trait;
use aws_sdk_dynamodb::operation::delete_item::DeleteItemError;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;
use aws_sdk_dynamodb::types::AttributeValue;
use domain::{CreationWindow, OwnerScope, Todo, TodoId, TodoPatch};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, error};

use crate::models::{attr, format_timestamp, item_to_todo, todo_to_item, USER_CREATED_AT_INDEX};
use crate::DynamoDbClient;

/// ストア層のエラー
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("DynamoDB error: {0}")]
    DynamoDb(String),

    #[error("Malformed item: {0}")]
    MalformedItem(String),

    #[error("Duplicate id: {0}")]
    Conflict(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for domain::TodoError {
    fn from(e: StoreError) -> Self {
        domain::TodoError::Store(e.to_string())
    }
}

/// ToDo コレクションへのアクセス
///
/// 各メソッドはストアへの呼び出し 1 回分に相当する。
/// `update` / `delete` は ID と所有者スコープの両方に一致した場合のみ作用し、
/// 一致しなかった場合は `false` を返す。
#[async_trait]
pub trait TodoRepository: Send + Sync {
    async fn insert(&self, todo: &Todo) -> Result<(), StoreError>;

    async fn find_by_id(&self, id: &TodoId) -> Result<Option<Todo>, StoreError>;

    /// スコープ内の全レコード（順序はストアの自然順）
    async fn list(&self, scope: &OwnerScope) -> Result<Vec<Todo>, StoreError>;

    async fn list_created_between(
        &self,
        scope: &OwnerScope,
        window: &CreationWindow,
    ) -> Result<Vec<Todo>, StoreError>;

    async fn update(
        &self,
        id: &TodoId,
        scope: &OwnerScope,
        patch: &TodoPatch,
    ) -> Result<bool, StoreError>;

    async fn delete(&self, id: &TodoId, scope: &OwnerScope) -> Result<bool, StoreError>;
}

type Item = HashMap<String, AttributeValue>;

/// DynamoDB 実装
///
/// テーブルのパーティションキーは `id`。所有者別の一覧と作成日での絞り込みは
/// GSI `userId-createdAt-index` を使う。
#[derive(Clone)]
pub struct DynamoTodoRepository {
    db: DynamoDbClient,
}

impl DynamoTodoRepository {
    pub fn new(db: DynamoDbClient) -> Self {
        Self { db }
    }

    fn to_todos(items: Vec<Item>) -> Result<Vec<Todo>, StoreError> {
        items.iter().map(item_to_todo).collect()
    }

    /// 所有者で GSI をクエリ（ページを最後まで辿る）
    async fn query_owner(
        &self,
        user_id: &str,
        range: Option<(String, String)>,
    ) -> Result<Vec<Item>, StoreError> {
        let mut items = Vec::new();
        let mut start_key: Option<Item> = None;

        loop {
            let mut request = self
                .db
                .client()
                .query()
                .table_name(self.db.table_name())
                .index_name(USER_CREATED_AT_INDEX)
                .expression_attribute_names("#user", attr::USER_ID)
                .expression_attribute_values(":user", AttributeValue::S(user_id.to_string()))
                .set_exclusive_start_key(start_key.take());

            request = match &range {
                Some((from, to)) => request
                    .key_condition_expression("#user = :user AND #created BETWEEN :from AND :to")
                    .expression_attribute_names("#created", attr::CREATED_AT)
                    .expression_attribute_values(":from", AttributeValue::S(from.clone()))
                    .expression_attribute_values(":to", AttributeValue::S(to.clone())),
                None => request.key_condition_expression("#user = :user"),
            };

            let output = request
                .send()
                .await
                .map_err(|e| self.db.convert_error(e))?;

            items.extend(output.items.unwrap_or_default());
            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        Ok(items)
    }

    /// テーブル全体をスキャン（シングルテナント構成用）
    async fn scan_all(&self, range: Option<(String, String)>) -> Result<Vec<Item>, StoreError> {
        let mut items = Vec::new();
        let mut start_key: Option<Item> = None;

        loop {
            let mut request = self
                .db
                .client()
                .scan()
                .table_name(self.db.table_name())
                .set_exclusive_start_key(start_key.take());

            if let Some((from, to)) = &range {
                request = request
                    .filter_expression("#created >= :from AND #created < :to")
                    .expression_attribute_names("#created", attr::CREATED_AT)
                    .expression_attribute_values(":from", AttributeValue::S(from.clone()))
                    .expression_attribute_values(":to", AttributeValue::S(to.clone()));
            }

            let output = request
                .send()
                .await
                .map_err(|e| self.db.convert_error(e))?;

            items.extend(output.items.unwrap_or_default());
            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        Ok(items)
    }

    fn key(id: &TodoId) -> AttributeValue {
        AttributeValue::S(id.as_str().to_string())
    }
}

#[async_trait]
impl TodoRepository for DynamoTodoRepository {
    async fn insert(&self, todo: &Todo) -> Result<(), StoreError> {
        self.db
            .client()
            .put_item()
            .table_name(self.db.table_name())
            .set_item(Some(todo_to_item(todo)))
            .condition_expression("attribute_not_exists(#id)")
            .expression_attribute_names("#id", attr::ID)
            .send()
            .await
            .map_err(|e| self.db.convert_error(e))?;

        debug!(todo_id = %todo.id, "todo inserted");
        Ok(())
    }

    async fn find_by_id(&self, id: &TodoId) -> Result<Option<Todo>, StoreError> {
        let output = self
            .db
            .client()
            .get_item()
            .table_name(self.db.table_name())
            .key(attr::ID, Self::key(id))
            .send()
            .await
            .map_err(|e| self.db.convert_error(e))?;

        output.item.as_ref().map(item_to_todo).transpose()
    }

    async fn list(&self, scope: &OwnerScope) -> Result<Vec<Todo>, StoreError> {
        let items = match scope {
            OwnerScope::Owner(user_id) => self.query_owner(user_id.as_str(), None).await?,
            OwnerScope::Any => self.scan_all(None).await?,
        };
        Self::to_todos(items)
    }

    async fn list_created_between(
        &self,
        scope: &OwnerScope,
        window: &CreationWindow,
    ) -> Result<Vec<Todo>, StoreError> {
        let from = format_timestamp(window.start);
        let to = format_timestamp(window.end);

        match scope {
            OwnerScope::Owner(user_id) => {
                // キー条件の BETWEEN は上端を含むため、上端ちょうどのレコードは除外する
                let items = self.query_owner(user_id.as_str(), Some((from, to))).await?;
                let mut todos = Self::to_todos(items)?;
                todos.retain(|t| window.contains(t.created_at));
                Ok(todos)
            }
            OwnerScope::Any => Self::to_todos(self.scan_all(Some((from, to))).await?),
        }
    }

    async fn update(
        &self,
        id: &TodoId,
        scope: &OwnerScope,
        patch: &TodoPatch,
    ) -> Result<bool, StoreError> {
        // 空の SET 式は送れないため、一致確認のみ行う
        if patch.is_empty() {
            let existing = self.find_by_id(id).await?;
            return Ok(existing.is_some_and(|t| scope.matches(&t)));
        }

        let mut sets = Vec::new();
        let mut request = self
            .db
            .client()
            .update_item()
            .table_name(self.db.table_name())
            .key(attr::ID, Self::key(id))
            .expression_attribute_names("#id", attr::ID);

        if let Some(title) = &patch.title {
            sets.push("#title = :title");
            request = request
                .expression_attribute_names("#title", attr::TITLE)
                .expression_attribute_values(":title", AttributeValue::S(title.clone()));
        }
        if let Some(category) = &patch.category {
            sets.push("#category = :category");
            request = request
                .expression_attribute_names("#category", attr::CATEGORY)
                .expression_attribute_values(":category", AttributeValue::S(category.clone()));
        }
        if let Some(priority) = patch.priority {
            sets.push("#priority = :priority");
            request = request
                .expression_attribute_names("#priority", attr::PRIORITY)
                .expression_attribute_values(
                    ":priority",
                    AttributeValue::S(priority.as_str().to_string()),
                );
        }
        if let Some(completed) = patch.completed {
            sets.push("#completed = :completed");
            request = request
                .expression_attribute_names("#completed", attr::COMPLETED)
                .expression_attribute_values(":completed", AttributeValue::Bool(completed));
        }

        request = match scope {
            OwnerScope::Owner(user_id) => request
                .condition_expression("attribute_exists(#id) AND #user = :owner")
                .expression_attribute_names("#user", attr::USER_ID)
                .expression_attribute_values(
                    ":owner",
                    AttributeValue::S(user_id.as_str().to_string()),
                ),
            OwnerScope::Any => request.condition_expression("attribute_exists(#id)"),
        };

        let result = request
            .update_expression(format!("SET {}", sets.join(", ")))
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(e) if matches!(
                e.as_service_error(),
                Some(UpdateItemError::ConditionalCheckFailedException(_))
            ) =>
            {
                debug!(todo_id = %id, "update matched no record");
                Ok(false)
            }
            Err(e) => {
                error!(todo_id = %id, "update failed");
                Err(self.db.convert_error(e))
            }
        }
    }

    async fn delete(&self, id: &TodoId, scope: &OwnerScope) -> Result<bool, StoreError> {
        let mut request = self
            .db
            .client()
            .delete_item()
            .table_name(self.db.table_name())
            .key(attr::ID, Self::key(id))
            .expression_attribute_names("#id", attr::ID);

        request = match scope {
            OwnerScope::Owner(user_id) => request
                .condition_expression("attribute_exists(#id) AND #user = :owner")
                .expression_attribute_names("#user", attr::USER_ID)
                .expression_attribute_values(
                    ":owner",
                    AttributeValue::S(user_id.as_str().to_string()),
                ),
            OwnerScope::Any => request.condition_expression("attribute_exists(#id)"),
        };

        match request.send().await {
            Ok(_) => Ok(true),
            Err(e) if matches!(
                e.as_service_error(),
                Some(DeleteItemError::ConditionalCheckFailedException(_))
            ) =>
            {
                debug!(todo_id = %id, "delete matched no record");
                Ok(false)
            }
            Err(e) => {
                error!(todo_id = %id, "delete failed");
                Err(self.db.convert_error(e))
            }
        }
    }
}
