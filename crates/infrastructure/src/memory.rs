use async_trait::async_trait;
use domain::{CreationWindow, OwnerScope, Todo, TodoId, TodoPatch};
use std::sync::Mutex;

use crate::{StoreError, TodoRepository};

/// 簡易な InMemory 実装（開発/テスト用）
///
/// 挿入順を自然順として保持する。
#[derive(Default)]
pub struct InMemoryTodoRepository {
    todos: Mutex<Vec<Todo>>,
}

impl InMemoryTodoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 保存済みレコードのスナップショット（テスト観測用）
    pub fn snapshot(&self) -> Result<Vec<Todo>, StoreError> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Todo>>, StoreError> {
        self.todos
            .lock()
            .map_err(|_| StoreError::Unavailable("in-memory store poisoned".to_string()))
    }
}

#[async_trait]
impl TodoRepository for InMemoryTodoRepository {
    async fn insert(&self, todo: &Todo) -> Result<(), StoreError> {
        let mut todos = self.lock()?;
        if todos.iter().any(|t| t.id == todo.id) {
            return Err(StoreError::Conflict(todo.id.to_string()));
        }
        todos.push(todo.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &TodoId) -> Result<Option<Todo>, StoreError> {
        Ok(self.lock()?.iter().find(|t| &t.id == id).cloned())
    }

    async fn list(&self, scope: &OwnerScope) -> Result<Vec<Todo>, StoreError> {
        Ok(self
            .lock()?
            .iter()
            .filter(|t| scope.matches(t))
            .cloned()
            .collect())
    }

    async fn list_created_between(
        &self,
        scope: &OwnerScope,
        window: &CreationWindow,
    ) -> Result<Vec<Todo>, StoreError> {
        Ok(self
            .lock()?
            .iter()
            .filter(|t| scope.matches(t) && window.contains(t.created_at))
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        id: &TodoId,
        scope: &OwnerScope,
        patch: &TodoPatch,
    ) -> Result<bool, StoreError> {
        let mut todos = self.lock()?;
        match todos.iter_mut().find(|t| &t.id == id && scope.matches(t)) {
            Some(todo) => {
                patch.apply_to(todo);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &TodoId, scope: &OwnerScope) -> Result<bool, StoreError> {
        let mut todos = self.lock()?;
        let before = todos.len();
        todos.retain(|t| !(&t.id == id && scope.matches(t)));
        Ok(todos.len() != before)
    }
}
