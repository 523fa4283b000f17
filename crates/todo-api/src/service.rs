use chrono::{SubsecRound, Utc};
use domain::{CreationWindow, NewTodo, OwnerScope, Tenancy, Todo, TodoError, TodoId, TodoPatch};
use infrastructure::TodoRepository;
use std::sync::Arc;
use tracing::{debug, info};

/// ToDo サービス
///
/// 所有者スコープはテナント構成から決まり、シングル/マルチの両構成を
/// 同じ手順で処理する。
#[derive(Clone)]
pub struct TodoService {
    repo: Arc<dyn TodoRepository>,
    tenancy: Tenancy,
}

impl TodoService {
    pub fn new(repo: Arc<dyn TodoRepository>, tenancy: Tenancy) -> Self {
        Self { repo, tenancy }
    }

    pub fn tenancy(&self) -> Tenancy {
        self.tenancy
    }

    /// 所有者のレコード一覧（シングルテナントでは全件）
    pub async fn list(&self, user_id: Option<&str>) -> Result<Vec<Todo>, TodoError> {
        let scope = self.tenancy.scope(user_id)?;
        let todos = self.repo.list(&scope).await?;
        debug!(count = todos.len(), "todos listed");
        Ok(todos)
    }

    /// 新規作成。ID と作成日時はサーバー側で割り当てる
    pub async fn create(&self, new: NewTodo, user_id: Option<&str>) -> Result<Todo, TodoError> {
        let scope = self.tenancy.scope(user_id)?;
        // ストアはミリ秒精度で保存するため、返却値と揃える
        let now = Utc::now().trunc_subsecs(3);
        let todo = Todo::create(new, scope.owner().cloned(), now);

        self.repo.insert(&todo).await?;
        info!(todo_id = %todo.id, "todo created");
        Ok(todo)
    }

    /// 部分更新
    ///
    /// 存在確認 -> 所有者確認 -> ID + 所有者で絞った更新 の順に行う。
    /// 所有者 ID が無い場合は所有者不一致 (403) とする。
    /// 最後の更新で一致がなければ（確認後に削除された等）not found とする。
    pub async fn update(
        &self,
        id: &str,
        user_id: Option<&str>,
        patch: &TodoPatch,
    ) -> Result<(), TodoError> {
        let (id, scope) = self.authorize(id, user_id).await?;

        if !self.repo.update(&id, &scope, patch).await? {
            return Err(TodoError::NotFound(id.to_string()));
        }
        info!(todo_id = %id, "todo updated");
        Ok(())
    }

    /// 削除。手順は update と同じ
    pub async fn delete(&self, id: &str, user_id: Option<&str>) -> Result<(), TodoError> {
        let (id, scope) = self.authorize(id, user_id).await?;

        if !self.repo.delete(&id, &scope).await? {
            return Err(TodoError::NotFound(id.to_string()));
        }
        info!(todo_id = %id, "todo deleted");
        Ok(())
    }

    /// 指定日（UTC）に作成されたレコード一覧
    pub async fn list_by_date(
        &self,
        date: &str,
        user_id: Option<&str>,
    ) -> Result<Vec<Todo>, TodoError> {
        let scope = self.tenancy.scope(user_id)?;
        let window = CreationWindow::for_date(date)?;
        let todos = self.repo.list_created_between(&scope, &window).await?;
        debug!(date, count = todos.len(), "todos listed by date");
        Ok(todos)
    }

    /// レコードの存在と所有者を確認し、更新・削除に使うスコープを返す
    async fn authorize(
        &self,
        id: &str,
        user_id: Option<&str>,
    ) -> Result<(TodoId, OwnerScope), TodoError> {
        let id = TodoId::from_string(id.to_string())
            .map_err(|_| TodoError::NotFound(id.to_string()))?;

        let existing = self
            .repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| TodoError::NotFound(id.to_string()))?;

        match self.tenancy.claimed_scope(user_id) {
            Some(scope) if scope.matches(&existing) => Ok((id, scope)),
            _ => {
                info!(todo_id = %id, "owner mismatch");
                Err(TodoError::Authorization)
            }
        }
    }
}
