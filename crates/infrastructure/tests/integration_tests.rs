use chrono::{TimeZone, Utc};
use domain::{CreationWindow, NewTodo, OwnerScope, Priority, Todo, TodoId, TodoPatch, UserId};
use infrastructure::{InMemoryTodoRepository, StoreError, TodoRepository};
use proptest::prelude::*;

fn user(id: &str) -> UserId {
    UserId::from_string(id.to_string()).unwrap()
}

fn todo_for(owner: Option<&str>, title: &str) -> Todo {
    Todo::create(
        NewTodo {
            title: title.to_string(),
            category: "errands".to_string(),
            priority: Priority::Medium,
            completed: false,
        },
        owner.map(user),
        Utc::now(),
    )
}

/// 挿入と ID 検索
#[tokio::test]
async fn test_insert_and_find() {
    let repo = InMemoryTodoRepository::new();
    let todo = todo_for(Some("u1"), "Buy milk");

    repo.insert(&todo).await.unwrap();

    assert_eq!(repo.find_by_id(&todo.id).await.unwrap(), Some(todo.clone()));
    assert_eq!(repo.find_by_id(&TodoId::new()).await.unwrap(), None);

    // 同一 ID の二重挿入は拒否される
    assert!(matches!(
        repo.insert(&todo).await,
        Err(StoreError::Conflict(_))
    ));
}

/// スコープ付き更新: 所有者が一致しない場合は何も変更しない
#[tokio::test]
async fn test_scoped_update() {
    let repo = InMemoryTodoRepository::new();
    let todo = todo_for(Some("alice"), "Task");
    repo.insert(&todo).await.unwrap();

    let patch = TodoPatch {
        completed: Some(true),
        ..Default::default()
    };

    let matched = repo
        .update(&todo.id, &OwnerScope::Owner(user("bob")), &patch)
        .await
        .unwrap();
    assert!(!matched);
    assert!(!repo.find_by_id(&todo.id).await.unwrap().unwrap().completed);

    let matched = repo
        .update(&todo.id, &OwnerScope::Owner(user("alice")), &patch)
        .await
        .unwrap();
    assert!(matched);
    let stored = repo.find_by_id(&todo.id).await.unwrap().unwrap();
    assert!(stored.completed);
    assert_eq!(stored.created_at, todo.created_at);
    assert_eq!(stored.user_id, todo.user_id);

    // 存在しない ID
    assert!(!repo
        .update(&TodoId::new(), &OwnerScope::Any, &patch)
        .await
        .unwrap());
}

/// スコープ付き削除
#[tokio::test]
async fn test_scoped_delete() {
    let repo = InMemoryTodoRepository::new();
    let todo = todo_for(Some("alice"), "Task");
    repo.insert(&todo).await.unwrap();

    assert!(!repo
        .delete(&todo.id, &OwnerScope::Owner(user("bob")))
        .await
        .unwrap());
    assert!(repo.find_by_id(&todo.id).await.unwrap().is_some());

    assert!(repo
        .delete(&todo.id, &OwnerScope::Owner(user("alice")))
        .await
        .unwrap());
    assert!(repo.find_by_id(&todo.id).await.unwrap().is_none());

    // 2 回目の削除は一致なし
    assert!(!repo
        .delete(&todo.id, &OwnerScope::Owner(user("alice")))
        .await
        .unwrap());
}

/// 作成日による絞り込みは半開区間
#[tokio::test]
async fn test_list_created_between() {
    let repo = InMemoryTodoRepository::new();
    let at = |d, h, m, s| Utc.with_ymd_and_hms(2024, 3, d, h, m, s).unwrap();

    let mut inside = todo_for(Some("u1"), "inside");
    inside.created_at = at(15, 23, 59, 59);
    let mut next_day = todo_for(Some("u1"), "next day");
    next_day.created_at = at(16, 0, 0, 0);
    let mut prev_day = todo_for(Some("u1"), "prev day");
    prev_day.created_at = at(14, 23, 59, 59);
    let mut other_owner = todo_for(Some("u2"), "other owner");
    other_owner.created_at = at(15, 12, 0, 0);

    for todo in [&inside, &next_day, &prev_day, &other_owner] {
        repo.insert(todo).await.unwrap();
    }

    let window = CreationWindow::for_date("2024-03-15").unwrap();

    let scoped = repo
        .list_created_between(&OwnerScope::Owner(user("u1")), &window)
        .await
        .unwrap();
    assert_eq!(scoped, vec![inside.clone()]);

    let all = repo
        .list_created_between(&OwnerScope::Any, &window)
        .await
        .unwrap();
    assert_eq!(all, vec![inside, other_owner]);
}

proptest! {
    /// 所有者別一覧は、他の所有者のレコードがどう混在していても
    /// その所有者のレコードだけをちょうど返す
    #[test]
    fn prop_list_by_owner_returns_exactly_owned(owners in prop::collection::vec(0usize..4, 0..32)) {
        let names = ["alice", "bob", "carol", "dave"];
        let rt = tokio::runtime::Runtime::new().unwrap();

        rt.block_on(async {
            let repo = InMemoryTodoRepository::new();
            let mut inserted = Vec::new();
            for (i, owner) in owners.iter().enumerate() {
                let todo = todo_for(Some(names[*owner]), &format!("task {i}"));
                repo.insert(&todo).await.unwrap();
                inserted.push(todo);
            }

            for name in names {
                let listed = repo.list(&OwnerScope::Owner(user(name))).await.unwrap();
                let expected: Vec<Todo> = inserted
                    .iter()
                    .filter(|t| t.user_id.as_ref().map(UserId::as_str) == Some(name))
                    .cloned()
                    .collect();
                prop_assert_eq!(listed, expected);
            }

            let all = repo.list(&OwnerScope::Any).await.unwrap();
            prop_assert_eq!(all.len(), inserted.len());
            Ok::<(), TestCaseError>(())
        })?;
    }
}
