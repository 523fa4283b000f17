use crate::errors::{DomainError, TodoError};
use crate::todo::{Todo, UserId};
use std::str::FromStr;

/// テナント構成
///
/// `Multi` ではすべての操作に所有者 ID が必要で、所有者チェックが行われる。
/// `Single` は同じプロトコルから所有者の次元を取り除いたもの。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tenancy {
    Single,
    #[default]
    Multi,
}

impl Tenancy {
    /// 呼び出し側が申告した所有者 ID から操作のスコープを決定する
    pub fn scope(&self, user_id: Option<&str>) -> Result<OwnerScope, TodoError> {
        self.claimed_scope(user_id)
            .ok_or_else(|| TodoError::Validation("User ID is required".to_string()))
    }

    /// `scope` と同じだが、マルチテナントで ID が無い・空の場合は `None` を返す
    ///
    /// 既存レコードへの操作では ID の欠落を所有者不一致として扱う。
    pub fn claimed_scope(&self, user_id: Option<&str>) -> Option<OwnerScope> {
        match self {
            Tenancy::Single => Some(OwnerScope::Any),
            Tenancy::Multi => {
                let id = UserId::from_string(user_id?.to_string()).ok()?;
                Some(OwnerScope::Owner(id))
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tenancy::Single => "single",
            Tenancy::Multi => "multi",
        }
    }
}

impl FromStr for Tenancy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" => Ok(Tenancy::Single),
            "multi" => Ok(Tenancy::Multi),
            other => Err(DomainError::InvalidTenancy(other.to_string())),
        }
    }
}

/// 操作対象レコードの所有者スコープ
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerScope {
    Any,
    Owner(UserId),
}

impl OwnerScope {
    /// 指定の所有者を持つレコードへの操作を許可するか
    pub fn permits(&self, owner: Option<&UserId>) -> bool {
        match self {
            OwnerScope::Any => true,
            OwnerScope::Owner(expected) => owner == Some(expected),
        }
    }

    pub fn matches(&self, todo: &Todo) -> bool {
        self.permits(todo.user_id.as_ref())
    }

    /// 新規作成時にレコードへ記録する所有者
    pub fn owner(&self) -> Option<&UserId> {
        match self {
            OwnerScope::Any => None,
            OwnerScope::Owner(id) => Some(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> UserId {
        UserId::from_string(id.to_string()).unwrap()
    }

    #[test]
    fn test_multi_requires_user_id() {
        let tenancy = Tenancy::Multi;

        assert_eq!(
            tenancy.scope(None),
            Err(TodoError::Validation("User ID is required".to_string()))
        );
        assert_eq!(
            tenancy.scope(Some("")),
            Err(TodoError::Validation("User ID is required".to_string()))
        );
        assert_eq!(tenancy.scope(Some("u1")), Ok(OwnerScope::Owner(user("u1"))));
    }

    #[test]
    fn test_claimed_scope_without_user_id_is_none() {
        assert_eq!(Tenancy::Multi.claimed_scope(None), None);
        assert_eq!(Tenancy::Multi.claimed_scope(Some("")), None);
        assert_eq!(
            Tenancy::Multi.claimed_scope(Some("u1")),
            Some(OwnerScope::Owner(user("u1")))
        );
        assert_eq!(Tenancy::Single.claimed_scope(None), Some(OwnerScope::Any));
    }

    #[test]
    fn test_single_ignores_user_id() {
        let tenancy = Tenancy::Single;
        assert_eq!(tenancy.scope(None), Ok(OwnerScope::Any));
        assert_eq!(tenancy.scope(Some("u1")), Ok(OwnerScope::Any));
    }

    #[test]
    fn test_permits() {
        let alice = user("alice");
        let bob = user("bob");
        let scope = OwnerScope::Owner(alice.clone());

        assert!(scope.permits(Some(&alice)));
        assert!(!scope.permits(Some(&bob)));
        assert!(!scope.permits(None));
        assert!(OwnerScope::Any.permits(Some(&bob)));
        assert!(OwnerScope::Any.permits(None));
    }

    #[test]
    fn test_tenancy_from_str() {
        assert_eq!("multi".parse::<Tenancy>().unwrap(), Tenancy::Multi);
        assert_eq!("SINGLE".parse::<Tenancy>().unwrap(), Tenancy::Single);
        assert!("both".parse::<Tenancy>().is_err());
        assert_eq!(Tenancy::default(), Tenancy::Multi);
    }
}
