//! Chart of accounts rules: required fields and parent hierarchy.

use std::collections::HashMap;

use ledgerline_shared::AppError;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised by account validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    /// Code is empty.
    #[error("code is required")]
    EmptyCode,

    /// Name is empty.
    #[error("name is required")]
    EmptyName,

    /// Parent account does not exist.
    #[error("parent account {0} not found")]
    ParentNotFound(Uuid),

    /// Assigning the parent would close a loop in the hierarchy.
    #[error("parent account {parent} would create a cycle for account {account}")]
    Cycle {
        /// The account being updated.
        account: Uuid,
        /// The proposed parent.
        parent: Uuid,
    },
}

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::EmptyCode | AccountError::EmptyName => {
                Self::InvalidArgument(err.to_string())
            }
            AccountError::ParentNotFound(_) => Self::NotFound(err.to_string()),
            AccountError::Cycle { .. } => Self::FailedPrecondition(err.to_string()),
        }
    }
}

/// Checks that code and name are non-empty after trimming.
///
/// # Errors
///
/// Returns `EmptyCode` or `EmptyName`.
pub fn validate_fields(code: &str, name: &str) -> Result<(), AccountError> {
    if code.trim().is_empty() {
        return Err(AccountError::EmptyCode);
    }
    if name.trim().is_empty() {
        return Err(AccountError::EmptyName);
    }
    Ok(())
}

/// Validates a proposed parent by walking the parent chain.
///
/// `parents` maps every existing account id to its current parent. `account`
/// is `None` when the account does not exist yet, in which case no cycle is
/// possible but the parent must still exist. The walk is bounded by the number
/// of accounts so a corrupt chain cannot loop forever.
///
/// # Errors
///
/// Returns `ParentNotFound` or `Cycle`.
pub fn validate_parent(
    account: Option<Uuid>,
    parent: Uuid,
    parents: &HashMap<Uuid, Option<Uuid>>,
) -> Result<(), AccountError> {
    if !parents.contains_key(&parent) {
        return Err(AccountError::ParentNotFound(parent));
    }
    let Some(account) = account else {
        return Ok(());
    };

    let cycle = AccountError::Cycle { account, parent };
    let mut current = Some(parent);
    for _ in 0..=parents.len() {
        match current {
            None => return Ok(()),
            Some(id) if id == account => return Err(cycle),
            Some(id) => current = parents.get(&id).copied().flatten(),
        }
    }
    // Chain longer than the number of accounts: it already loops.
    Err(cycle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> (Vec<Uuid>, HashMap<Uuid, Option<Uuid>>) {
        // root <- mid <- leaf
        let ids: Vec<Uuid> = (0..3).map(|_| Uuid::now_v7()).collect();
        let mut parents = HashMap::new();
        parents.insert(ids[0], None);
        parents.insert(ids[1], Some(ids[0]));
        parents.insert(ids[2], Some(ids[1]));
        (ids, parents)
    }

    #[test]
    fn test_required_fields() {
        assert_eq!(validate_fields(" ", "Cash"), Err(AccountError::EmptyCode));
        assert_eq!(validate_fields("1001", ""), Err(AccountError::EmptyName));
        assert!(validate_fields("1001", "Cash").is_ok());
    }

    #[test]
    fn test_new_account_parent_must_exist() {
        let (ids, parents) = chain();
        assert!(validate_parent(None, ids[2], &parents).is_ok());
        let missing = Uuid::now_v7();
        assert_eq!(
            validate_parent(None, missing, &parents),
            Err(AccountError::ParentNotFound(missing))
        );
    }

    #[test]
    fn test_reparent_without_cycle() {
        let (ids, parents) = chain();
        let other = Uuid::now_v7();
        let mut parents = parents;
        parents.insert(other, None);
        assert!(validate_parent(Some(ids[2]), other, &parents).is_ok());
    }

    #[test]
    fn test_self_parent_is_cycle() {
        let (ids, parents) = chain();
        assert!(matches!(
            validate_parent(Some(ids[1]), ids[1], &parents),
            Err(AccountError::Cycle { .. })
        ));
    }

    #[test]
    fn test_descendant_parent_is_cycle() {
        let (ids, parents) = chain();
        assert_eq!(
            validate_parent(Some(ids[0]), ids[2], &parents),
            Err(AccountError::Cycle {
                account: ids[0],
                parent: ids[2]
            })
        );
    }

    #[test]
    fn test_corrupt_loop_terminates() {
        let (a, b, c) = (Uuid::now_v7(), Uuid::now_v7(), Uuid::now_v7());
        let mut parents = HashMap::new();
        parents.insert(a, Some(b));
        parents.insert(b, Some(a));
        parents.insert(c, None);
        assert!(validate_parent(Some(c), a, &parents).is_err());
    }
}
