use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::errors::{LoanError, Result};
use crate::types::{LoanId, LoanRecord, UserId, UserRecord};

/// Persistence for users and loans, injected into the service layer.
pub trait LoanRepository: Send + Sync {
    fn insert_user(&self, user: UserRecord) -> Result<()>;
    fn find_user_by_id(&self, id: UserId) -> Result<UserRecord>;
    fn insert_loan(&self, loan: LoanRecord) -> Result<()>;
    /// fails with `LoanNotFound` when no record exists
    fn find_loan_by_id(&self, id: LoanId) -> Result<LoanRecord>;
    fn loans_for_user(&self, user_id: UserId) -> Result<Vec<LoanRecord>>;
    /// adds the user to the loan's owners, returns false if they already held it
    fn add_owner(&self, loan_id: LoanId, user_id: UserId) -> Result<bool>;

    fn user_exists(&self, id: UserId) -> Result<bool> {
        match self.find_user_by_id(id) {
            Ok(_) => Ok(true),
            Err(LoanError::UserNotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// process-local repository
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    users: RwLock<HashMap<UserId, UserRecord>>,
    loans: RwLock<HashMap<LoanId, LoanRecord>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loan_count(&self) -> Result<usize> {
        Ok(read(&self.loans)?.len())
    }

    pub fn user_count(&self) -> Result<usize> {
        Ok(read(&self.users)?.len())
    }
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>> {
    lock.read().map_err(|_| LoanError::Storage {
        message: "repository lock poisoned".to_string(),
    })
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>> {
    lock.write().map_err(|_| LoanError::Storage {
        message: "repository lock poisoned".to_string(),
    })
}

impl LoanRepository for InMemoryRepository {
    fn insert_user(&self, user: UserRecord) -> Result<()> {
        let mut users = write(&self.users)?;
        if users.contains_key(&user.id) {
            return Err(LoanError::Storage {
                message: format!("duplicate user id {}", user.id),
            });
        }
        users.insert(user.id, user);
        Ok(())
    }

    fn find_user_by_id(&self, id: UserId) -> Result<UserRecord> {
        read(&self.users)?
            .get(&id)
            .cloned()
            .ok_or(LoanError::UserNotFound { id })
    }

    fn insert_loan(&self, loan: LoanRecord) -> Result<()> {
        let mut loans = write(&self.loans)?;
        if loans.contains_key(&loan.id) {
            return Err(LoanError::Storage {
                message: format!("duplicate loan id {}", loan.id),
            });
        }
        loans.insert(loan.id, loan);
        Ok(())
    }

    fn find_loan_by_id(&self, id: LoanId) -> Result<LoanRecord> {
        read(&self.loans)?
            .get(&id)
            .cloned()
            .ok_or(LoanError::LoanNotFound { id })
    }

    fn loans_for_user(&self, user_id: UserId) -> Result<Vec<LoanRecord>> {
        let mut loans: Vec<LoanRecord> = read(&self.loans)?
            .values()
            .filter(|loan| loan.is_owned_by(user_id))
            .cloned()
            .collect();
        loans.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(loans)
    }

    fn add_owner(&self, loan_id: LoanId, user_id: UserId) -> Result<bool> {
        // check and insert under one write lock
        let mut loans = write(&self.loans)?;
        let loan = loans
            .get_mut(&loan_id)
            .ok_or(LoanError::LoanNotFound { id: loan_id })?;
        Ok(loan.owner_ids.insert(user_id))
    }
}
