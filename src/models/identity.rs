//! Caller identity passed into every service call

use uuid::Uuid;

use crate::error::{AppError, AppResult};

use super::user::Role;

/// Who is calling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    Anonymous,
    Authenticated { user_id: Uuid, role: Role },
}

impl Identity {
    pub fn authenticated(user_id: Uuid, role: Role) -> Self {
        Identity::Authenticated { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Identity::Authenticated { role: Role::Admin, .. })
    }

    /// Id of the authenticated caller
    pub fn require_user(&self) -> AppResult<Uuid> {
        match self {
            Identity::Authenticated { user_id, .. } => Ok(*user_id),
            Identity::Anonymous => Err(AppError::Authentication("Not authenticated".to_string())),
        }
    }

    /// Require admin privileges
    pub fn require_admin(&self) -> AppResult<Uuid> {
        let user_id = self.require_user()?;
        if self.is_admin() {
            Ok(user_id)
        } else {
            Err(AppError::Authorization("Admin access required".to_string()))
        }
    }
}
