use crate::data_access::LevelSet;
use serde::{Deserialize, Serialize};

/// A registered platform user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,

    pub name: String,

    /// Role classification, e.g. `Researcher` or `Curator`
    #[serde(default)]
    pub user_type: Option<String>,

    /// Access levels the user declares
    #[serde(default)]
    pub data_access: LevelSet,

    #[serde(default)]
    pub admin: bool,

    #[serde(default)]
    pub subadmin: bool,
}

impl User {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn admin(mut self) -> Self {
        self.admin = true;
        self
    }

    pub fn subadmin(mut self) -> Self {
        self.subadmin = true;
        self
    }
}

/// The caller of an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurrentUser {
    Anonymous,
    Authenticated(User),
}

impl CurrentUser {
    pub fn is_anonymous(&self) -> bool {
        matches!(self, CurrentUser::Anonymous)
    }

    pub fn is_authenticated(&self) -> bool {
        !self.is_anonymous()
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            CurrentUser::Anonymous => None,
            CurrentUser::Authenticated(user) => Some(user),
        }
    }

    pub fn id(&self) -> Option<u64> {
        self.user().map(|u| u.id)
    }

    pub fn is_admin(&self) -> bool {
        self.user().is_some_and(|u| u.admin)
    }

    pub fn is_subadmin(&self) -> bool {
        self.user().is_some_and(|u| u.subadmin)
    }
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        CurrentUser::Authenticated(user)
    }
}
