use error_stack::Report;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, Report<RepoError>>;
pub type OptRepoResult<T> = Result<Option<T>, Report<RepoError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Profile,
    Community,
    Residence,
    Association,
    Visit,
    Announcement,
}

impl Display for Entity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Entity::Profile => "profile",
            Entity::Community => "community",
            Entity::Residence => "residence",
            Entity::Association => "residence association",
            Entity::Visit => "visit",
            Entity::Announcement => "announcement",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    Db,
    /// A uniqueness constraint rejected the write
    Duplicate,
    /// The write referenced a row that does not exist
    MissingReference,
}

#[derive(Debug, Clone, Copy, thiserror::Error)]
pub enum RepoError {
    #[error("failed to get {0}")]
    Get(Entity),
    #[error("failed to list {0}s")]
    List(Entity),
    #[error("failed to count {0}s")]
    Count(Entity),
    #[error("failed to create {0}")]
    Create(Entity, Reason),
    #[error("failed to update {0}")]
    Update(Entity, Reason),
    #[error("failed to delete {0}")]
    Delete(Entity),
}

impl RepoError {
    pub fn reason(&self) -> Option<Reason> {
        match self {
            RepoError::Create(_, reason) | RepoError::Update(_, reason) => Some(*reason),
            _ => None,
        }
    }

    pub fn is_duplicate(&self) -> bool {
        self.reason() == Some(Reason::Duplicate)
    }
}
