use error_stack::Report;

pub type RepoResult<T> = Result<T, Report<RepoError>>;
pub type OptRepoResult<T> = Result<Option<T>, Report<RepoError>>;

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("failed to list records")]
    List,
    #[error("failed to find record")]
    Find,
    #[error("failed to insert record")]
    Insert,
    #[error("failed to replace record")]
    Replace,
    #[error("failed to delete record")]
    Delete,
}
