use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("Artifact '{name}' was generated twice with different contents")]
    DuplicateArtifact { name: String },
}
