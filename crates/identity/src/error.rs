use thiserror::Error;

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Unauthorized")]
    Unauthenticated,
}
