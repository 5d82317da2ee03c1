use thiserror::Error;

use crate::signature::SignatureError;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChooseError {
    #[error("Too many choices provided: [{count}] given, must be [{max}] or fewer")]
    TooManyChoices { count: usize, max: usize },
    #[error("Could not sign the request")]
    Signature(#[from] SignatureError),
}
