use std::io;

#[derive(thiserror::Error, Debug)]
pub enum KVListError {
    #[error("{0}")]
    IOError(#[from] io::Error),

    #[error("invalid options: {0}")]
    InvalidOptions(String),

    #[error("corrupted list file: {0}")]
    Corrupted(String),

    #[error("{0}")]
    Custom(String),
}

impl PartialEq for KVListError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::IOError(_), Self::IOError(_)) => true,
            (Self::InvalidOptions(s1), Self::InvalidOptions(s2))
            | (Self::Corrupted(s1), Self::Corrupted(s2))
            | (Self::Custom(s1), Self::Custom(s2)) => s1.eq(s2),
            _ => false,
        }
    }
}
