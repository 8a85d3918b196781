use crate::FireId;
use std::{
    error::Error,
    fmt::{Display, Formatter},
};

/// Everything that can go wrong while querying fire power.
#[derive(Debug)]
pub enum FirePowerError {
    /// A database location could not be found in the arguments or the environment. The value is
    /// the name of the environment variable that was checked.
    MissingDataSource(&'static str),
    /// The fire does not exist, so its merge closure is empty.
    EmptyClosure(FireId),
    /// Break hours must be in the range 0 to 23.
    InvalidBreakHour(u32),
    /// A timestamp in the database could not be represented as a date and time.
    InvalidTimestamp(i64),
    /// Errors from the underlying data source are passed along unchanged.
    Database(rusqlite::Error),
}

/// Result type used throughout the crate.
pub type FirePowerResult<T> = Result<T, FirePowerError>;

impl Display for FirePowerError {
    fn fmt(&self, f: &mut Formatter) -> Result<(), std::fmt::Error> {
        use FirePowerError::*;

        match self {
            MissingDataSource(var) => write!(
                f,
                "missing database path, supply it directly or set the {} environment variable",
                var
            ),
            EmptyClosure(fire_id) => write!(f, "fire {} not found, empty merge closure", fire_id),
            InvalidBreakHour(hour) => write!(f, "break hour must be 0-23, got {}", hour),
            InvalidTimestamp(ts) => write!(f, "invalid unix timestamp {}", ts),
            Database(err) => write!(f, "database error: {}", err),
        }
    }
}

impl Error for FirePowerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FirePowerError::Database(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for FirePowerError {
    fn from(err: rusqlite::Error) -> Self {
        FirePowerError::Database(err)
    }
}
