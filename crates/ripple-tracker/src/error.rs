use ripple_core::ObjectId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TrackError>;

#[derive(Debug, Error)]
pub enum TrackError {
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("invalid object type: {type_name} emits neither member-change nor membership-change notifications")]
    InvalidObjectType { type_name: &'static str },

    #[error("cycle detected: {type_name} at {object} is already being registered")]
    CycleDetected {
        object: ObjectId,
        type_name: &'static str,
    },
}

impl TrackError {
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failure() {
        let err = TrackError::invalid("no object to track");
        assert!(err.is_invalid_argument());
        assert_eq!(err.to_string(), "invalid argument: no object to track");

        let err = TrackError::InvalidObjectType { type_name: "Opaque" };
        assert!(!err.is_invalid_argument());
        assert!(err.to_string().contains("Opaque"));
    }
}
