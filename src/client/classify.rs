//! Sorting per-entity error codes into the ones that abort a call and the ones that are reported
//! inline.

use tracing::error;

use crate::client::error::{Error, ProtocolError, RequestContext, Result};

/// What to do with the error code of a topic or partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// No error.
    Ok,

    /// Record the error on the entity and carry on.
    Attached(ProtocolError),

    /// Abort the whole call.
    Fatal(ProtocolError),
}

pub fn classify(error: Option<ProtocolError>) -> Classification {
    match error {
        None => Classification::Ok,
        Some(e) if e.is_authorization() => Classification::Fatal(e),
        Some(e) => Classification::Attached(e),
    }
}

impl Classification {
    /// The error to attach to the entity, or the call-level error for `Fatal`.
    pub fn attach_or_abort<F>(self, context: F) -> Result<Option<ProtocolError>>
    where
        F: FnOnce() -> RequestContext,
    {
        match self {
            Self::Ok => Ok(None),
            Self::Attached(e) => Ok(Some(e)),
            Self::Fatal(protocol_error) => {
                let request = context();
                error!(
                    %request,
                    code = protocol_error.code(),
                    e = %protocol_error,
                    "Not authorized, aborting",
                );
                Err(Error::Authorization {
                    protocol_error,
                    request,
                })
            }
        }
    }
}
