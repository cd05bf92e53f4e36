use std::fmt;
use std::sync::Arc;

use super::code::ErrorCode;
use crate::util::RequestId;

/// A chained error with human context, a closed-set code, and an optional
/// pointer at the request that was in flight when it occurred (§3, §7).
///
/// `next` forms an acyclic chain rooted at the deepest cause, mirroring
/// `extended_error.h`'s `next` pointer. `Arc` (always, regardless of the
/// `single-locality` feature) is used for the chain link specifically
/// because error chains are frequently cloned into monitoring events and
/// reply payloads without the cross-locality-send requirement that the rest
/// of the crate's `util::Rc` alias exists for; an `Arc` here costs nothing
/// extra since `ExtendedError` is already cloned rarely (error path, not hot
/// path).
#[derive(Debug, Clone)]
pub struct ExtendedError {
    context: Arc<str>,
    code: ErrorCode,
    next: Option<Arc<ExtendedError>>,
    offending_request: Option<RequestId>,
}

impl ExtendedError {
    /// Construct a root-cause error (no chain).
    pub fn new(context: impl Into<Arc<str>>, code: ErrorCode) -> Self {
        Self {
            context: context.into(),
            code,
            next: None,
            offending_request: None,
        }
    }

    /// Wrap `self` as the new head of the chain, with `cause` as the
    /// (possibly already-chained) next link.
    pub fn wrap(context: impl Into<Arc<str>>, code: ErrorCode, cause: ExtendedError) -> Self {
        Self {
            context: context.into(),
            code,
            next: Some(Arc::new(cause)),
            offending_request: None,
        }
    }

    pub fn with_offending_request(mut self, request_id: RequestId) -> Self {
        self.offending_request = Some(request_id);
        self
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn offending_request(&self) -> Option<RequestId> {
        self.offending_request
    }

    pub fn next(&self) -> Option<&ExtendedError> {
        self.next.as_deref()
    }

    /// Walks the chain from this error down to the root cause.
    pub fn chain(&self) -> impl Iterator<Item = &ExtendedError> {
        std::iter::successors(Some(self), |e| e.next())
    }

    /// The deepest cause in the chain (root).
    pub fn root_cause(&self) -> &ExtendedError {
        self.chain().last().unwrap_or(self)
    }

    /// True if any link in the chain carries `code`.
    pub fn has_code(&self, code: ErrorCode) -> bool {
        self.chain().any(|e| e.code == code)
    }
}

impl fmt::Display for ExtendedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.context, self.code)?;
        if let Some(next) = &self.next {
            write!(f, " <- {next}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ExtendedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.next.as_deref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}
