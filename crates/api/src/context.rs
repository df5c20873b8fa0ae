use yatube_auth::Caller;

/// Per-request context available to every route handler.
///
/// Built by the auth middleware; anonymous unless a valid bearer token was sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    caller: Caller,
}

impl RequestContext {
    pub fn new(caller: Caller) -> Self {
        Self { caller }
    }

    pub fn caller(&self) -> &Caller {
        &self.caller
    }
}
