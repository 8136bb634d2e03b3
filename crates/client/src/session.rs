//! Sessions

use std::fmt;

/// Progress of the one-time merge of the anonymous cart into the server cart.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum MergeState {
    /// No merge has run for this session yet.
    #[default]
    NotMerged,

    /// A merge is in flight.
    Merging,

    /// The anonymous cart has been merged.
    Merged,
}

/// The signed in state of the client. Login and logout both reset the merge state.
#[derive(Default, Clone)]
pub struct Session {
    access_token: Option<String>,
    merge_state: MergeState,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .field("merge_state", &self.merge_state)
            .finish()
    }
}

impl Session {
    /// A session with no credentials.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Store the access token for later requests.
    pub fn login(&mut self, access_token: impl Into<String>) {
        self.access_token = Some(access_token.into());
        self.merge_state = MergeState::NotMerged;
    }

    /// Drop the access token.
    pub fn logout(&mut self) {
        self.access_token = None;
        self.merge_state = MergeState::NotMerged;
    }

    /// Whether an access token is held.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// The bearer token, if signed in.
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Where this session is in the login merge.
    pub fn merge_state(&self) -> MergeState {
        self.merge_state
    }

    /// Claim the merge for this session. False when anonymous or when a merge already ran or is
    /// running.
    pub(crate) fn begin_merge(&mut self) -> bool {
        if !self.is_authenticated() || self.merge_state != MergeState::NotMerged {
            return false;
        }

        self.merge_state = MergeState::Merging;

        true
    }

    pub(crate) fn complete_merge(&mut self) {
        self.merge_state = MergeState::Merged;
    }

    /// Release the claim so the merge can be retried.
    pub(crate) fn abort_merge(&mut self) {
        self.merge_state = MergeState::NotMerged;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_sessions_never_merge() {
        let mut session = Session::anonymous();

        assert!(!session.begin_merge());
        assert_eq!(session.merge_state(), MergeState::NotMerged);
    }

    #[test]
    fn merge_is_claimed_once_per_login() {
        let mut session = Session::anonymous();

        session.login("token");

        assert!(session.begin_merge());
        assert!(!session.begin_merge());

        session.complete_merge();

        assert!(!session.begin_merge());
        assert_eq!(session.merge_state(), MergeState::Merged);

        session.logout();
        session.login("token");

        assert_eq!(session.merge_state(), MergeState::NotMerged);
        assert!(session.begin_merge());
    }

    #[test]
    fn aborted_merge_can_be_retried() {
        let mut session = Session::anonymous();

        session.login("token");
        session.begin_merge();
        session.abort_merge();

        assert!(session.begin_merge());
    }

    #[test]
    fn debug_output_hides_the_token() {
        let mut session = Session::anonymous();

        session.login("secret-token");

        assert!(!format!("{session:?}").contains("secret-token"));
    }
}
