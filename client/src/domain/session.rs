//! Combined session state observed by the UI.

use super::{Identity, Profile};

/// Who is signed in and what their profile currently says.
///
/// ## Invariants
/// - `profile` is `None` whenever `identity` is `None`.
/// - `ready` is `false` until the first auth event, and again while the
///   profile of a freshly announced identity is being fetched.
///
/// Each emitted view replaces every earlier one; consumers never merge.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionView {
    identity: Option<Identity>,
    profile: Option<Profile>,
    ready: bool,
}

impl SessionView {
    /// State before the auth stream has reported anything.
    pub fn initial() -> Self {
        Self::default()
    }

    /// Confirmed signed-out state.
    pub fn signed_out() -> Self {
        Self {
            identity: None,
            profile: None,
            ready: true,
        }
    }

    /// Identity announced, profile not yet observed.
    pub fn awaiting_profile(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
            profile: None,
            ready: false,
        }
    }

    /// Identity with its observed profile, or confirmed absence.
    pub fn ready(identity: Identity, profile: Option<Profile>) -> Self {
        Self {
            identity: Some(identity),
            profile,
            ready: true,
        }
    }

    /// Signed-in principal, if any.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Profile of the signed-in principal, if observed and present.
    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    /// Whether consumers may branch on `identity`.
    pub fn is_ready(&self) -> bool {
        self.ready
    }
}

/// Top-level screen flow selected from a [`SessionView`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppFlow {
    /// Show a loading indicator; do not branch on identity yet.
    Loading,
    /// Login and registration screens.
    SignedOut,
    /// Search, watched movies and profile tabs.
    SignedIn,
}

impl From<&SessionView> for AppFlow {
    fn from(view: &SessionView) -> Self {
        match (view.is_ready(), view.identity()) {
            (false, _) => Self::Loading,
            (true, None) => Self::SignedOut,
            (true, Some(_)) => Self::SignedIn,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::UserId;
    use rstest::rstest;

    fn identity() -> Identity {
        Identity::new(UserId::new("u1").expect("id"))
    }

    #[rstest]
    fn initial_view_is_not_ready() {
        let view = SessionView::initial();
        assert!(view.identity().is_none());
        assert!(view.profile().is_none());
        assert!(!view.is_ready());
    }

    #[rstest]
    fn awaiting_profile_carries_no_profile() {
        let identity = identity();
        let view = SessionView::awaiting_profile(identity.clone());
        assert_eq!(view.identity(), Some(&identity));
        assert!(view.profile().is_none());
        assert!(!view.is_ready());
    }

    #[rstest]
    #[case(SessionView::initial(), AppFlow::Loading)]
    #[case(SessionView::signed_out(), AppFlow::SignedOut)]
    #[case(SessionView::awaiting_profile(identity()), AppFlow::Loading)]
    #[case(SessionView::ready(identity(), None), AppFlow::SignedIn)]
    fn app_flow_follows_readiness(#[case] view: SessionView, #[case] expected: AppFlow) {
        assert_eq!(AppFlow::from(&view), expected);
    }
}
