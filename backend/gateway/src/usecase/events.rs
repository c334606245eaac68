/// Session changes published by the gateway. `LoginRequired` is the signal to
/// send the user back to `/admin/login`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    LoggedIn,
    Refreshed,
    LoginRequired,
    LoggedOut,
}
