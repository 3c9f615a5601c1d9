/// Host navigation service.
///
/// `navigate_to_main` hands control to the main screen and must leave the
/// splash out of the back history. The session calls it at most once.
pub trait Navigator {
    fn navigate_to_main(&mut self);
}
