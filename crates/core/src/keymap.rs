//! Key contract of the input box.

/// What pressing Enter in the input box does.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnterAction {
    /// Submit the draft. The newline is not inserted.
    Submit,
    /// Insert a literal newline into the draft.
    InsertNewline,
}

/// Decides what Enter does, given whether the newline modifier is held.
#[inline]
pub fn enter_action(modifier_held: bool) -> EnterAction {
    if modifier_held {
        EnterAction::InsertNewline
    } else {
        EnterAction::Submit
    }
}
