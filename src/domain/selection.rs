//! Edge selection as an explicit state machine.
//!
//! A selection is built from a stream of events coming from whatever front end
//! the user interacts with (a terminal prompt, a scripted list of edges, ...):
//!
//! ```text
//! AwaitingLeft --Pick--> AwaitingLeft (edge replaced)
//! AwaitingLeft --Confirm [left set]--> AwaitingRight
//! AwaitingRight --Pick--> AwaitingRight (edge replaced)
//! AwaitingRight --Confirm [right set]--> Confirmed
//! any non-terminal --Cancel--> Cancelled
//! ```
//!
//! Transitions are pure: the state is consumed and a new one returned. The
//! pipeline only ever sees the edges of a `Confirmed` selection.

/// Input events driving a selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionEvent {
    /// Place (or move) the edge currently being edited.
    Pick(f64),
    /// Accept the edge currently being edited.
    Confirm,
    /// Abandon the whole selection.
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionState {
    AwaitingLeft { left: Option<f64> },
    AwaitingRight { left: f64, right: Option<f64> },
    Confirmed { left: f64, right: f64 },
    Cancelled,
}

impl Default for SelectionState {
    fn default() -> Self {
        SelectionState::AwaitingLeft { left: None }
    }
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event. Terminal states absorb every event.
    pub fn next(self, event: SelectionEvent) -> Self {
        use SelectionEvent::*;
        use SelectionState::*;

        match (self, event) {
            (Confirmed { .. } | Cancelled, _) => self,
            (_, Cancel) => Cancelled,
            (AwaitingLeft { .. }, Pick(x)) => AwaitingLeft { left: Some(x) },
            (AwaitingLeft { left: Some(left) }, Confirm) => AwaitingRight { left, right: None },
            (AwaitingLeft { left: None }, Confirm) => self,
            (AwaitingRight { left, .. }, Pick(x)) => AwaitingRight {
                left,
                right: Some(x),
            },
            (AwaitingRight { left, right: Some(right) }, Confirm) => Confirmed { left, right },
            (AwaitingRight { right: None, .. }, Confirm) => self,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SelectionState::Confirmed { .. } | SelectionState::Cancelled)
    }

    /// Edges of a confirmed selection, sorted ascending.
    pub fn edges(&self) -> Option<(f64, f64)> {
        match *self {
            SelectionState::Confirmed { left, right } => Some((left.min(right), left.max(right))),
            _ => None,
        }
    }

    /// Short label of the edge awaiting input, for prompts.
    pub fn awaiting(&self) -> Option<&'static str> {
        match self {
            SelectionState::AwaitingLeft { .. } => Some("left"),
            SelectionState::AwaitingRight { .. } => Some("right"),
            _ => None,
        }
    }
}
