//! Interactive edge picker.
//!
//! This is intentionally kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the picker lets the user place window edges on a line-oriented prompt
//!
//! The picker only produces `SelectionEvent`s; the selection itself is the
//! pure state machine in `domain::selection`.
//!
//! Prompt grammar, one line per event:
//! - a number places (or moves) the edge being edited
//! - an empty line accepts it
//! - `q` or end of input cancels

use std::io::{self, BufRead, Write};

use crate::domain::{SelectionEvent, SelectionState};
use crate::error::{AppError, Result};

/// Inclusive range of values an edge may take.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeBounds {
    pub min: f64,
    pub max: f64,
}

impl EdgeBounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Index bounds `[0, len-1]`.
    pub fn indices(len: usize) -> Self {
        Self::new(0.0, len.saturating_sub(1) as f64)
    }

    pub fn contains(&self, v: f64) -> bool {
        (self.min..=self.max).contains(&v)
    }
}

/// Something that yields selection events, blocking until one is available.
pub trait EdgeSource {
    fn next_event(&mut self, state: &SelectionState, bounds: EdgeBounds) -> Result<SelectionEvent>;

    /// Show context before a selection starts.
    fn announce(&mut self, _message: &str) -> Result<()> {
        Ok(())
    }
}

/// Line-oriented picker over any reader/writer pair.
pub struct PromptEdgeSource<R, W> {
    input: R,
    output: W,
}

impl PromptEdgeSource<io::StdinLock<'static>, io::Stderr> {
    /// Picker bound to the process terminal. Prompts go to stderr so stdout
    /// stays clean for reports.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> PromptEdgeSource<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn say(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{text}").map_err(|e| AppError::io("<prompt>", e))
    }
}

impl<R: BufRead, W: Write> EdgeSource for PromptEdgeSource<R, W> {
    fn announce(&mut self, message: &str) -> Result<()> {
        self.say(message)
    }

    fn next_event(&mut self, state: &SelectionState, bounds: EdgeBounds) -> Result<SelectionEvent> {
        let Some(edge) = state.awaiting() else {
            return Ok(SelectionEvent::Confirm);
        };
        let pending = match *state {
            SelectionState::AwaitingLeft { left } => left,
            SelectionState::AwaitingRight { right, .. } => right,
            _ => None,
        };

        loop {
            let prompt = match pending {
                Some(v) => format!("{edge} edge = {v} (Enter to accept, number to move, q to cancel): "),
                None => format!("{edge} edge [{}, {}] (q to cancel): ", bounds.min, bounds.max),
            };
            write!(self.output, "{prompt}")
                .and_then(|_| self.output.flush())
                .map_err(|e| AppError::io("<prompt>", e))?;

            let mut line = String::new();
            let bytes = self
                .input
                .read_line(&mut line)
                .map_err(|e| AppError::io("<stdin>", e))?;
            if bytes == 0 {
                self.say("")?;
                return Ok(SelectionEvent::Cancel);
            }

            let line = line.trim();
            if line.is_empty() {
                if pending.is_none() {
                    self.say("No edge placed yet.")?;
                    continue;
                }
                return Ok(SelectionEvent::Confirm);
            }
            if line.eq_ignore_ascii_case("q") {
                return Ok(SelectionEvent::Cancel);
            }

            match line.parse::<f64>() {
                Ok(v) if v.is_finite() && bounds.contains(v) => return Ok(SelectionEvent::Pick(v)),
                Ok(v) => self.say(&format!("{v} is outside [{}, {}].", bounds.min, bounds.max))?,
                Err(_) => self.say(&format!("Not a number: {line}"))?,
            }
        }
    }
}

/// Replays a fixed list of events; used for scripted runs and tests.
#[derive(Debug, Clone, Default)]
pub struct ScriptedEdgeSource {
    events: std::collections::VecDeque<SelectionEvent>,
}

impl ScriptedEdgeSource {
    pub fn new(events: impl IntoIterator<Item = SelectionEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }

    /// Events that pick and confirm each `(left, right)` pair in turn.
    pub fn from_edges(pairs: &[(f64, f64)]) -> Self {
        Self::new(pairs.iter().flat_map(|&(l, r)| {
            [
                SelectionEvent::Pick(l),
                SelectionEvent::Confirm,
                SelectionEvent::Pick(r),
                SelectionEvent::Confirm,
            ]
        }))
    }
}

impl EdgeSource for ScriptedEdgeSource {
    fn next_event(&mut self, _state: &SelectionState, _bounds: EdgeBounds) -> Result<SelectionEvent> {
        Ok(self.events.pop_front().unwrap_or(SelectionEvent::Cancel))
    }
}

/// Run one selection to completion and return its sorted edges.
///
/// A cancelled selection is an `InvalidSelection` error, so callers abort
/// before writing anything.
pub fn collect_selection<S: EdgeSource + ?Sized>(
    source: &mut S,
    label: &str,
    bounds: EdgeBounds,
) -> Result<(f64, f64)> {
    source.announce(&format!("Select {label}: left edge, then right edge."))?;
    let mut state = SelectionState::new();
    while !state.is_terminal() {
        let event = source.next_event(&state, bounds)?;
        state = state.next(event);
    }

    state.edges().ok_or_else(|| AppError::InvalidSelection(format!("{label}: selection cancelled")))
}

/// Collect `count` selections in a row.
pub fn collect_selections<S: EdgeSource + ?Sized>(
    source: &mut S,
    label: &str,
    bounds: EdgeBounds,
    count: usize,
) -> Result<Vec<(f64, f64)>> {
    (1..=count)
        .map(|i| collect_selection(source, &format!("{label} {i}/{count}"), bounds))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn prompt(input: &str) -> PromptEdgeSource<Cursor<Vec<u8>>, Vec<u8>> {
        PromptEdgeSource::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn typed_edges_are_confirmed_and_sorted() {
        let mut src = prompt("7\n\n2\n\n");
        let edges = collect_selection(&mut src, "window", EdgeBounds::indices(10)).unwrap();
        assert_eq!(edges, (2.0, 7.0));
    }

    #[test]
    fn edges_can_be_moved_before_accepting() {
        let mut src = prompt("1\n4\n\n9\n8\n\n");
        let edges = collect_selection(&mut src, "window", EdgeBounds::indices(10)).unwrap();
        assert_eq!(edges, (4.0, 8.0));
    }

    #[test]
    fn out_of_range_and_garbage_are_reprompted() {
        let mut src = prompt("42\nabc\n\n3\n\n5\n\n");
        let edges = collect_selection(&mut src, "window", EdgeBounds::indices(10)).unwrap();
        assert_eq!(edges, (3.0, 5.0));
        let transcript = String::from_utf8(src.output).unwrap();
        assert!(transcript.contains("42 is outside [0, 9]"), "{transcript}");
        assert!(transcript.contains("Not a number: abc"));
        assert!(transcript.contains("No edge placed yet."));
    }

    #[test]
    fn quit_and_eof_cancel() {
        let mut src = prompt("3\n\nq\n");
        let err = collect_selection(&mut src, "window", EdgeBounds::indices(10)).unwrap_err();
        assert!(matches!(err, AppError::InvalidSelection(_)));

        let mut src = prompt("3\n");
        assert!(collect_selection(&mut src, "window", EdgeBounds::indices(10)).is_err());
    }

    #[test]
    fn scripted_source_feeds_several_windows() {
        let mut src = ScriptedEdgeSource::from_edges(&[(7.0, 3.0), (0.0, 1.0)]);
        let windows = collect_selections(&mut src, "window", EdgeBounds::indices(10), 2).unwrap();
        assert_eq!(windows, vec![(3.0, 7.0), (0.0, 1.0)]);
        // Exhausted script cancels.
        assert!(collect_selection(&mut src, "extra", EdgeBounds::indices(10)).is_err());
    }
}
