use std::sync::Arc;

use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusState {
    /// No window observed yet.
    Idle,
    Tracking {
        title: Arc<str>,
        start: NaiveDateTime,
    },
}

/// Interval of a window that just lost focus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedInterval {
    pub title: Arc<str>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Detects focus transitions between consecutive title observations.
#[derive(Debug)]
pub struct FocusTracker {
    state: FocusState,
}

impl Default for FocusTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl FocusTracker {
    pub fn new() -> Self {
        Self {
            state: FocusState::Idle,
        }
    }

    pub fn state(&self) -> &FocusState {
        &self.state
    }

    /// Feeds the title seen at `now`. When it differs from the tracked one, the previous interval
    /// is closed at `now` and tracking restarts with the new title.
    ///
    /// Nothing is returned for the very first window, and intervals of an empty title (nothing
    /// had focus) are dropped.
    pub fn observe(&mut self, title: &str, now: NaiveDateTime) -> Option<ClosedInterval> {
        if matches!(&self.state, FocusState::Tracking { title: current, .. } if &**current == title)
        {
            return None;
        }

        let previous = std::mem::replace(
            &mut self.state,
            FocusState::Tracking {
                title: title.into(),
                start: now,
            },
        );

        match previous {
            FocusState::Tracking { title, start } if !title.is_empty() => Some(ClosedInterval {
                title,
                start,
                end: now,
            }),
            FocusState::Tracking { .. } | FocusState::Idle => None,
        }
    }
}
