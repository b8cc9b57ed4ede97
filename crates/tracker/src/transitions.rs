//! Status transitions driven by toggling a watched season.
//!
//! Rules are data, evaluated top to bottom against the status as it evolves.
//! A rule marked `settles` ends evaluation once it fires, so at most one
//! completion or regression rule applies per toggle.

use watchlog_core::types::WatchStatus;

/// What the toggle did to the season set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeasonEvent {
    Added,
    Removed,
}

/// Watched season count after the toggle, relative to the show's total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// No seasons watched.
    Empty,
    /// Some seasons watched, total unknown or not yet reached.
    Partial,
    /// Watched count equals the supplied total.
    All,
}

impl Progress {
    pub fn of(watched: usize, total: Option<u32>) -> Self {
        if watched == 0 {
            Self::Empty
        } else if total.is_some_and(|t| watched == t as usize) {
            Self::All
        } else {
            Self::Partial
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateAction {
    Keep,
    /// Stamp `dateCompleted` with the server clock.
    Stamp,
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventMatch {
    Any,
    Is(SeasonEvent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusMatch {
    Is(WatchStatus),
    Not(WatchStatus),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressMatch {
    Empty,
    NonEmpty,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub name: &'static str,
    pub event: EventMatch,
    pub from: StatusMatch,
    pub progress: ProgressMatch,
    pub to: WatchStatus,
    pub date: DateAction,
    pub settles: bool,
}

impl Transition {
    fn matches(&self, event: SeasonEvent, status: WatchStatus, progress: Progress) -> bool {
        let event_ok = match self.event {
            EventMatch::Any => true,
            EventMatch::Is(e) => e == event,
        };
        let status_ok = match self.from {
            StatusMatch::Is(s) => s == status,
            StatusMatch::Not(s) => s != status,
        };
        let progress_ok = match self.progress {
            ProgressMatch::Empty => progress == Progress::Empty,
            ProgressMatch::NonEmpty => progress != Progress::Empty,
            ProgressMatch::All => progress == Progress::All,
        };
        event_ok && status_ok && progress_ok
    }
}

pub const SEASON_TRANSITIONS: [Transition; 4] = [
    Transition {
        name: "start_watching",
        event: EventMatch::Any,
        from: StatusMatch::Is(WatchStatus::PlanToWatch),
        progress: ProgressMatch::NonEmpty,
        to: WatchStatus::Watching,
        date: DateAction::Keep,
        settles: false,
    },
    Transition {
        name: "regress_to_plan",
        event: EventMatch::Is(SeasonEvent::Removed),
        from: StatusMatch::Is(WatchStatus::Completed),
        progress: ProgressMatch::Empty,
        to: WatchStatus::PlanToWatch,
        date: DateAction::Clear,
        settles: true,
    },
    Transition {
        name: "regress_to_watching",
        event: EventMatch::Is(SeasonEvent::Removed),
        from: StatusMatch::Is(WatchStatus::Completed),
        progress: ProgressMatch::NonEmpty,
        to: WatchStatus::Watching,
        date: DateAction::Clear,
        settles: true,
    },
    Transition {
        name: "complete",
        event: EventMatch::Any,
        from: StatusMatch::Not(WatchStatus::Completed),
        progress: ProgressMatch::All,
        to: WatchStatus::Completed,
        date: DateAction::Stamp,
        settles: true,
    },
];

/// Result of running the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub status: WatchStatus,
    pub date: DateAction,
    pub fired: Vec<&'static str>,
}

pub fn resolve(
    table: &[Transition],
    status: WatchStatus,
    event: SeasonEvent,
    progress: Progress,
) -> Resolution {
    let mut resolution = Resolution {
        status,
        date: DateAction::Keep,
        fired: Vec::new(),
    };

    for rule in table {
        if !rule.matches(event, resolution.status, progress) {
            continue;
        }
        resolution.status = rule.to;
        if rule.date != DateAction::Keep {
            resolution.date = rule.date;
        }
        resolution.fired.push(rule.name);
        if rule.settles {
            break;
        }
    }

    resolution
}
