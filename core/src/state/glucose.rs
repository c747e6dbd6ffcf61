//! Cached glucose readings and stats for the dashboard and history screens.

use uuid::Uuid;

use crate::types::{GlucoseLog, GlucoseLogList, GlucoseStats};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlucoseState {
    /// Newest first, as the API lists them.
    pub logs: Vec<GlucoseLog>,
    pub total_count: u64,
    pub page: u32,
    pub has_next: bool,
    pub stats: Option<GlucoseStats>,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GlucoseAction {
    FetchStart,
    /// A page of results. Page 1 replaces the list; later pages append.
    FetchSuccess(GlucoseLogList),
    FetchFailure(String),
    LogAdded(GlucoseLog),
    LogRemoved(Uuid),
    StatsLoaded(GlucoseStats),
}

pub fn reduce(state: &GlucoseState, action: GlucoseAction) -> GlucoseState {
    match action {
        GlucoseAction::FetchStart => GlucoseState {
            is_loading: true,
            error: None,
            ..state.clone()
        },
        GlucoseAction::FetchSuccess(list) => {
            let logs = if list.page <= 1 {
                list.logs
            } else {
                let mut logs = state.logs.clone();
                logs.extend(list.logs.into_iter().filter(|l| !state.logs.iter().any(|s| s.id == l.id)));
                logs
            };
            GlucoseState {
                logs,
                total_count: list.total_count,
                page: list.page,
                has_next: list.has_next,
                is_loading: false,
                error: None,
                ..state.clone()
            }
        }
        GlucoseAction::FetchFailure(error) => GlucoseState {
            is_loading: false,
            error: Some(error),
            ..state.clone()
        },
        GlucoseAction::LogAdded(log) => {
            let mut logs = Vec::with_capacity(state.logs.len() + 1);
            logs.push(log);
            logs.extend(state.logs.iter().cloned());
            GlucoseState {
                logs,
                total_count: state.total_count + 1,
                ..state.clone()
            }
        }
        GlucoseAction::LogRemoved(id) => {
            let logs: Vec<GlucoseLog> = state.logs.iter().filter(|l| l.id != id).cloned().collect();
            let removed = (state.logs.len() - logs.len()) as u64;
            GlucoseState {
                logs,
                total_count: state.total_count.saturating_sub(removed),
                ..state.clone()
            }
        }
        GlucoseAction::StatsLoaded(stats) => GlucoseState {
            stats: Some(stats),
            ..state.clone()
        },
    }
}
