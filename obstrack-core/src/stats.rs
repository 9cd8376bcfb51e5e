//! Đếm nhanh theo trạng thái cho thẻ thống kê trên tracker và dashboard.

use chrono::NaiveDate;

use crate::derive::derive_portal_status;
use crate::model::{Observation, PortalStatus, Status};

/// Thống kê theo trạng thái lưu trữ (tracker nội bộ).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub total: usize,
    pub in_progress: usize,
    pub overdue: usize,
    pub closed: usize,
}

/// Thống kê theo trạng thái hiển thị suy diễn (dashboard phía đơn vị).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PortalCounts {
    pub total: usize,
    pub pending: usize,
    pub overdue: usize,
    pub completed: usize,
}

pub fn status_counts(items: &[Observation]) -> StatusCounts {
    let mut counts = StatusCounts {
        total: items.len(),
        ..StatusCounts::default()
    };
    for obs in items {
        match obs.status {
            Status::InProgress => counts.in_progress += 1,
            Status::Overdue => counts.overdue += 1,
            Status::Closed => counts.closed += 1,
        }
    }
    counts
}

pub fn portal_counts(items: &[Observation], today: NaiveDate) -> PortalCounts {
    let mut counts = PortalCounts {
        total: items.len(),
        ..PortalCounts::default()
    };
    for obs in items {
        match derive_portal_status(obs.status, obs.due_date, today) {
            PortalStatus::Pending => counts.pending += 1,
            PortalStatus::Overdue => counts.overdue += 1,
            PortalStatus::Completed => counts.completed += 1,
        }
    }
    counts
}
