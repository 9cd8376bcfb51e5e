//! Bộ lọc quan sát cho dashboard phía đơn vị và tracker nội bộ.
//!
//! Mọi điều kiện đều là giao (AND); điều kiện để trống nghĩa là không
//! ràng buộc. Lọc không đổi thứ tự phần tử đầu vào.

use chrono::NaiveDate;

use crate::derive::derive_portal_status;
use crate::model::{Observation, PortalStatus, RiskRating, Status};

/// Bộ lọc dashboard: hạn chót, trạng thái hiển thị, tên đợt kiểm toán
/// và ô tìm kiếm tự do.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardFilter {
    pub due_date: Option<NaiveDate>,
    pub status: Option<PortalStatus>,
    pub audit: Option<String>,
    pub search: String,
}

impl DashboardFilter {
    pub fn is_empty(&self) -> bool {
        self.due_date.is_none()
            && self.status.is_none()
            && self.audit.is_none()
            && self.search.trim().is_empty()
    }

    /// Một bản ghi khớp khi thoả tất cả điều kiện đang đặt. Trạng thái
    /// so theo trạng thái hiển thị suy diễn tại `today`, không phải
    /// trạng thái lưu trữ.
    pub fn matches(&self, obs: &Observation, today: NaiveDate) -> bool {
        if let Some(due) = self.due_date {
            if obs.due_date != Some(due) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if derive_portal_status(obs.status, obs.due_date, today) != status {
                return false;
            }
        }
        if let Some(audit) = &self.audit {
            if !obs.audit_name.eq_ignore_ascii_case(audit) {
                return false;
            }
        }
        let needle = self.search.trim().to_lowercase();
        if !needle.is_empty() {
            let reference = obs.reference.as_deref().unwrap_or("");
            let haystacks = [
                reference,
                obs.observation.as_str(),
                obs.audit_name.as_str(),
                obs.person_responsible.as_str(),
            ];
            if !haystacks
                .iter()
                .any(|text| text.to_lowercase().contains(&needle))
            {
                return false;
            }
        }
        true
    }

    pub fn apply<'a>(&self, items: &'a [Observation], today: NaiveDate) -> Vec<&'a Observation> {
        items.iter().filter(|obs| self.matches(obs, today)).collect()
    }
}

/// Bộ lọc tracker nội bộ: tìm kiếm tự do cộng so khớp bằng trên năm,
/// trạng thái lưu trữ và mức rủi ro.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackerFilter {
    pub search: String,
    pub year: Option<i32>,
    pub status: Option<Status>,
    pub risk: Option<RiskRating>,
}

impl TrackerFilter {
    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty()
            && self.year.is_none()
            && self.status.is_none()
            && self.risk.is_none()
    }

    pub fn matches(&self, obs: &Observation) -> bool {
        if let Some(year) = self.year {
            if obs.year != Some(year) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if obs.status != status {
                return false;
            }
        }
        if let Some(risk) = self.risk {
            if obs.risk_rating != risk {
                return false;
            }
        }
        let needle = self.search.trim().to_lowercase();
        if !needle.is_empty() {
            let haystacks = [
                &obs.observation,
                &obs.audit_name,
                &obs.department_responsible,
                &obs.person_responsible,
            ];
            if !haystacks
                .iter()
                .any(|text| text.to_lowercase().contains(&needle))
            {
                return false;
            }
        }
        true
    }

    pub fn apply<'a>(&self, items: &'a [Observation]) -> Vec<&'a Observation> {
        items.iter().filter(|obs| self.matches(obs)).collect()
    }
}
