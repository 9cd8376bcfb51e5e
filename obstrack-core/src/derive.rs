//! Suy diễn số ngày quá hạn, nhóm tuổi và trạng thái hiển thị.
//!
//! Các hàm ở đây thuần túy: cùng đầu vào luôn cho cùng đầu ra, không có
//! hiệu ứng phụ, để dashboard và tracker dùng chung một nguồn quy tắc.

use chrono::NaiveDate;

use crate::model::{AgingBucket, Observation, PortalStatus, Status};

/// Số ngày quá hạn tính theo ngày trọn vẹn, không bao giờ âm.
pub fn days_overdue(due: Option<NaiveDate>, today: NaiveDate) -> i64 {
    match due {
        Some(due) => (today - due).num_days().max(0),
        None => 0,
    }
}

/// Xếp số ngày quá hạn vào nhóm tuổi cố định.
pub fn aging_bucket(days: i64) -> AgingBucket {
    if days <= 0 {
        AgingBucket::NotDue
    } else if days <= 180 {
        AgingBucket::UpToSixMonths
    } else if days <= 365 {
        AgingBucket::SixMonthsToYear
    } else if days <= 730 {
        AgingBucket::OneToTwoYears
    } else {
        AgingBucket::AboveTwoYears
    }
}

/// Trạng thái chỉ đọc cho dashboard phía đơn vị: đã đóng thì Completed,
/// quá hạn chót thì Overdue, còn lại (kể cả chưa có hạn chót) là Pending.
pub fn derive_portal_status(
    status: Status,
    due: Option<NaiveDate>,
    today: NaiveDate,
) -> PortalStatus {
    if status == Status::Closed {
        return PortalStatus::Completed;
    }
    match due {
        Some(due) if due < today => PortalStatus::Overdue,
        _ => PortalStatus::Pending,
    }
}

/// Cập nhật lại các trường dẫn xuất trên bản ghi. Quan sát đã đóng luôn
/// giữ nhóm tuổi NotDue bất kể hạn chót.
pub fn recompute_derived(obs: &Observation, today: NaiveDate) -> Observation {
    let mut next = obs.clone();
    next.days_overdue = days_overdue(obs.due_date, today);
    next.aging = if obs.status == Status::Closed {
        AgingBucket::NotDue
    } else {
        aging_bucket(next.days_overdue)
    };
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn days_overdue_is_never_negative() {
        let today = date(2024, 7, 1);
        assert_eq!(days_overdue(Some(date(2024, 7, 2)), today), 0);
        assert_eq!(days_overdue(Some(date(2024, 7, 1)), today), 0);
        assert_eq!(days_overdue(Some(date(2024, 6, 30)), today), 1);
        assert_eq!(days_overdue(None, today), 0);
    }

    #[test]
    fn aging_bucket_boundaries() {
        assert_eq!(aging_bucket(-5), AgingBucket::NotDue);
        assert_eq!(aging_bucket(0), AgingBucket::NotDue);
        assert_eq!(aging_bucket(1), AgingBucket::UpToSixMonths);
        assert_eq!(aging_bucket(180), AgingBucket::UpToSixMonths);
        assert_eq!(aging_bucket(181), AgingBucket::SixMonthsToYear);
        assert_eq!(aging_bucket(365), AgingBucket::SixMonthsToYear);
        assert_eq!(aging_bucket(366), AgingBucket::OneToTwoYears);
        assert_eq!(aging_bucket(730), AgingBucket::OneToTwoYears);
        assert_eq!(aging_bucket(731), AgingBucket::AboveTwoYears);
    }

    #[test]
    fn overdue_observation_mid_year_lands_in_six_months_to_year() {
        // Hạn chót 2024-01-01, đánh giá ngày 2024-07-01: 182 ngày trễ.
        let days = days_overdue(Some(date(2024, 1, 1)), date(2024, 7, 1));
        assert_eq!(days, 182);
        assert_eq!(aging_bucket(days), AgingBucket::SixMonthsToYear);
    }

    #[test]
    fn portal_status_derivation() {
        let today = date(2024, 7, 1);
        assert_eq!(
            derive_portal_status(Status::Closed, Some(date(2020, 1, 1)), today),
            PortalStatus::Completed
        );
        assert_eq!(
            derive_portal_status(Status::InProgress, Some(date(2024, 6, 30)), today),
            PortalStatus::Overdue
        );
        assert_eq!(
            derive_portal_status(Status::InProgress, Some(date(2024, 7, 1)), today),
            PortalStatus::Pending
        );
        assert_eq!(
            derive_portal_status(Status::Overdue, None, today),
            PortalStatus::Pending
        );
    }

    #[test]
    fn recompute_keeps_closed_aging_at_not_due() {
        let obs = Observation {
            status: Status::Closed,
            due_date: Some(date(2021, 1, 1)),
            ..Observation::default()
        };
        let next = recompute_derived(&obs, date(2024, 7, 1));
        assert!(next.days_overdue > 730);
        assert_eq!(next.aging, AgingBucket::NotDue);
    }
}
