//! Đọc tham số deep-link trên query string của trang dashboard.
//!
//! Email xác định phạm vi dữ liệu tải về; `dueDate`/`status` đặt sẵn bộ
//! lọc; `id` hoặc `observationId` trỏ thẳng tới một bản ghi cần mở.

use chrono::NaiveDate;
use url::form_urlencoded;

use obstrack_core::{DashboardFilter, PortalStatus};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeepLink {
    pub email: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub status: Option<PortalStatus>,
    pub record: Option<String>,
}

impl DeepLink {
    /// Phân tích phần query (có hoặc không dẫn đầu bằng `?`). Tham số lạ
    /// hoặc giá trị không đọc được thì bỏ qua, không báo lỗi.
    pub fn parse(query: &str) -> DeepLink {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut link = DeepLink::default();

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "email" => {
                    if !value.trim().is_empty() {
                        link.email = Some(value.trim().to_string());
                    }
                }
                "dueDate" => {
                    link.due_date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok();
                }
                "status" => {
                    link.status = PortalStatus::parse(value.trim());
                }
                "id" | "observationId" => {
                    if link.record.is_none() && !value.trim().is_empty() {
                        link.record = Some(value.trim().to_string());
                    }
                }
                _ => {}
            }
        }

        link
    }

    /// Bộ lọc khởi tạo từ deep-link.
    pub fn initial_filter(&self) -> DashboardFilter {
        DashboardFilter {
            due_date: self.due_date,
            status: self.status,
            ..DashboardFilter::default()
        }
    }
}
