//! Mô hình dữ liệu quan sát kiểm toán và các bảng mã dạng enum đóng.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Trạng thái lưu trữ của một quan sát.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    InProgress,
    Overdue,
    Closed,
}

impl Status {
    /// Mã số trên wire Dataverse.
    pub fn code(self) -> u8 {
        match self {
            Status::InProgress => 1,
            Status::Overdue => 2,
            Status::Closed => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Status> {
        match code {
            1 => Some(Status::InProgress),
            2 => Some(Status::Overdue),
            3 => Some(Status::Closed),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::InProgress => "In Progress",
            Status::Overdue => "Overdue",
            Status::Closed => "Closed",
        }
    }
}

/// Mức độ rủi ro của phát hiện kiểm toán.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RiskRating {
    Critical,
    High,
    Moderate,
    Low,
}

impl RiskRating {
    pub fn code(self) -> u8 {
        match self {
            RiskRating::Critical => 1,
            RiskRating::High => 2,
            RiskRating::Moderate => 3,
            RiskRating::Low => 4,
        }
    }

    pub fn from_code(code: u8) -> Option<RiskRating> {
        match code {
            1 => Some(RiskRating::Critical),
            2 => Some(RiskRating::High),
            3 => Some(RiskRating::Moderate),
            4 => Some(RiskRating::Low),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskRating::Critical => "Critical",
            RiskRating::High => "High",
            RiskRating::Moderate => "Moderate",
            RiskRating::Low => "Low",
        }
    }
}

/// Nhóm tuổi quá hạn, hàm bậc thang đơn điệu theo số ngày trễ.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AgingBucket {
    NotDue,
    UpToSixMonths,
    SixMonthsToYear,
    OneToTwoYears,
    AboveTwoYears,
}

impl AgingBucket {
    pub fn code(self) -> u8 {
        match self {
            AgingBucket::NotDue => 1,
            AgingBucket::UpToSixMonths => 2,
            AgingBucket::SixMonthsToYear => 3,
            AgingBucket::OneToTwoYears => 4,
            AgingBucket::AboveTwoYears => 5,
        }
    }

    pub fn from_code(code: u8) -> Option<AgingBucket> {
        match code {
            1 => Some(AgingBucket::NotDue),
            2 => Some(AgingBucket::UpToSixMonths),
            3 => Some(AgingBucket::SixMonthsToYear),
            4 => Some(AgingBucket::OneToTwoYears),
            5 => Some(AgingBucket::AboveTwoYears),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgingBucket::NotDue => "Not due",
            AgingBucket::UpToSixMonths => "0-6M",
            AgingBucket::SixMonthsToYear => "6M-1Y",
            AgingBucket::OneToTwoYears => "1Y-2Y",
            AgingBucket::AboveTwoYears => "Above 2Y",
        }
    }
}

/// Phân loại phát hiện: mới, lặp lại hay theo dõi tiếp.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ObservationType {
    New,
    Repeat,
    FollowUp,
}

impl ObservationType {
    pub fn as_wire(self) -> &'static str {
        match self {
            ObservationType::New => "New",
            ObservationType::Repeat => "Repeat",
            ObservationType::FollowUp => "Follow-up",
        }
    }

    pub fn from_wire(value: &str) -> Option<ObservationType> {
        match value {
            "New" => Some(ObservationType::New),
            "Repeat" => Some(ObservationType::Repeat),
            "Follow-up" => Some(ObservationType::FollowUp),
            _ => None,
        }
    }
}

/// Trạng thái suy diễn cho dashboard phía đơn vị (chỉ đọc).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PortalStatus {
    Pending,
    Overdue,
    Completed,
}

impl PortalStatus {
    pub fn label(self) -> &'static str {
        match self {
            PortalStatus::Pending => "Pending",
            PortalStatus::Overdue => "Overdue",
            PortalStatus::Completed => "Completed",
        }
    }

    /// Đọc giá trị từ tham số `status` trên URL (không phân biệt hoa thường).
    pub fn parse(value: &str) -> Option<PortalStatus> {
        match value.to_lowercase().as_str() {
            "pending" => Some(PortalStatus::Pending),
            "overdue" => Some(PortalStatus::Overdue),
            "completed" => Some(PortalStatus::Completed),
            _ => None,
        }
    }
}

/// Trạng thái xử lý của một phản hồi do đơn vị gửi lên.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UpdateStatus {
    Pending,
    Accepted,
    Rejected,
}

impl UpdateStatus {
    pub fn code(self) -> u8 {
        match self {
            UpdateStatus::Pending => 1,
            UpdateStatus::Accepted => 2,
            UpdateStatus::Rejected => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<UpdateStatus> {
        match code {
            1 => Some(UpdateStatus::Pending),
            2 => Some(UpdateStatus::Accepted),
            3 => Some(UpdateStatus::Rejected),
            _ => None,
        }
    }
}

/// Bản ghi quan sát kiểm toán (nguồn sự thật do kiểm toán viên quản lý).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Observation {
    pub id: String,
    /// Mã tham chiếu dễ đọc, ví dụ `IA--0001`.
    pub reference: Option<String>,
    pub year: Option<i32>,
    pub quarter: Option<String>,
    pub month: Option<String>,
    pub company_name: String,
    pub region: String,
    pub audit_name: String,
    pub observation_type: Option<ObservationType>,
    pub observation: String,
    pub details: String,
    pub risk_rating: RiskRating,
    pub management_response: String,
    pub head_of_department: String,
    pub department_responsible: String,
    pub person_responsible: String,
    pub email: String,
    pub support_person: Option<String>,
    pub audit_report_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub days_overdue: i64,
    pub aging: AgingBucket,
    pub status: Status,
    pub date_closed: Option<NaiveDate>,
    pub last_communication_date: Option<NaiveDate>,
    pub last_person_communicated: Option<String>,
    /// Ghi chú công việc nội bộ của nhóm kiểm toán (chỉ nối thêm, không ghi đè).
    pub ia_work: String,
    pub closing_remarks: String,
    /// Kế hoạch hành động đã hiệu chỉnh gần nhất do đơn vị cung cấp.
    pub latest_revised_map: String,
    pub created_on: Option<DateTime<Utc>>,
    pub modified_on: Option<DateTime<Utc>>,
}

impl Default for Observation {
    fn default() -> Self {
        Self {
            id: String::new(),
            reference: None,
            year: None,
            quarter: None,
            month: None,
            company_name: String::new(),
            region: String::new(),
            audit_name: String::new(),
            observation_type: None,
            observation: String::new(),
            details: String::new(),
            risk_rating: RiskRating::Low,
            management_response: String::new(),
            head_of_department: String::new(),
            department_responsible: String::new(),
            person_responsible: String::new(),
            email: String::new(),
            support_person: None,
            audit_report_date: None,
            due_date: None,
            days_overdue: 0,
            aging: AgingBucket::NotDue,
            status: Status::InProgress,
            date_closed: None,
            last_communication_date: None,
            last_person_communicated: None,
            ia_work: String::new(),
            closing_remarks: String::new(),
            latest_revised_map: String::new(),
            created_on: None,
            modified_on: None,
        }
    }
}

/// Phản hồi do đơn vị gửi, gắn với đúng một quan sát; bất biến sau khi tạo
/// ngoại trừ cờ `update_status` do kiểm toán viên quyết định.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientUpdate {
    pub id: String,
    pub observation_id: String,
    pub revised_management_feedback: Option<String>,
    pub revised_due_date: Option<NaiveDate>,
    pub client_comments: String,
    pub submitted_date: DateTime<Utc>,
    pub submitted_by: String,
    pub update_status: UpdateStatus,
}

/// Metadata tệp đính kèm của một quan sát (chỉ nối thêm).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: String,
    pub observation_id: String,
    pub name: String,
    pub url: String,
    pub uploaded_by: Option<String>,
    pub created_on: Option<DateTime<Utc>>,
}

/// Lỗi kiểm tra dữ liệu trên một trường cụ thể.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Lỗi chung của tầng nghiệp vụ.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("Dữ liệu đầu vào thiếu thông tin bắt buộc: {0}")]
    MissingData(String),
    #[error("Không đọc được dữ liệu: {0}")]
    Parse(String),
    #[error("Lỗi khác: {0}")]
    Other(String),
}
