//! Quy tắc đóng quan sát: trường nào bắt buộc theo trạng thái và cách
//! chuyển trạng thái ảnh hưởng tới dữ liệu đóng.

use chrono::NaiveDate;

use crate::model::{AgingBucket, FieldError, Observation, Status};

/// Kiểm tra bản ghi trước khi lưu. Trả về danh sách lỗi theo trường,
/// rỗng nghĩa là hợp lệ. Không gọi mạng ở đây.
pub fn validate(obs: &Observation) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if obs.year.is_none() {
        errors.push(FieldError::new("year", "Year is required"));
    }
    if is_blank_opt(&obs.quarter) {
        errors.push(FieldError::new("quarter", "Quarter is required"));
    }
    if obs.company_name.trim().is_empty() {
        errors.push(FieldError::new("companyName", "Company Name is required"));
    }
    if obs.region.trim().is_empty() {
        errors.push(FieldError::new("region", "Region is required"));
    }
    if obs.audit_name.trim().is_empty() {
        errors.push(FieldError::new("auditName", "Audit Name is required"));
    }
    if obs.audit_report_date.is_none() {
        errors.push(FieldError::new(
            "auditReportDate",
            "Audit Report Date is required",
        ));
    }
    if obs.observation_type.is_none() {
        errors.push(FieldError::new(
            "observationType",
            "Observation Type is required",
        ));
    }
    if obs.observation.trim().is_empty() {
        errors.push(FieldError::new("observation", "Observation is required"));
    }
    if obs.details.trim().is_empty() {
        errors.push(FieldError::new("details", "Details is required"));
    }
    if obs.management_response.trim().is_empty() {
        errors.push(FieldError::new(
            "managementResponse",
            "Management Response is required",
        ));
    }
    if obs.head_of_department.trim().is_empty() {
        errors.push(FieldError::new(
            "headOfDepartment",
            "Head of Department is required",
        ));
    }
    if obs.department_responsible.trim().is_empty() {
        errors.push(FieldError::new(
            "departmentResponsible",
            "Department Responsible is required",
        ));
    }
    if obs.person_responsible.trim().is_empty() {
        errors.push(FieldError::new(
            "personResponsible",
            "Person Responsible is required",
        ));
    }
    if obs.email.trim().is_empty() {
        errors.push(FieldError::new("email", "Email is required"));
    } else if !obs.email.contains('@') {
        errors.push(FieldError::new("email", "Email is invalid"));
    }
    if obs.due_date.is_none() {
        errors.push(FieldError::new("dueDate", "Due Date is required"));
    }

    // Cổng đóng: chỉ khi Closed thì hai trường này trở thành bắt buộc.
    if obs.status == Status::Closed {
        if obs.date_closed.is_none() {
            errors.push(FieldError::new(
                "dateClosed",
                "Date Closed is required when Status is Closed",
            ));
        }
        if obs.closing_remarks.trim().is_empty() {
            errors.push(FieldError::new(
                "closingRemarks",
                "Closing Remarks is required when Status is Closed",
            ));
        }
    }

    errors
}

/// Chuyển trạng thái và áp hệ quả của nó lên bản ghi.
///
/// Sang `Closed`: điền mặc định `date_closed` bằng ngày chuyển nếu đang
/// trống và ép nhóm tuổi về NotDue. Rời `Closed`: dữ liệu đóng đã nhập
/// được giữ nguyên, không bao giờ tự xoá (chỉ ẩn ở tầng trình bày).
pub fn apply_status_transition(
    obs: &Observation,
    new_status: Status,
    today: NaiveDate,
) -> Observation {
    let mut next = obs.clone();
    next.status = new_status;

    if new_status == Status::Closed {
        if next.date_closed.is_none() {
            next.date_closed = Some(today);
        }
        next.aging = AgingBucket::NotDue;
    }

    next
}

fn is_blank_opt(value: &Option<String>) -> bool {
    match value {
        Some(text) => text.trim().is_empty(),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ObservationType;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn complete_observation() -> Observation {
        Observation {
            id: "b7f1".into(),
            year: Some(2024),
            quarter: Some("Q2".into()),
            company_name: "Petrolube Ltd.".into(),
            region: "Middle East".into(),
            audit_name: "Operations Efficiency Audit 2024".into(),
            observation_type: Some(ObservationType::New),
            observation: "Stock counts not reconciled".into(),
            details: "Quarterly counts skipped in two depots".into(),
            management_response: "Introduce monthly reconciliation".into(),
            head_of_department: "A. Rahman".into(),
            department_responsible: "Operations".into(),
            person_responsible: "J. Doe".into(),
            email: "j.doe@example.com".into(),
            due_date: Some(date(2024, 9, 30)),
            audit_report_date: Some(date(2024, 4, 15)),
            ..Observation::default()
        }
    }

    #[test]
    fn complete_record_passes_validation() {
        assert!(validate(&complete_observation()).is_empty());
    }

    #[test]
    fn missing_required_fields_are_reported_per_field() {
        let obs = Observation::default();
        let errors = validate(&obs);
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert!(fields.contains(&"year"));
        assert!(fields.contains(&"quarter"));
        assert!(fields.contains(&"observation"));
        assert!(fields.contains(&"dueDate"));
        // Chưa Closed thì không đòi dữ liệu đóng.
        assert!(!fields.contains(&"dateClosed"));
        assert!(!fields.contains(&"closingRemarks"));
    }

    #[test]
    fn closed_without_remarks_fails_validation() {
        let mut obs = complete_observation();
        obs.status = Status::Closed;
        obs.date_closed = Some(date(2024, 8, 1));
        let errors = validate(&obs);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "closingRemarks");
    }

    #[test]
    fn closed_with_remarks_and_date_passes() {
        let mut obs = complete_observation();
        obs.status = Status::Closed;
        obs.date_closed = Some(date(2024, 8, 1));
        obs.closing_remarks = "Verified corrective action".into();
        assert!(validate(&obs).is_empty());
    }

    #[test]
    fn transition_to_closed_defaults_date_and_forces_aging() {
        let mut obs = complete_observation();
        obs.aging = AgingBucket::SixMonthsToYear;
        let today = date(2024, 8, 1);
        let next = apply_status_transition(&obs, Status::Closed, today);
        assert_eq!(next.status, Status::Closed);
        assert_eq!(next.date_closed, Some(today));
        assert_eq!(next.aging, AgingBucket::NotDue);
    }

    #[test]
    fn transition_to_closed_keeps_existing_date_closed() {
        let mut obs = complete_observation();
        obs.date_closed = Some(date(2024, 7, 15));
        let next = apply_status_transition(&obs, Status::Closed, date(2024, 8, 1));
        assert_eq!(next.date_closed, Some(date(2024, 7, 15)));
    }

    #[test]
    fn reopening_retains_closing_data() {
        let mut obs = complete_observation();
        obs.status = Status::Closed;
        obs.date_closed = Some(date(2024, 7, 15));
        obs.closing_remarks = "Done".into();
        let next = apply_status_transition(&obs, Status::InProgress, date(2024, 8, 1));
        assert_eq!(next.status, Status::InProgress);
        assert_eq!(next.date_closed, Some(date(2024, 7, 15)));
        assert_eq!(next.closing_remarks, "Done");
    }
}
