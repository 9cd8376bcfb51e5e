//! Xuất danh sách quan sát ra CSV đủ 27 cột, giữ nguyên thứ tự đầu vào.

use chrono::NaiveDate;

use crate::model::Observation;

/// Thứ tự cột cố định của file xuất.
pub const CSV_HEADERS: [&str; 27] = [
    "Year",
    "Quarter",
    "Month",
    "Company Name",
    "Region",
    "Audit Name",
    "Observation Type",
    "Observation",
    "Risk Rating",
    "Details",
    "Management Response",
    "Head of Department",
    "Department Responsible",
    "Person Responsible",
    "Email",
    "Support Person",
    "Audit Report Date",
    "Due Date",
    "Days Overdue",
    "Aging",
    "Date Closed",
    "Status",
    "Last Communication Date",
    "Last Person Communicated",
    "IA Work",
    "Closing Remarks",
    "Latest Revised MAP",
];

/// Tên file xuất theo ngày tạo, ví dụ `observations_complete_2024-07-01.csv`.
pub fn export_file_name(today: NaiveDate) -> String {
    format!("observations_complete_{}.csv", today.format("%Y-%m-%d"))
}

/// Sinh nội dung CSV. Mọi ô dữ liệu được bao trong nháy kép, nháy kép
/// bên trong được nhân đôi; mã rủi ro/tuổi/trạng thái xuất dưới dạng
/// nhãn chữ, ngày dạng "Mon D, YYYY" và "-" khi trống.
pub fn to_csv(items: &[Observation]) -> String {
    let mut lines = Vec::with_capacity(items.len() + 1);
    lines.push(CSV_HEADERS.join(","));

    for obs in items {
        let cells = [
            obs.year.map(|y| y.to_string()).unwrap_or_default(),
            obs.quarter.clone().unwrap_or_default(),
            obs.month.clone().unwrap_or_default(),
            obs.company_name.clone(),
            obs.region.clone(),
            obs.audit_name.clone(),
            obs.observation_type
                .map(|t| t.as_wire().to_string())
                .unwrap_or_default(),
            obs.observation.clone(),
            obs.risk_rating.label().to_string(),
            obs.details.clone(),
            obs.management_response.clone(),
            obs.head_of_department.clone(),
            obs.department_responsible.clone(),
            obs.person_responsible.clone(),
            obs.email.clone(),
            obs.support_person.clone().unwrap_or_default(),
            format_date(obs.audit_report_date),
            format_date(obs.due_date),
            obs.days_overdue.to_string(),
            obs.aging.label().to_string(),
            format_date(obs.date_closed),
            obs.status.label().to_string(),
            format_date(obs.last_communication_date),
            obs.last_person_communicated.clone().unwrap_or_default(),
            obs.ia_work.clone(),
            obs.closing_remarks.clone(),
            obs.latest_revised_map.clone(),
        ];
        let row: Vec<String> = cells.iter().map(|cell| quote(cell)).collect();
        lines.push(row.join(","));
    }

    lines.join("\n")
}

fn quote(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}

fn format_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(date) => date.format("%b %-d, %Y").to_string(),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AgingBucket, ObservationType, RiskRating, Status};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Tách một dòng CSV đã quote, dùng riêng cho kiểm thử.
    fn split_row(line: &str) -> Vec<String> {
        let mut cells = Vec::new();
        let mut current = String::new();
        let mut in_quotes = false;
        let mut chars = line.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '"' if in_quotes => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        current.push('"');
                    } else {
                        in_quotes = false;
                    }
                }
                '"' => in_quotes = true,
                ',' if !in_quotes => {
                    cells.push(std::mem::take(&mut current));
                }
                other => current.push(other),
            }
        }
        cells.push(current);
        cells
    }

    fn sample() -> Observation {
        Observation {
            id: "a".into(),
            year: Some(2024),
            quarter: Some("Q2".into()),
            company_name: "Petrolube Ltd.".into(),
            region: "Middle East".into(),
            audit_name: "Operations Audit".into(),
            observation_type: Some(ObservationType::FollowUp),
            observation: "Counts skipped in \"two\" depots, repeatedly".into(),
            details: "Quarterly counts skipped".into(),
            risk_rating: RiskRating::High,
            management_response: "Introduce monthly reconciliation".into(),
            person_responsible: "J. Doe".into(),
            email: "j.doe@example.com".into(),
            due_date: Some(date(2024, 3, 1)),
            days_overdue: 122,
            aging: AgingBucket::UpToSixMonths,
            status: Status::Overdue,
            ..Observation::default()
        }
    }

    #[test]
    fn header_row_has_fixed_columns() {
        let csv = to_csv(&[]);
        assert_eq!(csv, CSV_HEADERS.join(","));
        assert_eq!(CSV_HEADERS.len(), 27);
        assert_eq!(CSV_HEADERS[0], "Year");
        assert_eq!(CSV_HEADERS[26], "Latest Revised MAP");
    }

    #[test]
    fn cells_with_commas_and_quotes_round_trip() {
        let csv = to_csv(&[sample()]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        let cells = split_row(lines[1]);
        assert_eq!(cells.len(), 27);
        assert_eq!(cells[7], "Counts skipped in \"two\" depots, repeatedly");
        assert_eq!(cells[8], "High");
        assert_eq!(cells[17], "Mar 1, 2024");
        assert_eq!(cells[18], "122");
        assert_eq!(cells[19], "0-6M");
        assert_eq!(cells[21], "Overdue");
    }

    #[test]
    fn absent_dates_render_as_dash() {
        let csv = to_csv(&[Observation::default()]);
        let cells = split_row(csv.lines().nth(1).unwrap());
        assert_eq!(cells[16], "-");
        assert_eq!(cells[17], "-");
        assert_eq!(cells[20], "-");
        assert_eq!(cells[22], "-");
    }

    #[test]
    fn observation_type_uses_wire_label() {
        let csv = to_csv(&[sample()]);
        let cells = split_row(csv.lines().nth(1).unwrap());
        assert_eq!(cells[6], "Follow-up");
    }

    #[test]
    fn file_name_embeds_iso_date() {
        assert_eq!(
            export_file_name(date(2024, 7, 1)),
            "observations_complete_2024-07-01.csv"
        );
    }
}
