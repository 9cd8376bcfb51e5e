//! Converters between Dataverse JSON rows and the domain model.
//!
//! Rows come back from the Web API as flat objects with `cr650_*` columns
//! and lookup columns flattened to `_cr650_observation_value`. Mapping is
//! tolerant: absent text columns become empty strings, unknown choice codes
//! fall back to conservative defaults. Only the primary key is required.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{json, Value};

use obstrack_core::{
    AgingBucket, ClientUpdate, Document, Observation, ObservationType, RiskRating, Status,
    TrackerError, UpdateStatus,
};

/// Map one observation row. Fails only when the primary key is missing.
pub fn observation_from_value(row: &Value) -> Result<Observation, TrackerError> {
    let id = required_str(row, "cr650_ia_observationid")?;

    Ok(Observation {
        id,
        reference: opt_str(row, "cr650_name"),
        year: int_field(row, "cr650_year").map(|y| y as i32),
        quarter: opt_str(row, "cr650_quarter"),
        month: opt_str(row, "cr650_month"),
        company_name: str_field(row, "cr650_companyname"),
        region: str_field(row, "cr650_region"),
        audit_name: str_field(row, "cr650_auditname"),
        observation_type: row
            .get("cr650_observationtype")
            .and_then(Value::as_str)
            .and_then(ObservationType::from_wire),
        observation: str_field(row, "cr650_observation"),
        details: str_field(row, "cr650_details"),
        risk_rating: code_field(row, "cr650_riskrating")
            .and_then(RiskRating::from_code)
            .unwrap_or(RiskRating::Low),
        management_response: str_field(row, "cr650_managementresponse"),
        // The column name carries a typo in the Dataverse schema.
        head_of_department: str_field(row, "cr650_headofdepartemt"),
        department_responsible: str_field(row, "cr650_departmentresponsible"),
        person_responsible: str_field(row, "cr650_personresponsible"),
        email: str_field(row, "cr650_email"),
        support_person: opt_str(row, "cr650_supportperson"),
        audit_report_date: date_field(row, "cr650_auditreportdate"),
        due_date: date_field(row, "cr650_duedate"),
        days_overdue: int_field(row, "cr650_daysoverdue").unwrap_or(0),
        aging: code_field(row, "cr650_aging")
            .and_then(AgingBucket::from_code)
            .unwrap_or(AgingBucket::NotDue),
        status: code_field(row, "cr650_status")
            .and_then(Status::from_code)
            .unwrap_or(Status::InProgress),
        date_closed: date_field(row, "cr650_dateclosed"),
        last_communication_date: date_field(row, "cr650_lastcommunicationdate"),
        last_person_communicated: opt_str(row, "cr650_lastpersoncommunicatedwith"),
        ia_work: str_field(row, "cr650_iawork"),
        closing_remarks: str_field(row, "cr650_closingremarks"),
        latest_revised_map: str_field(row, "cr650_latestrevisedmap"),
        created_on: datetime_field(row, "createdon"),
        modified_on: datetime_field(row, "modifiedon"),
    })
}

/// Build the create/update payload for an observation. The primary key is
/// never part of the body; choice columns are written as their codes.
pub fn observation_to_value(obs: &Observation) -> Value {
    let mut map = serde_json::Map::new();
    map.insert("cr650_companyname".into(), json!(obs.company_name));
    map.insert("cr650_region".into(), json!(obs.region));
    map.insert("cr650_auditname".into(), json!(obs.audit_name));
    map.insert("cr650_observation".into(), json!(obs.observation));
    map.insert("cr650_details".into(), json!(obs.details));
    map.insert("cr650_riskrating".into(), json!(obs.risk_rating.code()));
    map.insert(
        "cr650_managementresponse".into(),
        json!(obs.management_response),
    );
    map.insert("cr650_headofdepartemt".into(), json!(obs.head_of_department));
    map.insert(
        "cr650_departmentresponsible".into(),
        json!(obs.department_responsible),
    );
    map.insert(
        "cr650_personresponsible".into(),
        json!(obs.person_responsible),
    );
    map.insert("cr650_email".into(), json!(obs.email));
    map.insert("cr650_daysoverdue".into(), json!(obs.days_overdue));
    map.insert("cr650_aging".into(), json!(obs.aging.code()));
    map.insert("cr650_status".into(), json!(obs.status.code()));
    map.insert("cr650_iawork".into(), json!(obs.ia_work));
    map.insert("cr650_closingremarks".into(), json!(obs.closing_remarks));
    map.insert(
        "cr650_latestrevisedmap".into(),
        json!(obs.latest_revised_map),
    );
    if let Some(reference) = &obs.reference {
        map.insert("cr650_name".into(), json!(reference));
    }
    if let Some(year) = obs.year {
        map.insert("cr650_year".into(), json!(year));
    }
    if let Some(quarter) = &obs.quarter {
        map.insert("cr650_quarter".into(), json!(quarter));
    }
    if let Some(month) = &obs.month {
        map.insert("cr650_month".into(), json!(month));
    }
    if let Some(kind) = obs.observation_type {
        map.insert("cr650_observationtype".into(), json!(kind.as_wire()));
    }
    if let Some(person) = &obs.support_person {
        map.insert("cr650_supportperson".into(), json!(person));
    }
    if let Some(person) = &obs.last_person_communicated {
        map.insert("cr650_lastpersoncommunicatedwith".into(), json!(person));
    }
    insert_date(&mut map, "cr650_auditreportdate", obs.audit_report_date);
    insert_date(&mut map, "cr650_duedate", obs.due_date);
    insert_date(&mut map, "cr650_dateclosed", obs.date_closed);
    insert_date(
        &mut map,
        "cr650_lastcommunicationdate",
        obs.last_communication_date,
    );

    Value::Object(map)
}

/// Map one client-update row.
pub fn client_update_from_value(row: &Value) -> Result<ClientUpdate, TrackerError> {
    let id = required_str(row, "cr650_iaclientupdateid")?;
    let submitted_date = datetime_field(row, "cr650_submitteddate")
        .ok_or_else(|| TrackerError::MissingData("cr650_submitteddate".into()))?;

    Ok(ClientUpdate {
        id,
        observation_id: str_field(row, "_cr650_observation_value"),
        revised_management_feedback: opt_str(row, "cr650_revisedmanagementfeedback"),
        revised_due_date: date_field(row, "cr650_revisedduedate"),
        client_comments: str_field(row, "cr650_clientcomments"),
        submitted_date,
        submitted_by: str_field(row, "cr650_submittedby"),
        update_status: code_field(row, "cr650_updatestatus")
            .and_then(UpdateStatus::from_code)
            .unwrap_or(UpdateStatus::Pending),
    })
}

/// Build the create payload for a client update, binding it to its parent
/// observation through the navigation property.
pub fn client_update_to_value(update: &ClientUpdate) -> Value {
    let mut map = serde_json::Map::new();
    map.insert("cr650_clientcomments".into(), json!(update.client_comments));
    map.insert(
        "cr650_submitteddate".into(),
        json!(update.submitted_date.to_rfc3339()),
    );
    map.insert("cr650_submittedby".into(), json!(update.submitted_by));
    map.insert(
        "cr650_updatestatus".into(),
        json!(update.update_status.code()),
    );
    map.insert(
        "cr650_Observation@odata.bind".into(),
        json!(format!("/cr650_ia_observations({})", update.observation_id)),
    );

    if let Some(feedback) = &update.revised_management_feedback {
        map.insert("cr650_revisedmanagementfeedback".into(), json!(feedback));
    }
    insert_date(&mut map, "cr650_revisedduedate", update.revised_due_date);

    Value::Object(map)
}

/// Map one document row.
pub fn document_from_value(row: &Value) -> Result<Document, TrackerError> {
    let id = required_str(row, "cr650_ia_documentsid")?;

    Ok(Document {
        id,
        observation_id: str_field(row, "_cr650_observation_value"),
        name: str_field(row, "cr650_documentname"),
        url: str_field(row, "cr650_sharepointurl"),
        uploaded_by: opt_str(row, "cr650_uploadedby"),
        created_on: datetime_field(row, "createdon"),
    })
}

/// Unwrap the `{ "value": [...] }` list envelope and map every entry.
pub fn list_from_value<T>(
    envelope: &Value,
    map_entry: impl Fn(&Value) -> Result<T, TrackerError>,
) -> Result<Vec<T>, TrackerError> {
    let entries = envelope
        .get("value")
        .and_then(Value::as_array)
        .ok_or_else(|| TrackerError::MissingData("value".into()))?;
    entries.iter().map(map_entry).collect()
}

fn required_str(row: &Value, key: &str) -> Result<String, TrackerError> {
    row.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| TrackerError::MissingData(key.to_string()))
}

fn str_field(row: &Value, key: &str) -> String {
    row.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn opt_str(row: &Value, key: &str) -> Option<String> {
    row.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn int_field(row: &Value, key: &str) -> Option<i64> {
    let value = row.get(key)?;
    value
        .as_i64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

fn code_field(row: &Value, key: &str) -> Option<u8> {
    int_field(row, key).and_then(|n| u8::try_from(n).ok())
}

/// Date-only columns arrive as `YYYY-MM-DD`; datetime columns as RFC 3339.
/// Accept either by taking the first ten characters.
fn date_field(row: &Value, key: &str) -> Option<NaiveDate> {
    let text = row.get(key)?.as_str()?;
    let prefix = text.get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

fn datetime_field(row: &Value, key: &str) -> Option<DateTime<Utc>> {
    let text = row.get(key)?.as_str()?;
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

fn insert_date(
    map: &mut serde_json::Map<String, Value>,
    key: &str,
    date: Option<NaiveDate>,
) {
    if let Some(date) = date {
        map.insert(key.to_string(), json!(date.format("%Y-%m-%d").to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observation_row_maps_with_defaults() {
        let row = json!({
            "cr650_ia_observationid": "11111111-2222-3333-4444-555555555555",
            "cr650_name": "IA--0001",
            "cr650_year": 2024,
            "cr650_observation": "Stock counts not reconciled",
            "cr650_riskrating": 2,
            "cr650_status": 2,
            "cr650_aging": 3,
            "cr650_duedate": "2024-01-01",
            "createdon": "2024-01-05T08:30:00Z"
        });

        let obs = observation_from_value(&row).unwrap();
        assert_eq!(obs.reference.as_deref(), Some("IA--0001"));
        assert_eq!(obs.year, Some(2024));
        assert_eq!(obs.risk_rating, RiskRating::High);
        assert_eq!(obs.status, Status::Overdue);
        assert_eq!(obs.aging, AgingBucket::SixMonthsToYear);
        assert_eq!(
            obs.due_date,
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        assert!(obs.created_on.is_some());
        // Absent text columns map to empty, not errors.
        assert!(obs.details.is_empty());
    }

    #[test]
    fn unknown_choice_codes_fall_back() {
        let row = json!({
            "cr650_ia_observationid": "x",
            "cr650_riskrating": 99,
            "cr650_status": 0,
            "cr650_aging": 42
        });
        let obs = observation_from_value(&row).unwrap();
        assert_eq!(obs.risk_rating, RiskRating::Low);
        assert_eq!(obs.status, Status::InProgress);
        assert_eq!(obs.aging, AgingBucket::NotDue);
    }

    #[test]
    fn missing_primary_key_is_an_error() {
        let row = json!({ "cr650_name": "IA--0001" });
        assert!(observation_from_value(&row).is_err());
    }

    #[test]
    fn observation_payload_writes_codes_and_dates() {
        let obs = Observation {
            id: "ignored".into(),
            reference: Some("IA--0002".into()),
            status: Status::Closed,
            aging: AgingBucket::NotDue,
            risk_rating: RiskRating::Critical,
            date_closed: NaiveDate::from_ymd_opt(2024, 8, 1),
            ..Observation::default()
        };
        let row = observation_to_value(&obs);
        assert_eq!(row["cr650_status"], 3);
        assert_eq!(row["cr650_aging"], 1);
        assert_eq!(row["cr650_riskrating"], 1);
        assert_eq!(row["cr650_dateclosed"], "2024-08-01");
        assert_eq!(row["cr650_name"], "IA--0002");
        assert!(row.get("cr650_ia_observationid").is_none());
        assert!(row.get("cr650_duedate").is_none());
    }

    #[test]
    fn client_update_round_trips_through_wire_shape() {
        let row = json!({
            "cr650_iaclientupdateid": "u-1",
            "_cr650_observation_value": "o-1",
            "cr650_revisedmanagementfeedback": "Plan revised",
            "cr650_revisedduedate": "2024-09-30",
            "cr650_clientcomments": "Please extend",
            "cr650_submitteddate": "2024-06-20T09:30:00Z",
            "cr650_submittedby": "J. Doe",
            "cr650_updatestatus": 1
        });
        let update = client_update_from_value(&row).unwrap();
        assert_eq!(update.observation_id, "o-1");
        assert_eq!(update.update_status, UpdateStatus::Pending);
        assert_eq!(
            update.revised_due_date,
            NaiveDate::from_ymd_opt(2024, 9, 30)
        );

        let payload = client_update_to_value(&update);
        assert_eq!(
            payload["cr650_Observation@odata.bind"],
            "/cr650_ia_observations(o-1)"
        );
        assert_eq!(payload["cr650_updatestatus"], 1);
        assert_eq!(payload["cr650_revisedduedate"], "2024-09-30");
    }

    #[test]
    fn client_update_without_submitted_date_is_rejected() {
        let row = json!({ "cr650_iaclientupdateid": "u-1" });
        assert!(client_update_from_value(&row).is_err());
    }

    #[test]
    fn list_envelope_unwraps_value_array() {
        let envelope = json!({
            "value": [
                { "cr650_ia_observationid": "a" },
                { "cr650_ia_observationid": "b" }
            ]
        });
        let rows = list_from_value(&envelope, observation_from_value).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].id, "b");

        let bad = json!({ "rows": [] });
        assert!(list_from_value(&bad, observation_from_value).is_err());
    }
}
