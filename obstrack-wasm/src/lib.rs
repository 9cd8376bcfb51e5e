//! Bridge WASM <-> JavaScript trung lập framework: phơi các quy tắc lõi
//! (suy diễn, kiểm tra, đối soát, lọc, xuất CSV) cho trang portal.

use chrono::Utc;
use serde::Deserialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

use obstrack_core::{
    aging_bucket, to_csv, ClientUpdate, DashboardFilter, Observation, PortalStatus,
};

fn install_panic_hook() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Xếp số ngày quá hạn vào nhóm tuổi. Nhận `i32` để phía JS truyền
/// number thường, không phải BigInt.
#[wasm_bindgen]
pub fn compute_aging(days: i32) -> Result<JsValue, JsValue> {
    install_panic_hook();
    to_value(&aging_bucket(i64::from(days)))
        .map_err(|err| JsValue::from_str(&format!("Không serialize nhóm tuổi: {err}")))
}

/// Trạng thái hiển thị của một quan sát tại thời điểm gọi.
#[wasm_bindgen]
pub fn derive_portal_status(observation: JsValue) -> Result<JsValue, JsValue> {
    install_panic_hook();
    let obs = read_observation(observation)?;
    let today = Utc::now().date_naive();
    let status = obstrack_core::derive_portal_status(obs.status, obs.due_date, today);
    to_value(&status)
        .map_err(|err| JsValue::from_str(&format!("Không serialize trạng thái: {err}")))
}

/// Kiểm tra bản ghi trước khi lưu; trả về danh sách lỗi theo trường.
#[wasm_bindgen]
pub fn validate_observation(observation: JsValue) -> Result<JsValue, JsValue> {
    install_panic_hook();
    let obs = read_observation(observation)?;
    let errors = obstrack_core::validate(&obs);
    to_value(&errors)
        .map_err(|err| JsValue::from_str(&format!("Không serialize danh sách lỗi: {err}")))
}

/// Chấp nhận phản hồi của đơn vị và đóng quan sát.
#[wasm_bindgen]
pub fn accept_client_response(
    observation: JsValue,
    update: JsValue,
    closing_remarks: String,
) -> Result<JsValue, JsValue> {
    install_panic_hook();
    let obs = read_observation(observation)?;
    let update = read_update(update)?;
    let outcome = obstrack_core::accept(&obs, &update, &closing_remarks, Utc::now())
        .map_err(|err| JsValue::from_str(&err.to_string()))?;
    to_value(&outcome)
        .map_err(|err| JsValue::from_str(&format!("Không serialize kết quả: {err}")))
}

/// Từ chối phản hồi của đơn vị kèm lý do.
#[wasm_bindgen]
pub fn reject_client_response(
    observation: JsValue,
    update: JsValue,
    reason: String,
) -> Result<JsValue, JsValue> {
    install_panic_hook();
    let obs = read_observation(observation)?;
    let update = read_update(update)?;
    let outcome = obstrack_core::reject(&obs, &update, &reason, Utc::now())
        .map_err(|err| JsValue::from_str(&err.to_string()))?;
    to_value(&outcome)
        .map_err(|err| JsValue::from_str(&format!("Không serialize kết quả: {err}")))
}

#[derive(Deserialize)]
struct JsDashboardFilter {
    #[serde(default, rename = "dueDate")]
    due_date: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    audit: Option<String>,
    #[serde(default)]
    search: Option<String>,
}

impl From<JsDashboardFilter> for DashboardFilter {
    fn from(filter: JsDashboardFilter) -> Self {
        DashboardFilter {
            due_date: filter
                .due_date
                .and_then(|text| chrono::NaiveDate::parse_from_str(&text, "%Y-%m-%d").ok()),
            status: filter.status.as_deref().and_then(PortalStatus::parse),
            audit: filter.audit.filter(|a| !a.trim().is_empty()),
            search: filter.search.unwrap_or_default(),
        }
    }
}

/// Lọc danh sách quan sát theo bộ lọc dashboard, giữ nguyên thứ tự.
#[wasm_bindgen]
pub fn filter_dashboard(observations: JsValue, filter: JsValue) -> Result<JsValue, JsValue> {
    install_panic_hook();
    let items = read_observations(observations)?;
    let filter: JsDashboardFilter = from_value(filter)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được bộ lọc: {err}")))?;
    let filter = DashboardFilter::from(filter);
    let today = Utc::now().date_naive();
    let kept: Vec<&Observation> = filter.apply(&items, today);
    to_value(&kept)
        .map_err(|err| JsValue::from_str(&format!("Không serialize kết quả lọc: {err}")))
}

/// Sinh nội dung file CSV từ danh sách quan sát.
#[wasm_bindgen]
pub fn export_csv(observations: JsValue) -> Result<String, JsValue> {
    install_panic_hook();
    let items = read_observations(observations)?;
    Ok(to_csv(&items))
}

fn read_observation(value: JsValue) -> Result<Observation, JsValue> {
    from_value(value)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được bản ghi quan sát: {err}")))
}

fn read_observations(value: JsValue) -> Result<Vec<Observation>, JsValue> {
    from_value(value)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được danh sách quan sát: {err}")))
}

fn read_update(value: JsValue) -> Result<ClientUpdate, JsValue> {
    from_value(value)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được bản cập nhật: {err}")))
}
