//! Đối soát phản hồi của đơn vị: kiểm toán viên chấp nhận hoặc từ chối
//! một bản cập nhật đang chờ. Chỉ kiểm toán viên mới đổi được trạng thái
//! quan sát; đơn vị chỉ gửi đề xuất.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{AgingBucket, ClientUpdate, Observation, Status, UpdateStatus};

/// Kết quả đối soát: bản ghi quan sát mới và bản cập nhật đã gắn cờ
/// xử lý, để tầng lưu trữ ghi cả hai.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReconcileOutcome {
    pub observation: Observation,
    pub update: ClientUpdate,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("Cần nhập closing remarks khi chấp nhận phản hồi của đơn vị")]
    MissingClosingRemarks,
    #[error("Cần nhập lý do khi từ chối phản hồi của đơn vị")]
    MissingReason,
}

/// Chấp nhận phản hồi và đóng quan sát.
///
/// Closing remarks do kiểm toán viên nhập tại thời điểm chấp nhận, độc
/// lập với mọi ghi chú của đơn vị. Hạn chót hiệu chỉnh và kế hoạch hành
/// động hiệu chỉnh (nếu có) được ghi đè lên bản ghi gốc.
pub fn accept(
    obs: &Observation,
    update: &ClientUpdate,
    closing_remarks: &str,
    now: DateTime<Utc>,
) -> Result<ReconcileOutcome, ReconcileError> {
    if closing_remarks.trim().is_empty() {
        return Err(ReconcileError::MissingClosingRemarks);
    }

    let mut observation = obs.clone();
    observation.status = Status::Closed;
    observation.date_closed = Some(now.date_naive());
    observation.closing_remarks = closing_remarks.to_string();
    observation.aging = AgingBucket::NotDue;

    if let Some(revised_due) = update.revised_due_date {
        observation.due_date = Some(revised_due);
    }
    if let Some(feedback) = &update.revised_management_feedback {
        if !feedback.trim().is_empty() {
            observation.latest_revised_map = feedback.clone();
        }
    }

    let mut update = update.clone();
    update.update_status = UpdateStatus::Accepted;

    Ok(ReconcileOutcome {
        observation,
        update,
    })
}

/// Từ chối phản hồi và trả quan sát về In Progress.
///
/// Lý do từ chối được nối thêm (không ghi đè) vào ghi chú nội bộ kèm
/// dấu thời gian, và ngày liên lạc gần nhất được cập nhật.
pub fn reject(
    obs: &Observation,
    update: &ClientUpdate,
    reason: &str,
    now: DateTime<Utc>,
) -> Result<ReconcileOutcome, ReconcileError> {
    if reason.trim().is_empty() {
        return Err(ReconcileError::MissingReason);
    }

    let note = format!(
        "[{}] Client response rejected: {reason}",
        now.date_naive().format("%b %-d, %Y")
    );

    let mut observation = obs.clone();
    observation.status = Status::InProgress;
    observation.ia_work = if observation.ia_work.is_empty() {
        note
    } else {
        format!("{}\n\n{note}", observation.ia_work)
    };
    observation.last_communication_date = Some(now.date_naive());

    let mut update = update.clone();
    update.update_status = UpdateStatus::Rejected;

    Ok(ReconcileOutcome {
        observation,
        update,
    })
}
