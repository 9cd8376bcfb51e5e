//! Logic lõi theo dõi vòng đời quan sát kiểm toán: mô hình dữ liệu,
//! suy diễn trạng thái/tuổi quá hạn, quy tắc đóng quan sát, đối soát
//! phản hồi của đơn vị và bộ lọc dashboard.

pub mod closure;
pub mod derive;
pub mod export;
pub mod filter;
pub mod model;
pub mod reconcile;
pub mod stats;

pub use closure::{apply_status_transition, validate};
pub use derive::{aging_bucket, days_overdue, derive_portal_status, recompute_derived};
pub use export::{export_file_name, to_csv, CSV_HEADERS};
pub use filter::{DashboardFilter, TrackerFilter};
pub use model::{
    AgingBucket, ClientUpdate, Document, FieldError, Observation, ObservationType, PortalStatus,
    RiskRating, Status, TrackerError, UpdateStatus,
};
pub use reconcile::{accept, reject, ReconcileError, ReconcileOutcome};
pub use stats::{portal_counts, status_counts, PortalCounts, StatusCounts};
