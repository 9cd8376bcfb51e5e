//! Container trạng thái dashboard và reducer.
//!
//! Mọi thay đổi đi qua đúng một cửa: `reduce(&state, action)` trả về bản
//! trạng thái mới, không sửa tại chỗ. Nhờ vậy subscriber chỉ cần so sánh
//! hai bản để biết phải vẽ lại phần nào.

use chrono::{DateTime, NaiveDate, Utc};

use obstrack_core::{
    portal_counts, DashboardFilter, Observation, PortalCounts, PortalStatus,
};

/// Số bản ghi mỗi trang.
pub const PAGE_SIZE: usize = 20;

/// Khoảng lặng tối thiểu trước khi ô tìm kiếm được áp dụng.
pub const SEARCH_DEBOUNCE_MS: i64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Cards,
    Table,
}

/// Pha nạp dữ liệu, quyết định dashboard vẽ spinner, danh sách, thông báo
/// rỗng hay màn hình lỗi kèm nút thử lại.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadPhase {
    Loading,
    Ready,
    Empty,
    Failed(String),
}

/// Lựa chọn khả dụng cho hai ô lọc, lấy từ chính dữ liệu đã nạp.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub due_dates: Vec<NaiveDate>,
    pub audits: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    pub today: NaiveDate,
    pub observations: Vec<Observation>,
    pub filter: DashboardFilter,
    /// Nội dung tìm kiếm đang gõ dở cùng thời điểm gõ cuối, chưa áp dụng.
    pub staged_search: Option<(String, DateTime<Utc>)>,
    pub page: usize,
    pub view: ViewMode,
    pub selected: Option<String>,
    pub phase: LoadPhase,
}

impl DashboardState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            observations: Vec::new(),
            filter: DashboardFilter::default(),
            staged_search: None,
            page: 0,
            view: ViewMode::Cards,
            selected: None,
            phase: LoadPhase::Loading,
        }
    }

    /// Danh sách sau lọc, giữ nguyên thứ tự nạp.
    pub fn visible(&self) -> Vec<&Observation> {
        self.filter.apply(&self.observations, self.today)
    }

    /// Trang hiện tại của danh sách sau lọc.
    pub fn visible_page(&self) -> Vec<&Observation> {
        self.visible()
            .into_iter()
            .skip(self.page * PAGE_SIZE)
            .take(PAGE_SIZE)
            .collect()
    }

    pub fn page_count(&self) -> usize {
        let total = self.visible().len();
        if total == 0 {
            1
        } else {
            total.div_ceil(PAGE_SIZE)
        }
    }

    /// Dòng mô tả trang, ví dụ `1-20 of 45`.
    pub fn page_info(&self) -> String {
        let total = self.visible().len();
        if total == 0 {
            return "0 of 0".to_string();
        }
        let start = self.page * PAGE_SIZE + 1;
        let end = (start + PAGE_SIZE - 1).min(total);
        format!("{start}-{end} of {total}")
    }

    /// Giá trị gợi ý cho hai ô lọc: hạn chót và tên đợt kiểm toán, đã khử
    /// trùng và sắp xếp.
    pub fn filter_options(&self) -> FilterOptions {
        let mut due_dates: Vec<NaiveDate> =
            self.observations.iter().filter_map(|o| o.due_date).collect();
        due_dates.sort();
        due_dates.dedup();

        let mut audits: Vec<String> = self
            .observations
            .iter()
            .map(|o| o.audit_name.clone())
            .filter(|name| !name.is_empty())
            .collect();
        audits.sort();
        audits.dedup();

        FilterOptions { due_dates, audits }
    }

    /// Thống kê trên toàn bộ dữ liệu đã nạp, không phụ thuộc bộ lọc.
    pub fn counts(&self) -> PortalCounts {
        portal_counts(&self.observations, self.today)
    }

    pub fn selected_observation(&self) -> Option<&Observation> {
        let id = self.selected.as_deref()?;
        self.observations.iter().find(|o| o.id == id)
    }
}

/// Tập hành động đóng của dashboard.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Loaded(Vec<Observation>),
    LoadFailed(String),
    Retry,
    SearchChanged { text: String, at: DateTime<Utc> },
    SearchTick { now: DateTime<Utc> },
    DueDateFilter(Option<NaiveDate>),
    StatusFilter(Option<PortalStatus>),
    AuditFilter(Option<String>),
    ClearFilters,
    NextPage,
    PrevPage,
    SwitchView(ViewMode),
    OpenDetail(String),
    CloseDetail,
}

/// Hàm chuyển trạng thái thuần túy. Đổi bộ lọc luôn đưa về trang đầu;
/// chuyển trang bị kẹp trong khoảng hợp lệ.
pub fn reduce(state: &DashboardState, action: Action) -> DashboardState {
    let mut next = state.clone();
    match action {
        Action::Loaded(observations) => {
            next.phase = if observations.is_empty() {
                LoadPhase::Empty
            } else {
                LoadPhase::Ready
            };
            next.observations = observations;
            next.page = 0;
        }
        Action::LoadFailed(message) => {
            next.phase = LoadPhase::Failed(message);
        }
        Action::Retry => {
            next.phase = LoadPhase::Loading;
        }
        Action::SearchChanged { text, at } => {
            next.staged_search = Some((text, at));
        }
        Action::SearchTick { now } => {
            if let Some((text, at)) = &next.staged_search {
                let quiet = now.signed_duration_since(*at).num_milliseconds();
                if quiet >= SEARCH_DEBOUNCE_MS {
                    next.filter.search = text.clone();
                    next.staged_search = None;
                    next.page = 0;
                }
            }
        }
        Action::DueDateFilter(due_date) => {
            next.filter.due_date = due_date;
            next.page = 0;
        }
        Action::StatusFilter(status) => {
            next.filter.status = status;
            next.page = 0;
        }
        Action::AuditFilter(audit) => {
            next.filter.audit = audit;
            next.page = 0;
        }
        Action::ClearFilters => {
            next.filter = DashboardFilter::default();
            next.staged_search = None;
            next.page = 0;
        }
        Action::NextPage => {
            if next.page + 1 < next.page_count() {
                next.page += 1;
            }
        }
        Action::PrevPage => {
            next.page = next.page.saturating_sub(1);
        }
        Action::SwitchView(view) => {
            next.view = view;
        }
        Action::OpenDetail(id) => {
            next.selected = Some(id);
        }
        Action::CloseDetail => {
            next.selected = None;
        }
    }
    next
}
