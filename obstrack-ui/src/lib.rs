//! Tầng trạng thái dashboard: container bất biến + hàm chuyển trạng thái
//! thuần túy. Việc vẽ giao diện là chuyện của subscriber bên ngoài crate.

pub mod deeplink;
pub mod state;

pub use deeplink::DeepLink;
pub use state::{
    reduce, Action, DashboardState, FilterOptions, LoadPhase, ViewMode, PAGE_SIZE,
    SEARCH_DEBOUNCE_MS,
};
