pub mod state;
pub mod preferences;
pub mod view;

pub use state::{AnalysisTicket, DashboardState};
pub use preferences::PreferenceStore;
pub use view::{render_summary, series_json, session_banner};
