pub mod session;
pub mod clock;

pub use session::{compute_session_state, next_transition, session_state_at, to_wib};
pub use clock::{ClockTick, SessionClock};
