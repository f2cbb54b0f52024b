pub mod loader;
pub mod model;

pub use loader::{load_preachers, load_rotation, load_team, parse_date};
pub use model::{Person, Preacher, PreachingCalendar, Pulpit, Role};
