//! Floor Assign Common Library
//!
//! 部屋割り当ての型と状態モデル（画面・通信に依存しない部分）

pub mod types;
pub mod error;
pub mod office;
pub mod assignment;
pub mod change_log;
pub mod gesture;
pub mod overlay;
pub mod floor;
pub mod store;
pub mod session;

pub use types::{ChangeLogEntry, OfficeRecord, PositionEntry, RoomMappingEntry, RoomMetadata, RoomRef};
pub use error::{Error, Result};
pub use office::{OfficeDirectory, OfficeFilter};
pub use assignment::{AssignmentMap, Conflict, SwapPolicy};
pub use change_log::ChangeLog;
pub use gesture::{DropIntent, Gesture};
pub use overlay::{Tag, TagOverlay};
pub use floor::{FloorResources, FloorTable, DEFAULT_OFFICE_CSV, DEFAULT_POSITIONS};
pub use store::{MemoryStore, StateStore, ASSIGNMENTS_KEY, CHANGE_LOG_KEY};
pub use session::{DropOutcome, Session};
