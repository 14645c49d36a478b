//! ドラッグ&ドロップ操作の状態機械
//!
//! 画面部品に依存しない形で、ドラッグ開始からドロップ/キャンセルまでを表す。
//!
//! ```text
//! Idle --start--> Dragging(source) --drop--> Idle（DropIntentを返す）
//!                                  --cancel--> Idle
//! ```

use crate::types::RoomRef;

/// ドロップで確定した入れ替え要求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropIntent {
    pub source: RoomRef,
    pub target: RoomRef,
}

impl DropIntent {
    pub fn new(source: RoomRef, target: RoomRef) -> Self {
        Self { source, target }
    }

    /// 自分自身へのドロップ（フロアは問わずRoomIDで比較）
    pub fn is_self_drop(&self) -> bool {
        self.source.room_id == self.target.room_id
    }
}

/// 操作状態
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Gesture {
    #[default]
    Idle,
    Dragging {
        source: RoomRef,
        /// ドロップ候補として強調表示中の部屋
        hover: Option<String>,
    },
}

impl Gesture {
    pub fn new() -> Self {
        Self::Idle
    }

    /// ドラッグ開始。RoomIDが空なら Idle のまま
    pub fn start(&mut self, floor: &str, room_id: &str) {
        let room_id = room_id.trim();
        if room_id.is_empty() {
            log::debug!("RoomIDが空のためドラッグを開始しません");
            *self = Gesture::Idle;
            return;
        }
        *self = Gesture::Dragging {
            source: RoomRef::new(floor, room_id),
            hover: None,
        };
    }

    /// ドロップ候補の上に来た
    pub fn hover(&mut self, room_id: &str) {
        if let Gesture::Dragging { hover, .. } = self {
            *hover = Some(room_id.to_string());
        }
    }

    /// ドロップ候補から離れた
    pub fn leave(&mut self) {
        if let Gesture::Dragging { hover, .. } = self {
            *hover = None;
        }
    }

    /// ドロップ。ドラッグ中でなければ何も返さない
    pub fn drop_on(&mut self, floor: &str, room_id: &str) -> Option<DropIntent> {
        match std::mem::take(self) {
            Gesture::Dragging { source, .. } => {
                Some(DropIntent::new(source, RoomRef::new(floor, room_id.trim())))
            }
            Gesture::Idle => None,
        }
    }

    pub fn cancel(&mut self) {
        *self = Gesture::Idle;
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, Gesture::Dragging { .. })
    }

    pub fn source(&self) -> Option<&RoomRef> {
        match self {
            Gesture::Dragging { source, .. } => Some(source),
            Gesture::Idle => None,
        }
    }

    pub fn hovered(&self) -> Option<&str> {
        match self {
            Gesture::Dragging { hover, .. } => hover.as_deref(),
            Gesture::Idle => None,
        }
    }
}
