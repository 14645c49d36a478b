//! 対話式の部屋入れ替えモジュール
//!
//! 端末上で「ドラッグ元を選ぶ → ドロップ先を選ぶ」を操作状態機械に流し込み、
//! 入れ替え・履歴追加・保存を行う。タグ位置の変更はこのセッション中だけ有効。

use crate::clock::now_millis;
use crate::error::{FloorAssignError, Result};
use crate::loader::{load_floor, AssetSource, FloorData};
use crate::view;
use dialoguer::{Confirm, Input, Select};
use floor_assign_common::{
    DropOutcome, FloorTable, Gesture, OfficeFilter, Session, StateStore, TagOverlay,
};

/// メニュー項目
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// 部屋を入れ替え
    MoveRoom,
    /// タグ位置を変更
    MoveTag,
    /// フロア切替
    SwitchFloor,
    /// 割り当て表示
    ShowAssignments,
    /// 変更履歴表示
    ShowLog,
    /// 終了
    Quit,
}

impl MenuAction {
    pub const ALL: [MenuAction; 6] = [
        MenuAction::MoveRoom,
        MenuAction::MoveTag,
        MenuAction::SwitchFloor,
        MenuAction::ShowAssignments,
        MenuAction::ShowLog,
        MenuAction::Quit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MenuAction::MoveRoom => "部屋を入れ替え",
            MenuAction::MoveTag => "タグ位置を変更（保存されません）",
            MenuAction::SwitchFloor => "フロア切替",
            MenuAction::ShowAssignments => "割り当てを表示",
            MenuAction::ShowLog => "変更履歴を表示",
            MenuAction::Quit => "終了",
        }
    }
}

fn prompt_err(e: dialoguer::Error) -> FloorAssignError {
    FloorAssignError::Interactive(e.to_string())
}

/// 対話セッション
pub struct Interactive<'a, S: StateStore> {
    source: &'a AssetSource,
    floors: &'a FloorTable,
    session: Session<S>,
    gesture: Gesture,
    current: FloorData,
    overlay: TagOverlay,
}

impl<'a, S: StateStore> Interactive<'a, S> {
    pub async fn start(
        source: &'a AssetSource,
        floors: &'a FloorTable,
        session: Session<S>,
        floor: &str,
    ) -> Result<Self> {
        let current = load_floor(source, floor, floors.get(floor)?).await;
        let overlay = current.overlay();
        Ok(Self {
            source,
            floors,
            session,
            gesture: Gesture::new(),
            current,
            overlay,
        })
    }

    /// メニューを繰り返し表示
    pub async fn run(mut self) -> Result<Session<S>> {
        view::print_floor(&self.current, self.session.assignments(), &OfficeFilter::default());

        loop {
            let labels: Vec<&str> = MenuAction::ALL.iter().map(|a| a.label()).collect();
            let choice = Select::new()
                .with_prompt(format!("フロア {} の操作", self.current.floor))
                .items(&labels)
                .default(0)
                .interact_opt()
                .map_err(prompt_err)?;

            let action = match choice {
                Some(idx) => MenuAction::ALL[idx],
                None => MenuAction::Quit,
            };

            match action {
                MenuAction::MoveRoom => self.move_room().await?,
                MenuAction::MoveTag => self.move_tag()?,
                MenuAction::SwitchFloor => {
                    if let Some(floor) = self.choose_floor("切り替えるフロア")? {
                        self.switch_floor(&floor).await?;
                        view::print_floor(
                            &self.current,
                            self.session.assignments(),
                            &OfficeFilter::default(),
                        );
                    }
                }
                MenuAction::ShowAssignments => view::print_assignments(self.session.assignments()),
                MenuAction::ShowLog => view::print_change_log(self.session.change_log(), 20),
                MenuAction::Quit => break,
            }
            println!();
        }

        Ok(self.session)
    }

    async fn switch_floor(&mut self, floor: &str) -> Result<()> {
        let resources = self.floors.get(floor)?;
        println!("- フロア {} を読み込み中...", floor);
        // 読み込み完了まで待ってから差し替える
        self.current = load_floor(self.source, floor, resources).await;
        self.overlay = self.current.overlay();
        Ok(())
    }

    fn choose_floor(&self, prompt: &str) -> Result<Option<String>> {
        let floors = self.floors.floors();
        let default = floors
            .iter()
            .position(|f| *f == self.current.floor)
            .unwrap_or(0);
        let choice = Select::new()
            .with_prompt(prompt)
            .items(&floors)
            .default(default)
            .interact_opt()
            .map_err(prompt_err)?;
        Ok(choice.map(|idx| floors[idx].to_string()))
    }

    fn choose_room(&self, prompt: &str) -> Result<Option<String>> {
        let ids = view::room_ids(&self.current);
        if ids.is_empty() {
            println!("⚠ フロア {} に部屋データがありません", self.current.floor);
            return Ok(None);
        }

        let labels: Vec<String> = ids
            .iter()
            .map(|id| match self.current.room(id) {
                Some(room) => view::room_label(room, &self.current, self.session.assignments()),
                None => id.clone(),
            })
            .collect();

        let choice = Select::new()
            .with_prompt(prompt)
            .items(&labels)
            .default(0)
            .max_length(15)
            .interact_opt()
            .map_err(prompt_err)?;
        Ok(choice.map(|idx| ids[idx].clone()))
    }

    async fn move_room(&mut self) -> Result<()> {
        let Some(dragged) = self.choose_room("ドラッグする部屋 (Esc:キャンセル)")? else {
            return Ok(());
        };
        self.gesture.start(&self.current.floor, &dragged);
        if !self.gesture.is_dragging() {
            return Ok(());
        }

        if self.floors.len() > 1 {
            match self.choose_floor("ドロップ先のフロア")? {
                Some(floor) if floor != self.current.floor => self.switch_floor(&floor).await?,
                Some(_) => {}
                None => {
                    self.cancel_drag();
                    return Ok(());
                }
            }
        }

        // 確認で「いいえ」なら候補から離れて選び直す
        let target = loop {
            let Some(target) = self.choose_room("ドロップ先の部屋 (Esc:キャンセル)")? else {
                self.cancel_drag();
                return Ok(());
            };
            self.gesture.hover(&target);

            let floor = &self.current.floor;
            let Some(prompt) = self
                .gesture
                .source()
                .zip(self.gesture.hovered())
                .map(|(source, hovered)| {
                    format!(
                        "{} - {} を {} - {} にドロップしますか",
                        source.floor, source.room_id, floor, hovered
                    )
                })
            else {
                self.cancel_drag();
                return Ok(());
            };
            match Confirm::new()
                .with_prompt(prompt)
                .default(true)
                .interact_opt()
                .map_err(prompt_err)?
            {
                Some(true) => break target,
                Some(false) => self.gesture.leave(),
                None => {
                    self.cancel_drag();
                    return Ok(());
                }
            }
        };

        let Some(intent) = self.gesture.drop_on(&self.current.floor, &target) else {
            return Ok(());
        };

        match self.session.apply_drop(&intent, now_millis())? {
            DropOutcome::Swapped(entry) => println!("  ✔ {} → {}", entry.from, entry.to),
            DropOutcome::Ignored => println!("  → 同じ部屋のため変更なし"),
        }
        Ok(())
    }

    fn cancel_drag(&mut self) {
        self.gesture.cancel();
        println!("  → キャンセル");
    }

    fn move_tag(&mut self) -> Result<()> {
        if self.overlay.is_empty() {
            println!("⚠ フロア {} にタグがありません", self.overlay.floor());
            return Ok(());
        }

        let labels: Vec<String> = self
            .overlay
            .tags()
            .iter()
            .map(|t| format!("{} ({}, {})", t.id, t.x, t.y))
            .collect();
        let Some(idx) = Select::new()
            .with_prompt("移動するタグ (Esc:キャンセル)")
            .items(&labels)
            .default(0)
            .max_length(15)
            .interact_opt()
            .map_err(prompt_err)?
        else {
            return Ok(());
        };

        // ドラッグと同じく移動量で指定し、整数座標に丸める
        let tag = self.overlay.tags()[idx].clone();
        let dx: f64 = Input::new()
            .with_prompt("x方向の移動量")
            .default(0.0)
            .interact_text()
            .map_err(prompt_err)?;
        let dy: f64 = Input::new()
            .with_prompt("y方向の移動量")
            .default(0.0)
            .interact_text()
            .map_err(prompt_err)?;

        if let Some((x, y)) = self.overlay.drag_by(&tag.id, (tag.x, tag.y), (dx, dy)) {
            println!("  ✔ {} を ({}, {}) へ移動", tag.id, x, y);
        }
        Ok(())
    }
}
