//! 割り当てセッション
//!
//! 割り当てと変更履歴を状態ストアから復元し、ドロップのたびに入れ替え・履歴追加・保存を行う。
//! 保存は後勝ちで、トランザクションや複数プロセス間の調停は無い。

use crate::assignment::{AssignmentMap, SwapPolicy};
use crate::change_log::ChangeLog;
use crate::error::Result;
use crate::gesture::DropIntent;
use crate::store::{StateStore, ASSIGNMENTS_KEY, CHANGE_LOG_KEY};
use crate::types::ChangeLogEntry;
use serde::de::DeserializeOwned;

/// ドロップの結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// 同じ部屋・空IDなどで何もしなかった
    Ignored,
    /// 入れ替えて履歴を追加した
    Swapped(ChangeLogEntry),
}

/// 割り当てセッション
#[derive(Debug)]
pub struct Session<S: StateStore> {
    store: S,
    policy: SwapPolicy,
    assignments: AssignmentMap,
    change_log: ChangeLog,
    warnings: Vec<String>,
}

impl<S: StateStore> Session<S> {
    /// ストアから復元（無い・壊れている場合は空で始める）
    pub fn restore(store: S, policy: SwapPolicy) -> Self {
        let mut warnings: Vec<String> = store.load_warning().into_iter().collect();
        let assignments = read_key(&store, ASSIGNMENTS_KEY, &mut warnings);
        let change_log = read_key(&store, CHANGE_LOG_KEY, &mut warnings);

        Self {
            store,
            policy,
            assignments,
            change_log,
            warnings,
        }
    }

    /// ドロップを適用
    pub fn apply_drop(&mut self, intent: &DropIntent, timestamp_ms: i64) -> Result<DropOutcome> {
        if intent.is_self_drop() {
            log::debug!("同じ部屋へのドロップ: {}", intent.target.room_id);
            return Ok(DropOutcome::Ignored);
        }

        let swapped = self.assignments.swap(
            &intent.source.room_id,
            &intent.target.room_id,
            self.policy,
        );
        if !swapped {
            log::debug!("ドロップを無視: {} → {}", intent.source, intent.target);
            return Ok(DropOutcome::Ignored);
        }

        let entry = ChangeLogEntry::new(timestamp_ms, &intent.source, &intent.target);
        self.change_log.append(entry.clone());
        log::debug!("入れ替え: {} → {}", entry.from, entry.to);

        self.persist()?;
        Ok(DropOutcome::Swapped(entry))
    }

    /// 割り当てと変更履歴を丸ごと書き込む
    pub fn persist(&mut self) -> Result<()> {
        let assignments = serde_json::to_string(&self.assignments)?;
        self.store.set(ASSIGNMENTS_KEY, &assignments)?;

        let change_log = serde_json::to_string(&self.change_log)?;
        self.store.set(CHANGE_LOG_KEY, &change_log)?;
        Ok(())
    }

    pub fn assignments(&self) -> &AssignmentMap {
        &self.assignments
    }

    pub fn change_log(&self) -> &ChangeLog {
        &self.change_log
    }

    pub fn policy(&self) -> SwapPolicy {
        self.policy
    }

    /// 復元時の警告（壊れたデータを空扱いにした等）
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

fn read_key<T, S>(store: &S, key: &str, warnings: &mut Vec<String>) -> T
where
    T: DeserializeOwned + Default,
    S: StateStore,
{
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(e) => {
            log::warn!("{} の読み込みに失敗、空で開始します: {}", key, e);
            warnings.push(format!("{}: {}", key, e));
            return T::default();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("{} の解析に失敗、空で開始します: {}", key, e);
            warnings.push(format!("{}: {}", key, e));
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::Gesture;
    use crate::store::MemoryStore;
    use crate::types::RoomRef;

    fn intent(from: &str, to: &str) -> DropIntent {
        DropIntent::new(RoomRef::new("3", from), RoomRef::new("3", to))
    }

    #[test]
    fn test_restore_empty() {
        let session = Session::restore(MemoryStore::new(), SwapPolicy::Legacy);
        assert!(session.assignments().is_empty());
        assert!(session.change_log().is_empty());
        assert!(session.warnings().is_empty());
    }

    #[test]
    fn test_drop_scenario() {
        let mut session = Session::restore(MemoryStore::new(), SwapPolicy::Legacy);

        let outcome = session.apply_drop(&intent("101", "102"), 1000).unwrap();
        let DropOutcome::Swapped(entry) = outcome else {
            panic!("入れ替えされるはず");
        };
        assert!(entry.from.contains("101"));
        assert!(entry.to.contains("102"));
        assert_eq!(session.assignments().get("102"), Some("101"));
        assert_eq!(session.assignments().len(), 1);
        assert_eq!(session.change_log().len(), 1);

        session.apply_drop(&intent("103", "102"), 2000).unwrap();
        assert_eq!(session.assignments().get("102"), Some("103"));
        assert_eq!(session.assignments().get("103"), Some("101"));
        assert_eq!(session.change_log().len(), 2);
    }

    #[test]
    fn test_self_drop_changes_nothing() {
        let mut session = Session::restore(MemoryStore::new(), SwapPolicy::Legacy);
        session.apply_drop(&intent("101", "102"), 1).unwrap();
        let before = session.assignments().clone();

        let outcome = session.apply_drop(&intent("102", "102"), 2).unwrap();
        assert_eq!(outcome, DropOutcome::Ignored);
        assert_eq!(session.assignments(), &before);
        assert_eq!(session.change_log().len(), 1);
    }

    #[test]
    fn test_log_grows_by_one_per_swap() {
        let mut session = Session::restore(MemoryStore::new(), SwapPolicy::Exclusive);
        let pairs = [("1", "2"), ("2", "3"), ("3", "3"), ("4", "1"), ("", "1")];
        let mut swaps = 0;
        for (i, (from, to)) in pairs.iter().enumerate() {
            if let DropOutcome::Swapped(_) = session.apply_drop(&intent(from, to), i as i64).unwrap() {
                swaps += 1;
            }
        }
        assert_eq!(swaps, 3);
        assert_eq!(session.change_log().len(), 3);
    }

    #[test]
    fn test_persistence_round_trip() {
        let mut store = MemoryStore::new();
        {
            let mut session = Session::restore(&mut store, SwapPolicy::Legacy);
            session.apply_drop(&intent("101", "102"), 10).unwrap();
            session.apply_drop(&intent("103", "102"), 20).unwrap();
        }

        let reloaded = Session::restore(&mut store, SwapPolicy::Legacy);
        assert_eq!(reloaded.assignments().get("102"), Some("103"));
        assert_eq!(reloaded.assignments().get("103"), Some("101"));
        assert_eq!(reloaded.change_log().len(), 2);
        assert_eq!(reloaded.change_log().entries()[1].timestamp, 20);
    }

    #[test]
    fn test_corrupted_state_starts_empty_with_warning() {
        let mut store = MemoryStore::new();
        store.set(ASSIGNMENTS_KEY, "{ invalid json }").unwrap();
        store.set(CHANGE_LOG_KEY, "null").unwrap();

        let session = Session::restore(store, SwapPolicy::Legacy);
        assert!(session.assignments().is_empty());
        assert!(session.change_log().is_empty());
        assert_eq!(session.warnings().len(), 2);
    }

    /// 開くときに読めなかったストア
    struct UnreadableStore(MemoryStore);

    impl StateStore for UnreadableStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.0.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<()> {
            self.0.set(key, value)
        }

        fn remove(&mut self, key: &str) -> Result<()> {
            self.0.remove(key)
        }

        fn load_warning(&self) -> Option<String> {
            Some("state.json: broken".into())
        }
    }

    #[test]
    fn test_store_load_warning_is_kept() {
        let session = Session::restore(UnreadableStore(MemoryStore::new()), SwapPolicy::Legacy);
        assert!(session.assignments().is_empty());
        assert_eq!(session.warnings(), ["state.json: broken".to_string()]);
    }

    #[test]
    fn test_gesture_to_session() {
        let mut session = Session::restore(MemoryStore::new(), SwapPolicy::Legacy);
        let mut gesture = Gesture::new();

        gesture.start("3", "101");
        gesture.hover("102");
        let intent = gesture.drop_on("4", "102").unwrap();
        let outcome = session.apply_drop(&intent, 5).unwrap();

        assert_eq!(
            outcome,
            DropOutcome::Swapped(ChangeLogEntry {
                timestamp: 5,
                from: "3 - 101".into(),
                to: "4 - 102".into(),
            })
        );
        assert_eq!(session.store().get(ASSIGNMENTS_KEY).unwrap().as_deref(), Some(r#"{"102":"101"}"#));
    }
}
