use crate::error::{FloorAssignError, Result};
use floor_assign_common::{FloorTable, SwapPolicy};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 参照データの取得元を上書きする環境変数
pub const ASSETS_ENV: &str = "FLOOR_ASSIGN_ASSETS";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// 参照データの取得元（ディレクトリまたは http(s) のURL）
    #[serde(default = "default_asset_base")]
    pub asset_base: String,

    /// 状態ファイル（省略時は設定ディレクトリの state.json）
    #[serde(default)]
    pub state_file: Option<PathBuf>,

    #[serde(default = "default_floor")]
    pub default_floor: String,

    #[serde(default)]
    pub swap_policy: SwapPolicy,

    #[serde(default)]
    pub floors: FloorTable,

    /// コマンドライン指定の取得元（保存しない）
    #[serde(skip)]
    pub assets_override: Option<String>,
}

fn default_asset_base() -> String {
    "public".into()
}

fn default_floor() -> String {
    "3".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            asset_base: default_asset_base(),
            state_file: None,
            default_floor: default_floor(),
            swap_policy: SwapPolicy::default(),
            floors: FloorTable::default(),
            assets_override: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| FloorAssignError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("floor-assign"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// 取得元（コマンドライン > 環境変数 > 設定ファイル）
    pub fn asset_base(&self) -> String {
        if let Some(base) = self.assets_override.as_ref().filter(|b| !b.trim().is_empty()) {
            return base.clone();
        }
        match std::env::var(ASSETS_ENV) {
            Ok(base) if !base.trim().is_empty() => base,
            _ => self.asset_base.clone(),
        }
    }

    pub fn state_path(&self) -> Result<PathBuf> {
        match &self.state_file {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::config_dir()?.join("state.json")),
        }
    }

    pub fn set_asset_base(&mut self, base: String) -> Result<()> {
        self.asset_base = base;
        self.save()
    }

    pub fn set_swap_policy(&mut self, policy: SwapPolicy) -> Result<()> {
        self.swap_policy = policy;
        self.save()
    }
}
