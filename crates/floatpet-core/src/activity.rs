//! Activity detection
//!
//! Maps the foreground window title to a coarse activity category so the
//! phrase library can pick contextually relevant lines.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SettingsError};

/// Title reported when the platform cannot tell
pub const UNKNOWN_WINDOW_TITLE: &str = "unknown window";

/// Inferred user activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    General,
    Coding,
    Browsing,
    Video,
    Office,
    Gaming,
    System,
    Chat,
    Music,
    Reading,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::General,
        Category::Coding,
        Category::Browsing,
        Category::Video,
        Category::Office,
        Category::Gaming,
        Category::System,
        Category::Chat,
        Category::Music,
        Category::Reading,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Category::General => "general",
            Category::Coding => "coding",
            Category::Browsing => "browsing",
            Category::Video => "video",
            Category::Office => "office",
            Category::Gaming => "gaming",
            Category::System => "system",
            Category::Chat => "chat",
            Category::Music => "music",
            Category::Reading => "reading",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Category {
    type Err = SettingsError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.key() == s.trim())
            .ok_or_else(|| SettingsError::UnknownCategory(s.to_string()))
    }
}

/// Ordered keyword table. The first category with any matching keyword wins.
/// Keywords are matched as lowercase substrings of the title.
pub const KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Coding,
        &[
            "vscode", "visual studio", "pycharm", "intellij", "eclipse", "sublime", "notepad++",
            "vim", "emacs", "atom", "code", "编辑器", "editor", "ide",
        ],
    ),
    (
        Category::Browsing,
        &[
            "chrome", "firefox", "edge", "safari", "opera", "浏览器", "browser",
            "internet explorer", "百度", "google", "bing", "搜索", "search",
        ],
    ),
    (
        Category::Video,
        &[
            "video", "youtube", "bilibili", "哔哩哔哩", "优酷", "腾讯视频", "爱奇艺", "netflix",
            "播放器", "player", "movie", "电影", "视频",
        ],
    ),
    (
        Category::Office,
        &[
            "word", "excel", "powerpoint", "office", "文档", "表格", "演示", "document",
            "spreadsheet", "presentation", "wps", "金山", "pdf",
        ],
    ),
    (
        Category::Gaming,
        &[
            "game", "steam", "epic", "origin", "uplay", "battle.net", "游戏", "lol", "dota", "cs",
            "minecraft", "我的世界",
        ],
    ),
    (
        Category::System,
        &[
            "设置", "控制面板", "任务管理器", "资源管理器", "settings", "control panel",
            "task manager", "explorer", "system", "系统",
        ],
    ),
    (
        Category::Chat,
        &[
            "微信", "qq", "wechat", "telegram", "whatsapp", "discord", "slack", "teams", "聊天",
            "chat", "消息", "message",
        ],
    ),
    (
        Category::Music,
        &[
            "music", "spotify", "网易云音乐", "qq音乐", "酷狗", "酷我", "apple music", "itunes",
            "音乐", "播放器", "player",
        ],
    ),
    (
        Category::Reading,
        &[
            "reader", "pdf", "book", "阅读器", "电子书", "kindle", "小说", "novel", "article",
            "文章",
        ],
    ),
];

/// Classify a window title
pub fn classify(title: &str) -> Category {
    let title = title.to_lowercase();

    KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| title.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::General)
}

/// Source of the foreground window title
pub trait WindowTitleSource: Send + Sync {
    fn active_window_title(&self) -> Result<String>;
}

/// Caches the most recent classification
#[derive(Clone, Default)]
pub struct ActivityMonitor {
    current: Arc<Mutex<Category>>,
}

impl ActivityMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Category {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Re-classify the foreground window.
    /// Returns the new category when it changed. A failed query is logged
    /// and treated as [`UNKNOWN_WINDOW_TITLE`], which classifies as general.
    /// Empty titles leave the category unchanged.
    pub fn refresh(&self, source: &dyn WindowTitleSource) -> Option<Category> {
        let title = match source.active_window_title() {
            Ok(title) => title,
            Err(e) => {
                tracing::error!("Failed to read active window title: {}", e);
                UNKNOWN_WINDOW_TITLE.to_string()
            }
        };

        if title.is_empty() {
            return None;
        }

        let category = classify(&title);
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if *current == category {
            return None;
        }

        tracing::info!("Current activity category: {}", category);
        *current = category;
        Some(category)
    }
}
