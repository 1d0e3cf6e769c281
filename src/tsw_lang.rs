// UI strings for English and Chinese
// The language follows the system locale; anything other than Chinese falls back to English

#[derive(Clone)]
pub struct Assets {
    pub title: &'static str,

    // Help rows above and below the board
    pub help_loss: &'static str,
    pub help_win: &'static str,
    pub help_mark: &'static str,
    pub help_quit: &'static str,

    // Status line after a round ends
    pub win_message: &'static str,
    pub loss_message: &'static str,

    // Terminal size messages
    pub tsmsg_title: &'static str,
    pub tsmsg_line1: &'static str,
    pub tsmsg_line2_fmt: &'static str, // "Minimum required: {} x {}"
}

/// Returns English language assets
pub fn english_assets() -> Assets {
    Assets {
        title: "Minesweeper",

        help_loss: "Game reveals all mines upon a game over, then restarts automatically",
        help_win: "Game will tell you if you win, then restart automatically",
        help_mark: "Hold Space to mark cells you think are mines. You CAN lose instantly",
        help_quit: "Esc: Exit",

        win_message: "You WIN!",
        loss_message: "Boom! All mines revealed",

        tsmsg_title: "Resize Terminal",
        tsmsg_line1: "Terminal size too small.",
        tsmsg_line2_fmt: "Minimum required: {} x {}",
    }
}

/// Returns Chinese language assets
pub fn chinese_assets() -> Assets {
    Assets {
        title: "扫雷",

        help_loss: "踩雷后显示全部地雷，随后自动重新开始",
        help_win: "获胜时会提示，随后自动重新开始",
        help_mark: "按住空格标记你认为有雷的格子，点开仍会立即踩雷",
        help_quit: "Esc: 退出",

        win_message: "你赢了！",
        loss_message: "踩雷了！已显示全部地雷",

        tsmsg_title: "调整终端大小",
        tsmsg_line1: "终端窗口太小。",
        tsmsg_line2_fmt: "至少需要: {} x {}",
    }
}

/// Active language code and its strings
pub struct Lang {
    pub current_lang: String,
    pub assets: Assets,
}

impl Lang {
    /// Creates a new Lang instance from a language code
    /// Normalizes input (e.g., "zh-CN" → "zh") and defaults to English for unsupported languages
    pub fn new(lang_code: &str) -> Self {
        let code = if lang_code.to_lowercase().starts_with("zh") { "zh" } else { "en" };
        Lang {
            current_lang: code.to_string(),
            assets: if code == "zh" { chinese_assets() } else { english_assets() },
        }
    }

    /// Language of the current system locale
    pub fn detect() -> Self {
        let locale = sys_locale::get_locale().unwrap_or_else(|| "en".to_string());
        Lang::new(&locale)
    }

    pub fn min_size_message(&self, w: u16, h: u16) -> String {
        self.assets
            .tsmsg_line2_fmt
            .replacen("{}", &w.to_string(), 1)
            .replacen("{}", &h.to_string(), 1)
    }
}
