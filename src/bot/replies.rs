pub const HELP: &str = "【飲控機器人 · 使用說明】

━━━ 主要功能 ━━━

  1. 拍照上傳食物
     自動分析熱量與蛋白質並記錄

  2. 輸入「今日」或「總計」
     查看今日營養數據與達成率

  3. 輸入「週報」
     查看本週每日蛋白質攝取圖表

  4. 每晚 23:00
     自動推播每日總結與建議

━━━ 其他指令 ━━━

  清除今日  刪除今日所有記錄
  說明/help  顯示此訊息

━━━━━━━━━━━━━━━━━━━━━━
  目標：每日蛋白質 300g";

pub const GUIDANCE: &str = "請傳送食物照片讓我分析，或輸入「今日」查看總計、「週報」查看本週圖表。";

pub const WEEK_EMPTY: &str = "本週尚無營養記錄，開始拍照記錄後再試「週報」。";

pub const BROADCAST_HEADER: &str = "晚間總結";

pub fn cleared(count: u64) -> String {
    format!("已清除今日所有記錄（共 {count} 筆）")
}

pub fn storage_failed() -> String {
    "【記錄存取失敗】\n\n系統暫時無法存取資料，請稍後再試。".to_string()
}

/// Structured "analysis failed" reply. Internal detail stays in the logs.
pub fn analysis_failed(timed_out: bool) -> String {
    let mut lines = vec![
        "【分析失敗】",
        "",
        "可能原因：",
        "  照片模糊或非食物畫面",
        "  網路不穩，請稍後再試",
        "  服務忙碌，請再傳一次",
        "",
        "若持續失敗，請稍後再試或換一張照片。",
    ];
    if timed_out {
        lines.insert(lines.len() - 1, "  本次為連線逾時");
    }
    lines.join("\n")
}

/// Text-only fallback when the weekly chart cannot be produced.
pub fn chart_failed(reason: &str) -> String {
    let short: String = reason.chars().take(80).collect();
    format!("週報產生失敗，請稍後再試。\n（{short}）")
}
