/// Inbound text commands. Anything unrecognised is `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Today,
    Help,
    ClearToday,
    WeeklyReport,
    Unknown,
}

impl Command {
    /// Exact, case-sensitive match after trimming surrounding whitespace.
    pub fn classify(text: &str) -> Self {
        match text.trim() {
            "today" | "total" | "今日" | "今日總計" | "總計" => Command::Today,
            "help" | "說明" | "幫助" => Command::Help,
            "clear today" | "清除今日" => Command::ClearToday,
            "weekly report" | "週報" => Command::WeeklyReport,
            _ => Command::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_vocabulary() {
        assert_eq!(Command::classify("today"), Command::Today);
        assert_eq!(Command::classify("total"), Command::Today);
        assert_eq!(Command::classify("今日"), Command::Today);
        assert_eq!(Command::classify("help"), Command::Help);
        assert_eq!(Command::classify("說明"), Command::Help);
        assert_eq!(Command::classify("clear today"), Command::ClearToday);
        assert_eq!(Command::classify("清除今日"), Command::ClearToday);
        assert_eq!(Command::classify("weekly report"), Command::WeeklyReport);
        assert_eq!(Command::classify("週報"), Command::WeeklyReport);
    }

    #[test]
    fn match_is_exact() {
        assert_eq!(Command::classify("  today \n"), Command::Today);
        assert_eq!(Command::classify("Today"), Command::Unknown);
        assert_eq!(Command::classify("today please"), Command::Unknown);
        assert_eq!(Command::classify("clear  today"), Command::Unknown);
        assert_eq!(Command::classify(""), Command::Unknown);
    }
}
