use std::fmt;

use crate::analysis::MealEstimate;
use crate::meals::{DailyTotal, MealRecord};

pub const DAILY_PROTEIN_TARGET: f64 = 300.0;

pub const NO_RECORDS_TODAY: &str = "【今日尚無記錄】

開始拍照上傳食物，我會幫你記錄熱量與蛋白質。";

const BAR_SEGMENTS: usize = 10;
const CHICKEN_PROTEIN_PER_100G: f64 = 31.0;
const CHICKEN_MIN_GAP: f64 = 50.0;
const WHEY_PROTEIN_PER_SERVING: f64 = 25.0;
const EGG_PROTEIN: f64 = 6.0;
const MAX_EGGS: u32 = 10;

pub fn progress_percent(protein: f64) -> f64 {
    100.0 * protein / DAILY_PROTEIN_TARGET
}

/// `[███░░░░░░░]`, one segment per 10%, capped at 10 filled.
pub fn progress_bar(percent: f64) -> String {
    let filled = ((percent / 10.0).floor().max(0.0) as usize).min(BAR_SEGMENTS);
    format!("[{}{}]", "█".repeat(filled), "░".repeat(BAR_SEGMENTS - filled))
}

/// Supplementary foods that would close today's protein gap.
#[derive(Debug, Clone, PartialEq)]
pub enum GapFiller {
    TargetMet,
    Suggestions {
        remaining: f64,
        chicken_grams: Option<u32>,
        whey_servings: Option<u32>,
        eggs: Option<u32>,
    },
}

impl GapFiller {
    pub fn for_protein(current_protein: f64) -> Self {
        Self::for_remaining(DAILY_PROTEIN_TARGET - current_protein)
    }

    pub fn for_remaining(remaining: f64) -> Self {
        if remaining <= 0.0 {
            return GapFiller::TargetMet;
        }

        let chicken_grams = (remaining >= CHICKEN_MIN_GAP)
            .then(|| (remaining / CHICKEN_PROTEIN_PER_100G * 100.0).round() as u32);
        let whey = (remaining / WHEY_PROTEIN_PER_SERVING).floor() as u32;
        let eggs = (remaining / EGG_PROTEIN).floor() as u32;

        GapFiller::Suggestions {
            remaining,
            chicken_grams,
            whey_servings: (whey > 0).then_some(whey),
            eggs: (eggs > 0 && eggs <= MAX_EGGS).then_some(eggs),
        }
    }
}

impl fmt::Display for GapFiller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let GapFiller::Suggestions {
            remaining,
            chicken_grams,
            whey_servings,
            eggs,
        } = self
        else {
            return write!(f, "恭喜達標!明天繼續保持!");
        };

        let mut items = Vec::new();
        if let Some(g) = chicken_grams {
            items.push(format!("  - 雞胸肉 {g}g (約{:.0}份)", f64::from(*g) / 100.0));
        }
        if let Some(n) = whey_servings {
            items.push(format!("  - 乳清蛋白 {n} 份"));
        }
        if let Some(n) = eggs {
            items.push(format!("  - 雞蛋 {n} 顆"));
        }

        writeln!(f, "Gap Filler 建議 (還缺 {remaining:.0}g):")?;
        writeln!(f)?;
        if items.is_empty() {
            writeln!(f, "差一點點就達標，隨手補充一點蛋白質即可。")?;
        } else {
            writeln!(f, "可選擇以下任一補充:")?;
            writeln!(f, "{}", items.join("\n"))?;
        }
        writeln!(f)?;
        write!(f, "睡前記得補充!")
    }
}

/// One-line nudge shown after every recorded meal.
pub fn quick_tip(current_protein: f64) -> String {
    let remaining = DAILY_PROTEIN_TARGET - current_protein;
    if remaining <= 0.0 {
        "太棒了!已達成今日目標!".to_string()
    } else if remaining <= 50.0 {
        format!("再補充 {remaining:.0}g 就達標囉!")
    } else if remaining <= 100.0 {
        format!("還需要 {remaining:.0}g,可以吃一份雞胸肉(約50g蛋白質)")
    } else {
        format!("還缺 {remaining:.0}g,建議增加高蛋白食物攝取")
    }
}

fn totals_block(total: &DailyTotal) -> String {
    let percent = progress_percent(total.protein);
    format!(
        "  總熱量    {:.0} kcal\n  總蛋白質  {:.1} g / {:.0} g\n  達成率    {:.1}%\n\n{}",
        total.calories,
        total.protein,
        DAILY_PROTEIN_TARGET,
        percent,
        progress_bar(percent)
    )
}

/// Reply sent right after a photo has been analyzed and stored.
pub fn meal_reply(meal: &MealEstimate, today: &DailyTotal) -> String {
    format!(
        "【本餐已記錄】\n\n━━━ 本餐內容 ━━━\n{}\n\n━━━ 本餐營養 ━━━\n  熱量    {:.0} kcal\n  蛋白質  {:.1} g\n\n━━━ 今日累計 ━━━\n{}\n\n{}",
        meal.description,
        meal.calories,
        meal.protein,
        totals_block(today),
        quick_tip(today.protein)
    )
}

/// Full day summary; callers handle the no-meals case.
pub fn daily_summary(meals: &[MealRecord], total: &DailyTotal) -> String {
    let list = meals
        .iter()
        .enumerate()
        .map(|(i, m)| {
            format!(
                "  {}. {}\n     蛋白質 {:.1}g · 熱量 {:.0}kcal",
                i + 1,
                m.description,
                m.protein,
                m.calories
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "【今日營養總結】\n\n━━━ 今日餐點 ━━━\n{}\n\n━━━ 今日總計 ━━━\n{}\n\n{}",
        list,
        totals_block(total),
        GapFiller::for_protein(total.protein)
    )
}
