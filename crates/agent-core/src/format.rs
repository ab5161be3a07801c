use once_cell::sync::Lazy;
use regex::Regex;

static STEP_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<indent>\s*)(?P<num>\d+)[.)]\s+(?P<rest>.+)$").expect("step regex"));
static LABEL_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<indent>\s*)(?P<bullet>[-*]\s+)?(?P<label>[^:*][^:]{0,60}?):\s+(?P<rest>\S.*)$")
        .expect("label regex")
});

/// Markdown emphasis for generated answers.
///
/// Numbered step lines get a bold step number, `Label: text` lines get a bold
/// label, every other line passes through unchanged. List markers are kept.
pub fn format_answer(answer: &str) -> String {
    answer
        .lines()
        .map(format_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_line(line: &str) -> String {
    if let Some(caps) = STEP_LINE.captures(line) {
        return format!("{}**{}.** {}", &caps["indent"], &caps["num"], &caps["rest"]);
    }
    if let Some(caps) = LABEL_LINE.captures(line) {
        return format!(
            "{}{}**{}:** {}",
            &caps["indent"],
            caps.name("bullet").map_or("", |bullet| bullet.as_str()),
            caps["label"].trim(),
            &caps["rest"]
        );
    }
    line.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emphasizes_steps_and_labels() {
        let raw = "Procedure:\n1. Label the drum\n2) Store below 25C\nOwner: EHS team\nplain line";
        assert_eq!(
            format_answer(raw),
            "Procedure:\n**1.** Label the drum\n**2.** Store below 25C\n**Owner:** EHS team\nplain line"
        );
    }

    #[test]
    fn keeps_list_markers_on_labelled_items() {
        let raw = "- Owner: QA\n* Deadline: Friday\n  - Scope: all sites";
        assert_eq!(
            format_answer(raw),
            "- **Owner:** QA\n* **Deadline:** Friday\n  - **Scope:** all sites"
        );
    }

    #[test]
    fn leaves_urls_and_times_alone() {
        let raw = "see https://example.com/policy";
        assert_eq!(format_answer(raw), raw);
    }
}
