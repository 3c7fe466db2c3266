use crate::data::MEDICINE_NAMES;

pub const MIN_QUERY_CHARS: usize = 2;
pub const MAX_SUGGESTIONS: usize = 6;

/// Case-insensitive substring filter over `names`, keeping list order.
pub fn filter_suggestions(names: &[&'static str], query: &str) -> Vec<&'static str> {
    let query = query.trim();
    if query.chars().count() < MIN_QUERY_CHARS {
        return Vec::new();
    }

    let needle = query.to_lowercase();
    names
        .iter()
        .copied()
        .filter(|name| name.to_lowercase().contains(&needle))
        .take(MAX_SUGGESTIONS)
        .collect()
}

/// Suggestion dropdown state: the filtered items plus a visibility flag
/// driven by focus, outside clicks and the query length threshold.
#[derive(Debug, Clone)]
pub struct SuggestionPanel {
    names: &'static [&'static str],
    items: Vec<&'static str>,
    visible: bool,
}

impl Default for SuggestionPanel {
    fn default() -> Self {
        Self::new(MEDICINE_NAMES)
    }
}

impl SuggestionPanel {
    pub fn new(names: &'static [&'static str]) -> Self {
        Self {
            names,
            items: Vec::new(),
            visible: false,
        }
    }

    pub fn update(&mut self, query: &str) {
        self.items = filter_suggestions(self.names, query);
        self.visible = meets_threshold(query);
    }

    pub fn focus(&mut self, query: &str) {
        if meets_threshold(query) {
            self.visible = true;
        }
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn items(&self) -> &[&'static str] {
        &self.items
    }

    /// Whether the dropdown should actually be on screen.
    pub fn is_shown(&self) -> bool {
        self.visible && !self.items.is_empty()
    }
}

fn meets_threshold(query: &str) -> bool {
    query.trim().chars().count() >= MIN_QUERY_CHARS
}

/// Axis-aligned bounds of the search container, used to detect outside clicks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substring_match_is_case_insensitive() {
        const NAMES: &[&str] = &["Amiodarone", "Amoxicillin", "Tramadol", "Vitamin D"];
        assert_eq!(filter_suggestions(NAMES, "AMI"), vec!["Amiodarone", "Vitamin D"]);
        assert_eq!(filter_suggestions(MEDICINE_NAMES, "AMO"), vec!["Amoxicillin", "Paracetamol"]);
        assert_eq!(filter_suggestions(MEDICINE_NAMES, "amo"), filter_suggestions(MEDICINE_NAMES, "AMO"));
    }

    #[test]
    fn matches_keep_list_order_and_cap_at_six() {
        let hits = filter_suggestions(MEDICINE_NAMES, "in");
        assert_eq!(hits.len(), MAX_SUGGESTIONS);
        assert_eq!(
            hits,
            vec!["Amlodipine", "Amoxicillin", "Aspirin", "Atorvastatin", "Azithromycin", "Ciprofloxacin"]
        );
    }

    #[test]
    fn short_queries_yield_nothing() {
        assert!(filter_suggestions(MEDICINE_NAMES, "a").is_empty());
        assert!(filter_suggestions(MEDICINE_NAMES, "  a  ").is_empty());
        assert!(filter_suggestions(MEDICINE_NAMES, "").is_empty());
    }

    #[test]
    fn query_is_trimmed_before_matching() {
        assert_eq!(filter_suggestions(MEDICINE_NAMES, "  warf "), vec!["Warfarin"]);
    }

    #[test]
    fn panel_hides_below_threshold() {
        let mut panel = SuggestionPanel::default();
        panel.update("asp");
        assert!(panel.is_shown());
        assert_eq!(panel.items(), &["Aspirin"]);

        panel.update("a");
        assert!(!panel.is_shown());
        assert!(panel.items().is_empty());
    }

    #[test]
    fn panel_with_no_matches_is_not_shown() {
        let mut panel = SuggestionPanel::default();
        panel.update("zzz");
        assert!(!panel.is_shown());
    }

    #[test]
    fn focus_reopens_only_above_threshold() {
        let mut panel = SuggestionPanel::default();
        panel.update("mor");
        panel.hide();
        assert!(!panel.is_shown());

        panel.focus("m");
        assert!(!panel.is_shown());

        panel.focus("mor");
        assert!(panel.is_shown());
    }

    #[test]
    fn bounds_hit_test() {
        let bounds = Bounds { x: 10.0, y: 10.0, width: 100.0, height: 30.0 };
        assert!(bounds.contains(10.0, 10.0));
        assert!(bounds.contains(60.0, 25.0));
        assert!(!bounds.contains(5.0, 25.0));
        assert!(!bounds.contains(60.0, 41.0));
    }
}
