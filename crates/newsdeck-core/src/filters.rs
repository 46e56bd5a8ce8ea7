/// A checkbox in the discover screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOption {
    pub id: usize,
    pub label: String,
    /// What gets sent to the API (category slug or country code)
    pub value: String,
    pub selected: bool,
}

/// Categories newsdata.io understands, as (title, slug)
pub const CATEGORIES: &[(&str, &str)] = &[
    ("All", ""),
    ("Politics", "politics"),
    ("Science", "science"),
    ("Entertainment", "entertainment"),
    ("Sports", "sports"),
    ("Technology", "technology"),
    ("Business", "business"),
    ("Health", "health"),
    ("Environment", "environment"),
    ("Food", "food"),
    ("World", "world"),
];

/// Countries offered in the discover screen, as (name, code)
pub const COUNTRIES: &[(&str, &str)] = &[
    ("India", "in"),
    ("United States", "us"),
    ("United Kingdom", "gb"),
    ("Canada", "ca"),
    ("Australia", "au"),
    ("Germany", "de"),
    ("France", "fr"),
    ("Japan", "jp"),
    ("Brazil", "br"),
    ("South Africa", "za"),
];

/// Toggleable list of filter options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSet {
    options: Vec<FilterOption>,
}

impl FilterSet {
    fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let options = pairs
            .iter()
            .enumerate()
            .map(|(id, (label, value))| FilterOption {
                id,
                label: label.to_string(),
                value: value.to_string(),
                selected: false,
            })
            .collect();
        Self { options }
    }

    /// Category filters, minus the "All" pseudo-category
    pub fn categories() -> Self {
        Self::from_pairs(&CATEGORIES[1..])
    }

    pub fn countries() -> Self {
        Self::from_pairs(COUNTRIES)
    }

    pub fn options(&self) -> &[FilterOption] {
        &self.options
    }

    /// Flip one option. Returns the new state, or `None` for an unknown id.
    pub fn toggle(&mut self, id: usize) -> Option<bool> {
        let option = self.options.iter_mut().find(|o| o.id == id)?;
        option.selected = !option.selected;
        Some(option.selected)
    }

    /// Select by API value (slug or code); unknown values are ignored
    pub fn select_value(&mut self, value: &str) -> bool {
        match self
            .options
            .iter_mut()
            .find(|o| o.value.eq_ignore_ascii_case(value.trim()))
        {
            Some(option) => {
                option.selected = true;
                true
            }
            None => false,
        }
    }

    pub fn selected_values(&self) -> Vec<&str> {
        self.options
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.value.as_str())
            .collect()
    }

    /// Comma-joined selection in list order for the query string, `None`
    /// when nothing is selected
    pub fn query_value(&self) -> Option<String> {
        let values = self.selected_values();
        if values.is_empty() {
            None
        } else {
            Some(values.join(","))
        }
    }
}
