pub const COUNTIES_URL: &str =
    "https://cdn.freecodecamp.org/testable-projects-fcc/data/choropleth_map/counties.json";
pub const EDUCATION_URL: &str =
    "https://cdn.freecodecamp.org/testable-projects-fcc/data/choropleth_map/for_user_education.json";

/// Query parameters that override the dataset URLs, e.g. `?counties=/local/counties.json`.
pub const COUNTIES_PARAM: &str = "counties";
pub const EDUCATION_PARAM: &str = "education";

/// Where the two datasets are fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSources {
    pub counties: String,
    pub education: String,
}

impl Default for DataSources {
    fn default() -> Self {
        Self {
            counties: COUNTIES_URL.to_string(),
            education: EDUCATION_URL.to_string(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl DataSources {
    /// Apply overrides; missing or blank values keep the defaults.
    pub fn with_overrides(counties: Option<String>, education: Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            counties: non_blank(counties).unwrap_or(defaults.counties),
            education: non_blank(education).unwrap_or(defaults.education),
        }
    }

    /// Resolve from the current page's query string.
    pub fn from_location() -> Self {
        let params = web_sys::window()
            .and_then(|w| w.location().search().ok())
            .and_then(|search| web_sys::UrlSearchParams::new_with_str(&search).ok());
        let Some(params) = params else {
            return Self::default();
        };
        Self::with_overrides(params.get(COUNTIES_PARAM), params.get(EDUCATION_PARAM))
    }
}

#[cfg(test)]
mod tests {
    use super::{COUNTIES_URL, DataSources, EDUCATION_URL};

    #[test]
    fn defaults_point_at_public_datasets() {
        let sources = DataSources::default();
        assert_eq!(sources.counties, COUNTIES_URL);
        assert_eq!(sources.education, EDUCATION_URL);
    }

    #[test]
    fn overrides_replace_defaults() {
        let sources = DataSources::with_overrides(
            Some("/data/counties.json".into()),
            Some(" /data/education.json ".into()),
        );
        assert_eq!(sources.counties, "/data/counties.json");
        assert_eq!(sources.education, "/data/education.json");
    }

    #[test]
    fn blank_overrides_are_ignored() {
        let sources = DataSources::with_overrides(Some("   ".into()), None);
        assert_eq!(sources, DataSources::default());
    }
}
