use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The closed set of prompt categories.
///
/// Stored records keep whatever label was written to disk; this enum is how a
/// label is *interpreted*. Anything unrecognized reads as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Education,
    Marketing,
    Business,
    PersonalDevelopment,
    Creativity,
    Career,
    Technology,
    HealthWellness,
    Other,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Education,
        Category::Marketing,
        Category::Business,
        Category::PersonalDevelopment,
        Category::Creativity,
        Category::Career,
        Category::Technology,
        Category::HealthWellness,
        Category::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Education => "Education",
            Category::Marketing => "Marketing",
            Category::Business => "Business",
            Category::PersonalDevelopment => "Personal Development",
            Category::Creativity => "Creativity",
            Category::Career => "Career",
            Category::Technology => "Technology",
            Category::HealthWellness => "Health & Wellness",
            Category::Other => "Other",
        }
    }

    /// Strict lookup: `None` when the label is not one of the nine values.
    pub fn parse(label: &str) -> Option<Category> {
        let label = label.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(label))
    }

    /// Lenient lookup used everywhere a stored or suggested label is read.
    pub fn from_label(label: &str) -> Category {
        Category::parse(label).unwrap_or(Category::Other)
    }

    /// Comma-separated list of labels, for prompt construction.
    pub fn label_list() -> String {
        Category::ALL
            .iter()
            .map(|c| c.label())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Category::from_label(&label))
    }
}
