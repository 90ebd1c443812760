use std::fmt;

/// Placeholder written for any field that could not be extracted.
pub const SENTINEL: &str = "N/A";

/// The fixed field schema of an item, in column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    CriticScore,
    AudienceScore,
    AvailabilityDate,
}

impl Field {
    pub const ALL: [Field; 4] = [
        Field::Title,
        Field::CriticScore,
        Field::AudienceScore,
        Field::AvailabilityDate,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::CriticScore => "critic_score",
            Field::AudienceScore => "audience_score",
            Field::AvailabilityDate => "availability_date",
        }
    }

    /// Header used for this field in the output table.
    pub const fn column(self) -> &'static str {
        match self {
            Field::Title => "Title",
            Field::CriticScore => "Tomatometer",
            Field::AudienceScore => "Popcornmeter",
            Field::AvailabilityDate => "Streaming Start",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw value of one field: trimmed page text, or the missing marker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum FieldValue {
    Text(String),
    #[default]
    Missing,
}

impl FieldValue {
    /// Trims the text; empty text and the literal sentinel both collapse to `Missing`.
    pub fn from_text(text: impl AsRef<str>) -> Self {
        let trimmed = text.as_ref().trim();
        if trimmed.is_empty() || trimmed == SENTINEL {
            FieldValue::Missing
        } else {
            FieldValue::Text(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FieldValue::Text(text) => text,
            FieldValue::Missing => SENTINEL,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            FieldValue::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }
}

impl From<Option<String>> for FieldValue {
    fn from(value: Option<String>) -> Self {
        value.map(FieldValue::from_text).unwrap_or_default()
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One extracted item. Built once, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemRecord {
    title: FieldValue,
    critic_score: FieldValue,
    audience_score: FieldValue,
    availability_date: FieldValue,
}

impl ItemRecord {
    pub fn new(
        title: FieldValue,
        critic_score: FieldValue,
        audience_score: FieldValue,
        availability_date: FieldValue,
    ) -> Self {
        Self {
            title,
            critic_score,
            audience_score,
            availability_date,
        }
    }

    /// A record carrying only its title; every other field is missing.
    pub fn titled(title: FieldValue) -> Self {
        Self::new(
            title,
            FieldValue::Missing,
            FieldValue::Missing,
            FieldValue::Missing,
        )
    }

    /// Convenience constructor from raw strings; `"N/A"` and blanks become missing.
    pub fn from_raw(title: &str, critic_score: &str, audience_score: &str, date: &str) -> Self {
        Self::new(
            FieldValue::from_text(title),
            FieldValue::from_text(critic_score),
            FieldValue::from_text(audience_score),
            FieldValue::from_text(date),
        )
    }

    pub fn get(&self, field: Field) -> &FieldValue {
        match field {
            Field::Title => &self.title,
            Field::CriticScore => &self.critic_score,
            Field::AudienceScore => &self.audience_score,
            Field::AvailabilityDate => &self.availability_date,
        }
    }

    pub fn title(&self) -> &FieldValue {
        &self.title
    }

    /// Fields in schema order.
    pub fn fields(&self) -> impl Iterator<Item = (Field, &FieldValue)> + '_ {
        Field::ALL.into_iter().map(move |field| (field, self.get(field)))
    }

    /// Normalized identity key, or `None` when the title is missing.
    pub fn identity_key(&self) -> Option<String> {
        self.title.text().and_then(normalize_key)
    }
}

/// Collapses inner whitespace and case-folds; blank input has no key.
pub fn normalize_key(raw: &str) -> Option<String> {
    let key = raw
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    if key.is_empty() || key == SENTINEL.to_lowercase() {
        None
    } else {
        Some(key)
    }
}
