// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::Deserialize;
use std::borrow::Cow;
use time::Date;

use crate::ids::ItemId;

/// Shared surface of everything a gallery view can list, filter and open.
pub trait GalleryItem {
    fn id(&self) -> &ItemId;
    fn title(&self) -> &str;
    fn tags(&self) -> &[String];

    /// Every free-text field the search box looks at, in display order.
    /// Absent optional fields are skipped.
    fn search_fields(&self) -> Vec<Cow<'_, str>>;
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImageItem {
    pub id: ItemId,
    pub title: String,
    #[serde(default)]
    pub src: String,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub alt: Option<String>,
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub owner: Option<String>,
    #[serde(default, deserialize_with = "lenient::date")]
    pub created: Option<Date>,
}

impl ImageItem {
    pub fn alt_text(&self) -> &str {
        match self.alt.as_deref() {
            Some(alt) if !alt.is_empty() => alt,
            _ => &self.title,
        }
    }
}

impl GalleryItem for ImageItem {
    fn id(&self) -> &ItemId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        let mut fields = vec![Cow::Borrowed(self.title.as_str())];
        fields.extend(self.owner.as_deref().map(Cow::Borrowed));
        fields.extend(self.notes.as_deref().map(Cow::Borrowed));
        fields.push(Cow::Owned(self.tags.join(" ")));
        fields
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardTone {
    Beige,
    Sand,
    Linen,
}

impl CardTone {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Beige => "beige",
            Self::Sand => "sand",
            Self::Linen => "linen",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Status {
    pub label: String,
    pub value: f64,
}

impl Status {
    /// Source values are not range-checked, so anything drawn from them goes
    /// through here.
    pub fn clamped_value(&self) -> f64 {
        if self.value.is_nan() {
            return 0.0;
        }
        self.value.clamp(0.0, 100.0)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatusCard {
    pub id: ItemId,
    pub name: String,
    #[serde(default, deserialize_with = "lenient::list")]
    pub activities: Vec<String>,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub good: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub weak: Option<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub statuses: Vec<Status>,
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub instagram: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub bio: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub tone: Option<CardTone>,
    #[serde(
        default,
        rename = "iconUrl",
        alias = "icon_url",
        deserialize_with = "lenient::optional"
    )]
    pub icon_url: Option<String>,
}

impl GalleryItem for StatusCard {
    fn id(&self) -> &ItemId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.name
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        let mut fields = vec![
            Cow::Borrowed(self.name.as_str()),
            Cow::Owned(self.activities.join(" ")),
            Cow::Owned(self.tags.join(" ")),
        ];
        fields.extend(self.good.as_deref().map(Cow::Borrowed));
        fields.extend(self.weak.as_deref().map(Cow::Borrowed));
        fields
    }
}

/// How a view remembers which item is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Addressing {
    /// Selection lives only in view state.
    Local,
    /// Selection mirrors the location fragment (`card-<id>`).
    Fragment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Images,
    Cards,
}

impl ViewKind {
    pub const ALL: [Self; 2] = [Self::Images, Self::Cards];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Images => "images",
            Self::Cards => "cards",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "images" => Some(Self::Images),
            "cards" => Some(Self::Cards),
            _ => None,
        }
    }

    pub const fn addressing(self) -> Addressing {
        match self {
            Self::Images => Addressing::Local,
            Self::Cards => Addressing::Fragment,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Browse,
    Search,
}

mod lenient {
    use serde::Deserialize;
    use serde::de::{Deserializer, IgnoredAny};
    use time::Date;
    use time::macros::format_description;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Maybe<T> {
        Value(T),
        Malformed(IgnoredAny),
    }

    impl<T> Maybe<T> {
        fn into_option(self) -> Option<T> {
            match self {
                Self::Value(value) => Some(value),
                Self::Malformed(_) => None,
            }
        }
    }

    pub fn optional<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        let raw = Option::<Maybe<T>>::deserialize(deserializer)?;
        Ok(raw.and_then(Maybe::into_option))
    }

    /// Drops malformed elements; a non-list value becomes empty.
    pub fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        let raw = Option::<Maybe<Vec<Maybe<T>>>>::deserialize(deserializer)?;
        Ok(raw
            .and_then(Maybe::into_option)
            .unwrap_or_default()
            .into_iter()
            .filter_map(Maybe::into_option)
            .collect())
    }

    pub fn date<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = optional::<D, String>(deserializer)?;
        Ok(raw.and_then(|value| {
            Date::parse(value.trim(), format_description!("[year]-[month]-[day]")).ok()
        }))
    }
}
