// src/api/adapter.rs
//! Adapter layer converting Notion wire types into the mirrored model.
//!
//! Property decoding is a tagged-variant switch over the property's type
//! tag with an explicit set of supported types; every other type falls
//! back to the raw type-keyed value.

use super::responses::{
    DateValue, NotionPage, NotionProperty, NotionUser, RichTextSpan, SelectOption,
};
use crate::constants::TITLE_PROPERTY_CANDIDATES;
use crate::model::{Person, PropertyMap, PropertyValue};

/// Decodes one property according to its type tag.
pub fn decode_property(property: &NotionProperty) -> PropertyValue {
    match property.kind.as_str() {
        "title" | "rich_text" => PropertyValue::non_empty_text(first_plain_text(
            &property.typed_value::<Vec<RichTextSpan>>(),
        )),
        "number" => match property.raw_value() {
            Some(serde_json::Value::Number(number)) => PropertyValue::Number(number.clone()),
            _ => PropertyValue::Null,
        },
        "select" => PropertyValue::non_empty_text(
            property
                .typed_value::<Option<SelectOption>>()
                .map(|option| option.name),
        ),
        "multi_select" => PropertyValue::Names(
            property
                .typed_value::<Vec<SelectOption>>()
                .into_iter()
                .map(|option| option.name)
                .collect(),
        ),
        "date" => PropertyValue::non_empty_text(
            property
                .typed_value::<Option<DateValue>>()
                .and_then(|date| date.start),
        ),
        "people" => PropertyValue::people(
            property
                .typed_value::<Vec<NotionUser>>()
                .into_iter()
                .map(convert_user)
                .collect(),
        ),
        _ => property
            .raw_value()
            .cloned()
            .map(PropertyValue::from_json)
            .unwrap_or(PropertyValue::Null),
    }
}

/// Decodes a page's property bag, skipping names that would shadow the
/// given top-level keys of the output object.
pub fn decode_properties(page: &NotionPage, reserved: &[&str]) -> PropertyMap {
    page.properties
        .iter()
        .filter(|(name, _)| {
            let shadowed = reserved.contains(&name.as_str());
            if shadowed {
                log::debug!(
                    "Skipping property '{}' of page {}: name is reserved",
                    name,
                    page.id
                );
            }
            !shadowed
        })
        .map(|(name, property)| (name.clone(), decode_property(property)))
        .collect()
}

/// Display title of a collection row: the first non-empty text among the
/// candidate title properties.
pub fn derive_title(page: &NotionPage) -> Option<String> {
    TITLE_PROPERTY_CANDIDATES.iter().find_map(|name| {
        let property = page.properties.get(*name)?;
        let candidate = match property.kind.as_str() {
            "title" | "rich_text" => {
                first_plain_text(&property.typed_value::<Vec<RichTextSpan>>())
            }
            "select" => property
                .typed_value::<Option<SelectOption>>()
                .map(|option| option.name),
            "multi_select" => property
                .typed_value::<Vec<SelectOption>>()
                .into_iter()
                .next()
                .map(|option| option.name),
            _ => property.raw_value().and_then(|v| v.as_str()).map(String::from),
        };
        candidate.filter(|title| !title.is_empty())
    })
}

fn first_plain_text(spans: &[RichTextSpan]) -> Option<String> {
    spans.first().and_then(|span| span.plain_text.clone())
}

fn convert_user(user: NotionUser) -> Person {
    Person {
        id: user.id,
        name: user.name,
        avatar_url: user.avatar_url,
    }
}
