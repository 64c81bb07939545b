//! Safety setting enums and the loose-to-typed normalisation used by callers
//! that accept user supplied category and threshold names.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

use crate::client::ClientError;
use crate::model::SafetySetting;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmCategory {
    HarmCategoryUnspecified,
    HarmCategoryDerogatory,
    HarmCategoryToxicity,
    HarmCategoryViolence,
    HarmCategorySexual,
    HarmCategoryMedical,
    HarmCategoryDangerous,
    HarmCategoryHarassment,
    HarmCategoryHateSpeech,
    HarmCategorySexuallyExplicit,
    HarmCategoryDangerousContent,
}

/// Which family of categories a loose name resolves against.
///
/// The text models understand the `Old` set; the generative models only
/// accept the `New` one. Aliases such as `"sexual"` resolve differently
/// depending on the set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarmCategorySet {
    Old,
    New,
}

impl HarmCategory {
    /// Resolve a category from its wire name, a short alias, or its integer
    /// code. Matching is case-insensitive.
    pub fn parse(value: &str, set: HarmCategorySet) -> Result<Self, ClientError> {
        let lowered = value.trim().to_ascii_lowercase();
        let key = lowered.as_str();
        let category = match set {
            HarmCategorySet::Old => match key {
                "0" | "harm_category_unspecified" | "unspecified" => {
                    Some(HarmCategory::HarmCategoryUnspecified)
                }
                "1" | "harm_category_derogatory" | "derogatory" => {
                    Some(HarmCategory::HarmCategoryDerogatory)
                }
                "2" | "harm_category_toxicity" | "toxicity" | "toxic" => {
                    Some(HarmCategory::HarmCategoryToxicity)
                }
                "3" | "harm_category_violence" | "violence" | "violent" => {
                    Some(HarmCategory::HarmCategoryViolence)
                }
                "4" | "harm_category_sexual" | "sexual" | "sex" => {
                    Some(HarmCategory::HarmCategorySexual)
                }
                "5" | "harm_category_medical" | "medical" | "med" => {
                    Some(HarmCategory::HarmCategoryMedical)
                }
                "6" | "harm_category_dangerous" | "dangerous" | "danger" => {
                    Some(HarmCategory::HarmCategoryDangerous)
                }
                _ => None,
            },
            HarmCategorySet::New => match key {
                "7" | "harm_category_harassment" | "harassment" => {
                    Some(HarmCategory::HarmCategoryHarassment)
                }
                "8" | "harm_category_hate_speech" | "hate_speech" | "hate" => {
                    Some(HarmCategory::HarmCategoryHateSpeech)
                }
                "9" | "harm_category_sexually_explicit" | "harm_category_sexual" | "sexual"
                | "sex" => Some(HarmCategory::HarmCategorySexuallyExplicit),
                "10" | "harm_category_dangerous_content" | "harm_category_dangerous"
                | "dangerous" | "danger" => Some(HarmCategory::HarmCategoryDangerousContent),
                _ => None,
            },
        };
        category.ok_or_else(|| {
            ClientError::InvalidArgument(format!(
                "unknown harm category `{value}` for the {set:?} category set"
            ))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmBlockThreshold {
    HarmBlockThresholdUnspecified,
    BlockLowAndAbove,
    BlockMediumAndAbove,
    BlockOnlyHigh,
    BlockNone,
}

impl FromStr for HarmBlockThreshold {
    type Err = ClientError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "0" | "harm_block_threshold_unspecified" | "block_threshold_unspecified"
            | "unspecified" => Ok(HarmBlockThreshold::HarmBlockThresholdUnspecified),
            "1" | "block_low_and_above" | "low" => Ok(HarmBlockThreshold::BlockLowAndAbove),
            "2" | "block_medium_and_above" | "medium" | "med" => {
                Ok(HarmBlockThreshold::BlockMediumAndAbove)
            }
            "3" | "block_only_high" | "high" => Ok(HarmBlockThreshold::BlockOnlyHigh),
            "4" | "block_none" => Ok(HarmBlockThreshold::BlockNone),
            _ => Err(ClientError::InvalidArgument(format!(
                "unknown block threshold `{value}`"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmProbability {
    HarmProbabilityUnspecified,
    Negligible,
    Low,
    Medium,
    High,
}

fn parse_pair(
    category: &str,
    threshold: &str,
    set: HarmCategorySet,
) -> Result<(HarmCategory, HarmBlockThreshold), ClientError> {
    Ok((
        HarmCategory::parse(category, set)?,
        threshold.parse::<HarmBlockThreshold>()?,
    ))
}

/// Turn loose `(category, threshold)` pairs into typed settings, one
/// setting per pair and in input order.
pub fn normalize_safety_settings<I, C, T>(
    settings: I,
    set: HarmCategorySet,
) -> Result<Vec<SafetySetting>, ClientError>
where
    I: IntoIterator<Item = (C, T)>,
    C: AsRef<str>,
    T: AsRef<str>,
{
    settings
        .into_iter()
        .map(|(category, threshold)| {
            let (category, threshold) = parse_pair(category.as_ref(), threshold.as_ref(), set)?;
            Ok(SafetySetting {
                category,
                threshold,
            })
        })
        .collect()
}

/// Category to threshold lookup built from loose pairs. When a category
/// appears more than once the last threshold wins.
pub fn to_easy_safety_map<I, C, T>(
    settings: I,
    set: HarmCategorySet,
) -> Result<HashMap<HarmCategory, HarmBlockThreshold>, ClientError>
where
    I: IntoIterator<Item = (C, T)>,
    C: AsRef<str>,
    T: AsRef<str>,
{
    settings
        .into_iter()
        .map(|(category, threshold)| parse_pair(category.as_ref(), threshold.as_ref(), set))
        .collect()
}
