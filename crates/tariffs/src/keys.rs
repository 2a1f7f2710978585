use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Feature flag identifier (e.g. `hasTelegram`).
///
/// Keys are opaque strings so that reference data can introduce new flags;
/// a key missing from a tariff is denied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureKey(Cow<'static, str>);

impl FeatureKey {
    pub const WEB_CHAT: FeatureKey = FeatureKey::from_static("hasWebChat");
    pub const TELEGRAM: FeatureKey = FeatureKey::from_static("hasTelegram");
    pub const WHATSAPP: FeatureKey = FeatureKey::from_static("hasWhatsApp");
    pub const VK: FeatureKey = FeatureKey::from_static("hasVK");
    pub const MAX: FeatureKey = FeatureKey::from_static("hasMAX");
    pub const AI_SETTINGS: FeatureKey = FeatureKey::from_static("hasAISettings");
    pub const ADVANCED_AI_SETTINGS: FeatureKey = FeatureKey::from_static("hasAdvancedAISettings");
    pub const CUSTOMIZATION: FeatureKey = FeatureKey::from_static("hasCustomization");
    pub const PERSONAL_MANAGER: FeatureKey = FeatureKey::from_static("hasPersonalManager");

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Countable resource limit identifier (e.g. `maxPdfDocuments`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LimitKey(Cow<'static, str>);

impl LimitKey {
    pub const PDF_DOCUMENTS: LimitKey = LimitKey::from_static("maxPdfDocuments");

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for LimitKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
