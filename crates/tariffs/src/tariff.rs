//! Tariff reference data.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tenantdesk_core::TariffId;

use crate::keys::{FeatureKey, LimitKey};

/// Limit value meaning "no limit".
pub const UNLIMITED: i64 = -1;

/// A tariff plan as published by the backend. Read-only on the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TariffDefinition {
    pub id: TariffId,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub feature_flags: HashMap<FeatureKey, bool>,

    /// `-1` ([`UNLIMITED`]) means unlimited.
    #[serde(default)]
    pub limits: HashMap<LimitKey, i64>,
}

impl TariffDefinition {
    pub fn new(id: impl Into<TariffId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            feature_flags: HashMap::new(),
            limits: HashMap::new(),
        }
    }

    pub fn with_feature(mut self, key: FeatureKey, enabled: bool) -> Self {
        self.feature_flags.insert(key, enabled);
        self
    }

    pub fn with_limit(mut self, key: LimitKey, value: i64) -> Self {
        self.limits.insert(key, value);
        self
    }

    pub fn feature(&self, key: &FeatureKey) -> Option<bool> {
        self.feature_flags.get(key).copied()
    }

    pub fn limit(&self, key: &LimitKey) -> Option<i64> {
        self.limits.get(key).copied()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TariffError {
    #[error("failed to parse tariff reference data: {0}")]
    Parse(String),

    #[error("duplicate tariff id '{0}'")]
    DuplicateId(TariffId),

    #[error("tariff '{tariff}' has invalid limit {key} = {value} (use -1 for unlimited)")]
    InvalidLimit {
        tariff: TariffId,
        key: LimitKey,
        value: i64,
    },
}

#[derive(Debug, Deserialize)]
struct TariffListResponse {
    tariffs: Vec<TariffDefinition>,
}

/// Lookup table of tariff definitions keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TariffTable {
    tariffs: BTreeMap<TariffId, TariffDefinition>,
}

impl TariffTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table, rejecting duplicate ids and malformed limits.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = TariffDefinition>,
    ) -> Result<Self, TariffError> {
        let mut tariffs = BTreeMap::new();
        for def in definitions {
            if let Some((key, value)) = def.limits.iter().find(|(_, v)| **v < UNLIMITED) {
                return Err(TariffError::InvalidLimit {
                    tariff: def.id.clone(),
                    key: key.clone(),
                    value: *value,
                });
            }
            if tariffs.contains_key(&def.id) {
                return Err(TariffError::DuplicateId(def.id));
            }
            tariffs.insert(def.id.clone(), def);
        }
        Ok(Self { tariffs })
    }

    /// Parse the backend's `{"tariffs": [...]}` payload.
    pub fn from_json(json: &str) -> Result<Self, TariffError> {
        let response: TariffListResponse =
            serde_json::from_str(json).map_err(|e| TariffError::Parse(e.to_string()))?;
        Self::from_definitions(response.tariffs)
    }

    /// The platform's stock plans.
    pub fn builtin() -> Self {
        let plan = |id: &str, name: &str, docs: i64, flags: [bool; 9]| {
            let keys = [
                FeatureKey::WEB_CHAT,
                FeatureKey::TELEGRAM,
                FeatureKey::WHATSAPP,
                FeatureKey::VK,
                FeatureKey::MAX,
                FeatureKey::AI_SETTINGS,
                FeatureKey::ADVANCED_AI_SETTINGS,
                FeatureKey::CUSTOMIZATION,
                FeatureKey::PERSONAL_MANAGER,
            ];
            keys.into_iter()
                .zip(flags)
                .fold(TariffDefinition::new(id, name), |def, (key, on)| def.with_feature(key, on))
                .with_limit(LimitKey::PDF_DOCUMENTS, docs)
        };

        let mut tariffs = BTreeMap::new();
        for def in [
            plan("basic", "Старт", 10, [true, false, false, false, false, true, false, false, false]),
            plan("professional", "Бизнес", 25, [true, true, false, false, false, true, true, false, false]),
            plan("enterprise", "Премиум", 100, [true; 9]),
        ] {
            tariffs.insert(def.id.clone(), def);
        }
        Self { tariffs }
    }

    pub fn get(&self, id: &TariffId) -> Option<&TariffDefinition> {
        self.tariffs.get(id)
    }

    pub fn contains(&self, id: &TariffId) -> bool {
        self.tariffs.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &TariffId> {
        self.tariffs.keys()
    }

    pub fn len(&self) -> usize {
        self.tariffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tariffs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_plans_match_published_limits() {
        let table = TariffTable::builtin();
        assert_eq!(table.len(), 3);

        let basic = table.get(&TariffId::new("basic")).unwrap();
        assert_eq!(basic.limit(&LimitKey::PDF_DOCUMENTS), Some(10));
        assert_eq!(basic.feature(&FeatureKey::TELEGRAM), Some(false));

        let professional = table.get(&TariffId::new("professional")).unwrap();
        assert_eq!(professional.feature(&FeatureKey::TELEGRAM), Some(true));
        assert_eq!(professional.feature(&FeatureKey::WHATSAPP), Some(false));

        let enterprise = table.get(&TariffId::new("enterprise")).unwrap();
        assert_eq!(enterprise.limit(&LimitKey::PDF_DOCUMENTS), Some(100));
        assert!(enterprise.feature_flags.values().all(|on| *on));
    }

    #[test]
    fn parses_backend_payload() {
        let table = TariffTable::from_json(
            r#"{"tariffs":[
                {"id":"premium","name":"Premium",
                 "feature_flags":{"hasTelegram":true},
                 "limits":{"maxPdfDocuments":-1}},
                {"id":"free"}
            ]}"#,
        )
        .unwrap();

        let premium = table.get(&TariffId::new("premium")).unwrap();
        assert_eq!(premium.feature(&FeatureKey::TELEGRAM), Some(true));
        assert_eq!(premium.limit(&LimitKey::PDF_DOCUMENTS), Some(UNLIMITED));
        assert!(table.get(&TariffId::new("free")).unwrap().feature_flags.is_empty());
    }

    #[test]
    fn rejects_malformed_payloads() {
        assert!(matches!(TariffTable::from_json("{}"), Err(TariffError::Parse(_))));

        assert!(matches!(
            TariffTable::from_json(r#"{"tariffs":[{"id":"a"},{"id":"a"}]}"#),
            Err(TariffError::DuplicateId(id)) if id.as_str() == "a"
        ));

        assert!(matches!(
            TariffTable::from_json(r#"{"tariffs":[{"id":"a","limits":{"maxPdfDocuments":-5}}]}"#),
            Err(TariffError::InvalidLimit { value: -5, .. })
        ));
    }
}
