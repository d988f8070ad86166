use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use crate::db::models::Setting;
use crate::db::repositories::SettingsStore;
use crate::error::{AppError, AppResult};

use super::weekday_name;

const AVAILABILITY_KEY: &str = "availability";
const AVAILABILITY_DESCRIPTION: &str = "Weekdays and opening hours bookings are accepted in";

/// Business-hours policy: which weekdays are open (0 = Sunday) and the
/// half-open hour window `[open_hour, close_hour)` bookings may start in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityRules {
    pub weekdays: BTreeSet<u8>,
    pub open_hour: u8,
    pub close_hour: u8,
}

impl Default for AvailabilityRules {
    /// Tuesday through Saturday, 8:00 to 18:00.
    fn default() -> Self {
        Self {
            weekdays: BTreeSet::from([2, 3, 4, 5, 6]),
            open_hour: 8,
            close_hour: 18,
        }
    }
}

impl AvailabilityRules {
    pub fn validate(&self) -> AppResult<()> {
        if self.weekdays.is_empty() {
            return Err(AppError::Validation(
                "at least one weekday must be open".to_string(),
            ));
        }
        if let Some(day) = self.weekdays.iter().find(|day| **day > 6) {
            return Err(AppError::Validation(format!(
                "invalid weekday {day}: weekdays run from 0 (Sunday) to 6 (Saturday)"
            )));
        }
        if self.open_hour > 23 || self.close_hour > 23 {
            return Err(AppError::Validation(
                "opening hours must be between 0 and 23".to_string(),
            ));
        }
        if self.open_hour >= self.close_hour {
            return Err(AppError::Validation(
                "opening hour must be before closing hour".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_open_weekday(&self, weekday: u8) -> bool {
        self.weekdays.contains(&weekday)
    }

    pub fn is_open_hour(&self, hour: u8) -> bool {
        hour >= self.open_hour && hour < self.close_hour
    }

    /// Human-readable list of the open weekdays, for rejection messages.
    pub fn open_day_names(&self) -> String {
        self.weekdays
            .iter()
            .map(|day| weekday_name(*day))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Holds the current business-hours configuration on top of the settings
/// store, with an in-memory cache refreshed on every explicit save. Falls
/// back to the built-in default when nothing was ever saved.
pub struct AvailabilityService {
    settings: Arc<dyn SettingsStore>,
    cache: RwLock<Option<AvailabilityRules>>,
}

impl AvailabilityService {
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        Self {
            settings,
            cache: RwLock::new(None),
        }
    }

    pub async fn current(&self) -> AppResult<AvailabilityRules> {
        if let Some(rules) = self.cache.read().await.clone() {
            return Ok(rules);
        }

        let rules = match self.settings.get(AVAILABILITY_KEY).await? {
            Some(setting) => serde_json::from_value(setting.value).map_err(|e| {
                AppError::Internal(format!("stored availability rules are malformed: {e}"))
            })?,
            None => AvailabilityRules::default(),
        };

        *self.cache.write().await = Some(rules.clone());
        Ok(rules)
    }

    /// Validate and persist a full replacement of the rules, then refresh
    /// the cache. Last writer wins; the store upsert is a single write.
    pub async fn save(&self, rules: AvailabilityRules) -> AppResult<AvailabilityRules> {
        rules.validate()?;

        let value = serde_json::to_value(&rules)
            .map_err(|e| AppError::Internal(format!("could not encode availability rules: {e}")))?;
        self.settings
            .upsert(AVAILABILITY_KEY, value, Some(AVAILABILITY_DESCRIPTION))
            .await?;

        *self.cache.write().await = Some(rules.clone());
        info!(
            open_hour = rules.open_hour,
            close_hour = rules.close_hour,
            "availability rules replaced"
        );
        Ok(rules)
    }

    /// Raw settings listing for the admin surface.
    pub async fn all_settings(&self) -> AppResult<Vec<Setting>> {
        Ok(self.settings.all().await?)
    }

    pub async fn setting(&self, key: &str) -> AppResult<Setting> {
        self.settings
            .get(key)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("no setting named '{key}'")))
    }
}
