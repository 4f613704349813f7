use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_COOLDOWN_SECONDS: u64 = 1800;

const HOUR: u64 = 3600;
const DAY: u64 = 86400;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionGroup {
    Farm,
    ClubTask,
    PropertyPayment,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    pub name: String,
    pub cooldown_seconds: u64,
    pub group: ActionGroup,
}

impl ActionDescriptor {
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_seconds)
    }
}

const BUILTIN: &[(&str, u64, ActionGroup)] = &[
    ("Схемы", 4 * HOUR, ActionGroup::Farm),
    ("Швейка", 4 * HOUR, ActionGroup::Farm),
    ("Волонтёрка", 3 * HOUR, ActionGroup::Farm),
    ("Скользкая", 3 * HOUR, ActionGroup::Farm),
    ("Питомец", 900, ActionGroup::Farm),
    ("Организация", 2 * HOUR, ActionGroup::Farm),
    ("Релог", 900, ActionGroup::Farm),
    ("Moto", 2 * HOUR, ActionGroup::ClubTask),
    ("Car Meet", 2 * HOUR, ActionGroup::ClubTask),
    ("Rednecks", 2 * HOUR, ActionGroup::ClubTask),
    ("The Epsilon Program", 2 * HOUR, ActionGroup::ClubTask),
    ("Merryweather", 2 * HOUR, ActionGroup::ClubTask),
    // the 6-day payment has always been tracked as 5 days
    ("Оплата на 6 дней", 5 * DAY, ActionGroup::PropertyPayment),
    ("Оплата на 29 дней", 29 * DAY, ActionGroup::PropertyPayment),
];

/// Read-only action → cooldown table, built once at startup.
#[derive(Clone, Debug)]
pub struct CooldownCatalog {
    actions: HashMap<String, ActionDescriptor>,
    default_cooldown: Duration,
}

impl CooldownCatalog {
    pub fn builtin() -> Self {
        Self::with_default(Duration::from_secs(DEFAULT_COOLDOWN_SECONDS))
    }

    pub fn with_default(default_cooldown: Duration) -> Self {
        let actions = BUILTIN
            .iter()
            .map(|(name, secs, group)| {
                (
                    name.to_string(),
                    ActionDescriptor {
                        name: name.to_string(),
                        cooldown_seconds: *secs,
                        group: *group,
                    },
                )
            })
            .collect();
        Self {
            actions,
            default_cooldown,
        }
    }

    pub fn cooldown_for(&self, action_name: &str) -> Duration {
        self.actions
            .get(action_name)
            .map(ActionDescriptor::cooldown)
            .unwrap_or(self.default_cooldown)
    }

    pub fn get(&self, action_name: &str) -> Option<&ActionDescriptor> {
        self.actions.get(action_name)
    }

    pub fn default_cooldown(&self) -> Duration {
        self.default_cooldown
    }

    /// All known actions, grouped then ordered by name.
    pub fn list_actions(&self) -> Vec<ActionDescriptor> {
        let mut out: Vec<ActionDescriptor> = self.actions.values().cloned().collect();
        out.sort_by(|a, b| {
            group_rank(a.group)
                .cmp(&group_rank(b.group))
                .then_with(|| a.name.cmp(&b.name))
        });
        out
    }
}

impl Default for CooldownCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn group_rank(group: ActionGroup) -> u8 {
    match group {
        ActionGroup::Farm => 0,
        ActionGroup::ClubTask => 1,
        ActionGroup::PropertyPayment => 2,
    }
}
