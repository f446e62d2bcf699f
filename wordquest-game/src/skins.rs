//! Cosmetic skins and the coin shop.
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_SKIN_ID, LOG_TARGET_SKINS};
use crate::profile::{ProfileStorage, ProfileStore};

/// RGBA deltas layered over a chapter palette.
pub type Tint = [f32; 4];

/// A purchasable color-tint skin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skin {
    pub id: String,
    pub display_name: String,
    pub cost: u32,
    pub banner_tint: Tint,
    pub accent_tint: Tint,
    pub button_tint: Tint,
}

impl Skin {
    fn new(
        id: &str,
        display_name: &str,
        cost: u32,
        banner: Tint,
        accent: Tint,
        button: Tint,
    ) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            cost,
            banner_tint: banner,
            accent_tint: accent,
            button_tint: button,
        }
    }
}

/// Result of an unlock attempt. Every branch other than `Unlocked` leaves
/// the profile untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnlockOutcome {
    Unlocked { balance: u32 },
    AlreadyOwned,
    UnknownSkin,
    InsufficientFunds { needed: u32, balance: u32 },
}

/// Result of an activation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivateOutcome {
    Activated,
    NotOwned,
}

/// Shop row for a skin listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkinListing {
    pub id: String,
    pub display_name: String,
    pub cost: u32,
    pub owned: bool,
    pub active: bool,
}

/// Ordered table of known skins. Always contains `default`.
#[derive(Debug, Clone, PartialEq)]
pub struct SkinCatalog {
    skins: Vec<Skin>,
}

impl Default for SkinCatalog {
    fn default() -> Self {
        Self {
            skins: vec![
                Skin::new(
                    DEFAULT_SKIN_ID,
                    "Default Neon",
                    0,
                    [0.0; 4],
                    [0.0; 4],
                    [0.0; 4],
                ),
                Skin::new(
                    "electric_blue",
                    "Electric Blue",
                    60,
                    [0.0, 0.1, 0.2, 0.0],
                    [0.0, 0.1, 0.2, 0.0],
                    [0.0, 0.2, 0.4, 0.0],
                ),
                Skin::new(
                    "hot_pink",
                    "Hot Pink Arcade",
                    75,
                    [0.1, 0.0, 0.1, 0.0],
                    [0.1, 0.0, 0.1, 0.0],
                    [0.2, 0.0, 0.2, 0.0],
                ),
                Skin::new(
                    "royal_gold",
                    "Royal Gold",
                    100,
                    [0.1, 0.1, 0.0, 0.0],
                    [0.05, 0.05, 0.0, 0.0],
                    [0.15, 0.12, 0.0, 0.0],
                ),
            ],
        }
    }
}

impl SkinCatalog {
    /// Build a catalog from custom skins; a zero-cost `default` is prepended
    /// when missing.
    #[must_use]
    pub fn from_skins(mut skins: Vec<Skin>) -> Self {
        if !skins.iter().any(|s| s.id == DEFAULT_SKIN_ID) {
            skins.insert(
                0,
                Skin::new(DEFAULT_SKIN_ID, "Default", 0, [0.0; 4], [0.0; 4], [0.0; 4]),
            );
        }
        Self { skins }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Skin> {
        self.skins.iter().find(|skin| skin.id == id)
    }

    #[must_use]
    pub fn skins(&self) -> &[Skin] {
        &self.skins
    }

    fn default_skin(&self) -> &Skin {
        // from_skins and Default both guarantee the entry
        self.get(DEFAULT_SKIN_ID).unwrap_or(&self.skins[0])
    }

    /// Resolve the profile's active skin, falling back to `default` for ids
    /// this catalog does not know.
    #[must_use]
    pub fn active_skin<S: ProfileStorage>(&self, profile: &ProfileStore<S>) -> &Skin {
        self.get(&profile.record().active_skin)
            .unwrap_or_else(|| self.default_skin())
    }

    /// Shop listing with ownership and activation flags.
    #[must_use]
    pub fn listing<S: ProfileStorage>(&self, profile: &ProfileStore<S>) -> Vec<SkinListing> {
        let record = profile.record();
        let active = &self.active_skin(profile).id;
        self.skins
            .iter()
            .map(|skin| SkinListing {
                id: skin.id.clone(),
                display_name: skin.display_name.clone(),
                cost: skin.cost,
                owned: record.owns_skin(&skin.id),
                active: &skin.id == active,
            })
            .collect()
    }

    /// Buy a skin with the coin balance.
    pub fn unlock<S: ProfileStorage>(
        &self,
        profile: &mut ProfileStore<S>,
        skin_id: &str,
    ) -> UnlockOutcome {
        let Some(skin) = self.get(skin_id) else {
            log::debug!(target: LOG_TARGET_SKINS, "unlock ignored: unknown skin {skin_id}");
            return UnlockOutcome::UnknownSkin;
        };
        if profile.record().owns_skin(skin_id) {
            return UnlockOutcome::AlreadyOwned;
        }
        let balance = profile.record().coin_balance;
        if balance < skin.cost {
            log::debug!(
                target: LOG_TARGET_SKINS,
                "unlock ignored: {skin_id} costs {} but balance is {balance}",
                skin.cost
            );
            return UnlockOutcome::InsufficientFunds {
                needed: skin.cost,
                balance,
            };
        }
        let balance = profile.update(|record| {
            record.coin_balance -= skin.cost;
            record.skins_unlocked.insert(skin.id.clone());
            record.coin_balance
        });
        log::info!(target: LOG_TARGET_SKINS, "unlocked skin {skin_id}, balance now {balance}");
        UnlockOutcome::Unlocked { balance }
    }

    /// Equip an owned skin.
    pub fn activate<S: ProfileStorage>(
        &self,
        profile: &mut ProfileStore<S>,
        skin_id: &str,
    ) -> ActivateOutcome {
        if !profile.record().owns_skin(skin_id) {
            log::debug!(target: LOG_TARGET_SKINS, "activate ignored: {skin_id} not owned");
            return ActivateOutcome::NotOwned;
        }
        profile.update(|record| record.active_skin = skin_id.to_string());
        ActivateOutcome::Activated
    }
}
