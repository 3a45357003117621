//! Navigation menu
//!
//! Hiding an entry is cosmetic; the admin guard is what keeps a standard
//! user off an admin page. Both read the same capability.

use bop_core::{AccessTier, Capability, Route};

/// One menu entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavEntry {
    pub label: &'static str,
    pub route: Route,
}

impl NavEntry {
    pub fn path(&self) -> String {
        self.route.path()
    }
}

fn all_entries() -> [NavEntry; 4] {
    [
        NavEntry {
            label: "Dashboard",
            route: Route::Dashboard,
        },
        NavEntry {
            label: "Users",
            route: Route::Users,
        },
        NavEntry {
            label: "Roles",
            route: Route::Roles,
        },
        NavEntry {
            label: "Currencies",
            route: Route::Currencies,
        },
    ]
}

/// Entries visible to an identity with `capability`
pub fn menu_for(capability: Capability) -> Vec<NavEntry> {
    all_entries()
        .into_iter()
        .filter(|entry| entry.route.tier() != AccessTier::AdminOnly || capability.is_admin())
        .collect()
}
