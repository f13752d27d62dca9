//! Built-in trainer avatars every user may use without a grant.
//!
//! The catalog is partitioned by the artist credited for each sprite so the
//! avatar list can attribute them.

use std::collections::HashMap;
use std::sync::LazyLock;

use avatarium_types::avatar::{AvatarId, AvatarKind};

/// Sprites credited to one artist or source.
#[derive(Debug, Clone, Copy)]
pub struct ArtistSet {
    pub artist: &'static str,
    pub avatars: &'static [&'static str],
}

pub static OFFICIAL_SETS: &[ArtistSet] = &[
    ArtistSet {
        artist: "Game Freak",
        avatars: &[
            "aaron", "acetrainer", "acetrainer-gen1", "acetrainer-gen2", "acetrainer-gen3",
            "acetrainer-gen4", "acetrainerf", "acetrainerf-gen1", "acetrainerf-gen2",
            "acetrainerf-gen3", "acetrainerf-gen4", "agatha-gen1", "agatha-gen3", "alder",
            "archie", "ash", "backpacker", "beauty", "beauty-gen1", "beauty-gen2", "benga",
            "bertha", "bianca", "biker", "birdkeeper", "blackbelt", "blaine", "blaine-gen1",
            "blue", "blue-gen1", "blue-gen2", "brock", "brock-gen1", "brock-gen2", "bruno",
            "bruno-gen1", "bugcatcher", "burgh", "caitlin", "candice", "cheren", "chuck",
            "clair", "clay", "cynthia", "cynthia-gen4", "dawn", "dawn-gen4pt", "drake-gen3",
            "elesa", "erika", "erika-gen1", "erika-gen2", "ethan", "falkner", "fantina",
            "flannery", "gardenia", "ghetsis", "giovanni", "giovanni-gen1", "grimsley",
            "hilbert", "hilda", "iris", "janine", "jasmine", "juan", "karen", "koga",
            "lance", "lance-gen1", "leaf", "lenora", "lorelei", "lt-surge", "lucas",
            "lucas-gen4pt", "lyra", "maxie", "may", "misty", "misty-gen1", "morty", "n",
            "norman", "oak", "pryce", "red", "red-gen1", "roark", "roxanne", "sabrina",
            "shauntal", "skyla", "steven", "volkner", "wallace", "whitney", "will",
        ],
    },
    ArtistSet {
        artist: "Gnomowladny",
        avatars: &[
            "ace-trainer-gen2jp", "aroma-lady-gen2", "bird-keeper-gen2", "boarder-gen2",
            "burglar-gen2", "cooltrainer-gen2", "fisher-gen2", "gentleman-gen2",
            "juggler-gen2", "kimono-girl", "pokemaniac-gen2", "sage-gen2", "schoolboy-gen2",
            "super-nerd-gen2", "swimmer-gen2", "twins-gen2",
        ],
    },
    ArtistSet {
        artist: "Brumirage",
        avatars: &[
            "blue-lgpe", "cynthia-masters", "erika-masters", "lance-masters", "leaf-masters",
            "misty-masters", "red-lgpe", "red-masters", "steven-masters",
        ],
    },
    ArtistSet {
        artist: "Kyledove",
        avatars: &[
            "acerola", "hau", "hapu", "kiawe", "lana", "lillie", "mallow", "molayne",
            "olivia", "plumeria", "sophocles",
        ],
    },
    ArtistSet {
        artist: "Zac Weavile",
        avatars: &[
            "arven", "geeta", "iono", "larry", "nemona", "penny", "rika", "ryme", "tulip",
        ],
    },
];

/// Lookup over [`OFFICIAL_SETS`].
#[derive(Debug)]
pub struct OfficialCatalog {
    by_id: HashMap<&'static str, &'static str>,
}

static GLOBAL: LazyLock<OfficialCatalog> = LazyLock::new(|| OfficialCatalog::from_sets(OFFICIAL_SETS));

impl OfficialCatalog {
    /// The process-wide catalog built from [`OFFICIAL_SETS`].
    pub fn global() -> &'static OfficialCatalog {
        &GLOBAL
    }

    pub fn from_sets(sets: &[ArtistSet]) -> Self {
        let mut by_id = HashMap::new();
        for set in sets {
            for avatar in set.avatars {
                by_id.entry(*avatar).or_insert(set.artist);
            }
        }
        Self { by_id }
    }

    /// Whether `avatar` is a built-in avatar. `#` and file ids never are.
    pub fn contains(&self, avatar: &AvatarId) -> bool {
        avatar.kind() == AvatarKind::Official && self.by_id.contains_key(avatar.as_str())
    }

    /// Artist credited for an official avatar.
    pub fn artist_of(&self, avatar: &AvatarId) -> Option<&'static str> {
        if avatar.kind() != AvatarKind::Official {
            return None;
        }
        self.by_id.get(avatar.as_str()).copied()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_catalog_contains_known_avatar() {
        let catalog = OfficialCatalog::global();
        assert!(catalog.contains(&AvatarId::normalize("Erika-GEN2!!")));
        assert!(!catalog.contains(&AvatarId::normalize("not-a-real-trainer")));
    }

    #[test]
    fn test_custom_ids_are_never_official() {
        let catalog = OfficialCatalog::global();
        assert!(!catalog.contains(&AvatarId::normalize("#lucas")));
        assert!(!catalog.contains(&AvatarId::normalize("lucas.png")));
    }

    #[test]
    fn test_artist_attribution() {
        let catalog = OfficialCatalog::global();
        assert_eq!(catalog.artist_of(&AvatarId::normalize("iono")), Some("Zac Weavile"));
        assert_eq!(catalog.artist_of(&AvatarId::normalize("lucas")), Some("Game Freak"));
        assert_eq!(catalog.artist_of(&AvatarId::normalize("#iono")), None);
    }

    #[test]
    fn test_no_duplicate_ids_across_sets() {
        let total: usize = OFFICIAL_SETS.iter().map(|s| s.avatars.len()).sum();
        assert_eq!(OfficialCatalog::global().len(), total);
    }
}
