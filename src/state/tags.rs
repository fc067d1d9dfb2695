// ============================================================================
// CACHE KEYS & TAGS - identidades tipadas de las queries cacheadas
// ============================================================================

/// Identidad de un resultado de query cacheado
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Packages,
    PackageDetail { package_id: String },
    CluesForCity { city_id: String },
    SideQuests { city_id: String },
    ChatRooms,
    ChatMessages { room_id: String },
    Friends,
    Leaderboard,
    Profile,
}

/// Etiqueta de las entradas cacheadas; las mutations declaran cuáles invalidan
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CacheTag {
    Packages,
    Package(String),
    Clues(String),
    SideQuests(String),
    ChatRooms,
    ChatMessages(String),
    Friends,
    Leaderboard,
    Profile,
}
