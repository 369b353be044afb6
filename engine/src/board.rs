// ═══════════════════════════════════════════════════════════════════════
// Static board data — the 19 holdings of the realm.
// All holding properties that never change during a game.
// ═══════════════════════════════════════════════════════════════════════

use crate::types::{County, Duchy, HoldingId, HoldingKind};

/// Static description of a holding (compile-time constant).
#[derive(Debug, Clone)]
pub struct HoldingDef {
    pub id: HoldingId,
    pub slug: &'static str,
    pub name: &'static str,
    pub kind: HoldingKind,
    pub county: Option<County>,
    pub duchy: Option<Duchy>,
    pub gold_yield: u32,
    pub soldier_yield: u32,
    /// Dice-point bonus when defending this holding.
    pub defense: i32,
    /// Dice-point bonus when attacking out of this holding.
    pub attack: i32,
    pub capitol: bool,
    pub adjacent: &'static [HoldingId],
}

impl HoldingDef {
    pub fn is_town(&self) -> bool {
        self.kind == HoldingKind::Town
    }
    pub fn is_castle(&self) -> bool {
        self.kind.is_castle()
    }
}

// ── Holding ID constants ───────────────────────────────────────────────
// Ordered: towns by county (0–11), county castles (12–15),
// duchy castles (16–17), the king's castle (18).

// TOWNS — County X
pub const XANDORIA: HoldingId = HoldingId(0);
pub const XELPHANE: HoldingId = HoldingId(1);
pub const XYTHERA: HoldingId = HoldingId(2);
// TOWNS — County U
pub const ULVERIN: HoldingId = HoldingId(3);
pub const ULDORWYN: HoldingId = HoldingId(4);
pub const UMBRITH: HoldingId = HoldingId(5);
// TOWNS — County V
pub const VALORIA: HoldingId = HoldingId(6);
pub const VARDHELM: HoldingId = HoldingId(7);
pub const VELTHAR: HoldingId = HoldingId(8);
// TOWNS — County Q
pub const QUINDARA: HoldingId = HoldingId(9);
pub const QYRELIS: HoldingId = HoldingId(10);
pub const QUORWYN: HoldingId = HoldingId(11);
// CASTLES
pub const X_CASTLE: HoldingId = HoldingId(12);
pub const U_CASTLE: HoldingId = HoldingId(13);
pub const V_CASTLE: HoldingId = HoldingId(14);
pub const Q_CASTLE: HoldingId = HoldingId(15);
pub const XU_CASTLE: HoldingId = HoldingId(16);
pub const QV_CASTLE: HoldingId = HoldingId(17);
pub const KING_CASTLE: HoldingId = HoldingId(18);

pub const NUM_HOLDINGS: usize = 19;

pub const TOWNS: [HoldingId; 12] = [
    XANDORIA, XELPHANE, XYTHERA, ULVERIN, ULDORWYN, UMBRITH, VALORIA, VARDHELM, VELTHAR, QUINDARA,
    QYRELIS, QUORWYN,
];

// ── Static holding definitions ─────────────────────────────────────────

macro_rules! town {
    ($name:expr, $slug:expr, $id:expr, county: $c:expr, gold: $g:expr, soldiers: $s:expr,
     def: $d:expr, atk: $a:expr, capitol: $cap:expr, adj: [$($x:expr),*]) => {
        HoldingDef {
            id: $id, slug: $slug, name: $name, kind: HoldingKind::Town,
            county: Some($c), duchy: Some($c.duchy()),
            gold_yield: $g, soldier_yield: $s, defense: $d, attack: $a, capitol: $cap,
            adjacent: &[$($x),*],
        }
    };
}

macro_rules! castle {
    ($name:expr, $slug:expr, $id:expr, kind: $k:expr, county: $c:expr, duchy: $du:expr,
     adj: [$($x:expr),*]) => {
        HoldingDef {
            id: $id, slug: $slug, name: $name, kind: $k,
            county: $c, duchy: $du,
            gold_yield: 0, soldier_yield: 0, defense: 0, attack: 0, capitol: false,
            adjacent: &[$($x),*],
        }
    };
}

pub static HOLDINGS: [HoldingDef; NUM_HOLDINGS] = [
    // ═══ County X ═══
    town!("Xandoria", "xandoria", XANDORIA, county: County::X, gold: 1, soldiers: 400,
        def: 2, atk: 0, capitol: false, adj: [XELPHANE, XYTHERA, X_CASTLE]),
    town!("Xelphane", "xelphane", XELPHANE, county: County::X, gold: 5, soldiers: 200,
        def: 0, atk: 0, capitol: false, adj: [XANDORIA, XYTHERA, X_CASTLE]),
    town!("Xythera", "xythera", XYTHERA, county: County::X, gold: 3, soldiers: 300,
        def: 1, atk: 0, capitol: true, adj: [XANDORIA, XELPHANE, X_CASTLE]),
    // ═══ County U ═══
    town!("Ulverin", "ulverin", ULVERIN, county: County::U, gold: 5, soldiers: 200,
        def: 0, atk: 0, capitol: false, adj: [ULDORWYN, UMBRITH, U_CASTLE]),
    town!("Uldorwyn", "uldorwyn", ULDORWYN, county: County::U, gold: 4, soldiers: 300,
        def: 0, atk: 0, capitol: false, adj: [ULVERIN, UMBRITH, U_CASTLE]),
    town!("Umbrith", "umbrith", UMBRITH, county: County::U, gold: 2, soldiers: 400,
        def: 0, atk: 1, capitol: true, adj: [ULVERIN, ULDORWYN, U_CASTLE]),
    // ═══ County V ═══
    town!("Valoria", "valoria", VALORIA, county: County::V, gold: 3, soldiers: 300,
        def: 1, atk: 0, capitol: true, adj: [VARDHELM, VELTHAR, V_CASTLE]),
    town!("Vardhelm", "vardhelm", VARDHELM, county: County::V, gold: 5, soldiers: 200,
        def: 0, atk: 0, capitol: false, adj: [VALORIA, VELTHAR, V_CASTLE]),
    town!("Velthar", "velthar", VELTHAR, county: County::V, gold: 1, soldiers: 500,
        def: 2, atk: 0, capitol: false, adj: [VALORIA, VARDHELM, V_CASTLE]),
    // ═══ County Q ═══
    town!("Quindara", "quindara", QUINDARA, county: County::Q, gold: 10, soldiers: 100,
        def: -2, atk: 0, capitol: true, adj: [QYRELIS, QUORWYN, Q_CASTLE]),
    town!("Qyrelis", "qyrelis", QYRELIS, county: County::Q, gold: 4, soldiers: 300,
        def: 0, atk: 0, capitol: false, adj: [QUINDARA, QUORWYN, Q_CASTLE]),
    town!("Quorwyn", "quorwyn", QUORWYN, county: County::Q, gold: 5, soldiers: 200,
        def: 0, atk: 0, capitol: false, adj: [QUINDARA, QYRELIS, Q_CASTLE]),
    // ═══ County castles ═══
    castle!("Castle X", "x_castle", X_CASTLE, kind: HoldingKind::CountyCastle,
        county: Some(County::X), duchy: Some(Duchy::XU),
        adj: [XANDORIA, XELPHANE, XYTHERA, XU_CASTLE]),
    castle!("Castle U", "u_castle", U_CASTLE, kind: HoldingKind::CountyCastle,
        county: Some(County::U), duchy: Some(Duchy::XU),
        adj: [ULVERIN, ULDORWYN, UMBRITH, XU_CASTLE]),
    castle!("Castle V", "v_castle", V_CASTLE, kind: HoldingKind::CountyCastle,
        county: Some(County::V), duchy: Some(Duchy::QV),
        adj: [VALORIA, VARDHELM, VELTHAR, QV_CASTLE]),
    castle!("Castle Q", "q_castle", Q_CASTLE, kind: HoldingKind::CountyCastle,
        county: Some(County::Q), duchy: Some(Duchy::QV),
        adj: [QUINDARA, QYRELIS, QUORWYN, QV_CASTLE]),
    // ═══ Duchy castles ═══
    castle!("Duchy Castle XU", "xu_castle", XU_CASTLE, kind: HoldingKind::DuchyCastle,
        county: None, duchy: Some(Duchy::XU),
        adj: [X_CASTLE, U_CASTLE, KING_CASTLE]),
    castle!("Duchy Castle QV", "qv_castle", QV_CASTLE, kind: HoldingKind::DuchyCastle,
        county: None, duchy: Some(Duchy::QV),
        adj: [Q_CASTLE, V_CASTLE, KING_CASTLE]),
    // ═══ King's castle ═══
    castle!("King's Castle", "king_castle", KING_CASTLE, kind: HoldingKind::KingCastle,
        county: None, duchy: None,
        adj: [XU_CASTLE, QV_CASTLE]),
];

// ── Lookups ────────────────────────────────────────────────────────────

/// Static definition for a holding id.
pub fn holding_def(id: HoldingId) -> &'static HoldingDef {
    &HOLDINGS[id.0 as usize]
}

pub fn holding_name(id: HoldingId) -> &'static str {
    HOLDINGS[id.0 as usize].name
}

/// Find a holding by its wire slug ("xandoria", "king_castle", ...).
pub fn find_by_slug(slug: &str) -> Option<HoldingId> {
    HOLDINGS.iter().find(|h| h.slug == slug).map(|h| h.id)
}

pub fn adjacent(id: HoldingId) -> &'static [HoldingId] {
    HOLDINGS[id.0 as usize].adjacent
}

pub fn is_adjacent(a: HoldingId, b: HoldingId) -> bool {
    adjacent(a).contains(&b)
}

/// The three towns of a county.
pub fn county_towns(county: County) -> [HoldingId; 3] {
    match county {
        County::X => [XANDORIA, XELPHANE, XYTHERA],
        County::U => [ULVERIN, ULDORWYN, UMBRITH],
        County::V => [VALORIA, VARDHELM, VELTHAR],
        County::Q => [QUINDARA, QYRELIS, QUORWYN],
    }
}

pub fn county_castle(county: County) -> HoldingId {
    match county {
        County::X => X_CASTLE,
        County::U => U_CASTLE,
        County::V => V_CASTLE,
        County::Q => Q_CASTLE,
    }
}

pub fn duchy_castle(duchy: Duchy) -> HoldingId {
    match duchy {
        Duchy::XU => XU_CASTLE,
        Duchy::QV => QV_CASTLE,
    }
}

/// The capitol town of a county.
pub fn capitol(county: County) -> HoldingId {
    match county {
        County::X => XYTHERA,
        County::U => UMBRITH,
        County::V => VALORIA,
        County::Q => QUINDARA,
    }
}

/// Every holding belonging to a duchy: its six towns, two county
/// castles, and the duchy castle. The king's castle belongs to neither.
pub fn duchy_holdings(duchy: Duchy) -> impl Iterator<Item = HoldingId> {
    HOLDINGS
        .iter()
        .filter(move |h| h.duchy == Some(duchy))
        .map(|h| h.id)
}

pub fn county_holdings(county: County) -> impl Iterator<Item = HoldingId> {
    HOLDINGS
        .iter()
        .filter(move |h| h.county == Some(county))
        .map(|h| h.id)
}

// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacency_is_symmetric() {
        for def in HOLDINGS.iter() {
            for &other in def.adjacent {
                assert!(
                    is_adjacent(other, def.id),
                    "{} -> {} not symmetric",
                    def.slug,
                    holding_def(other).slug
                );
            }
        }
    }

    #[test]
    fn towns_connect_within_their_county() {
        for county in County::ALL {
            let towns = county_towns(county);
            for &a in &towns {
                for &b in &towns {
                    if a != b {
                        assert!(is_adjacent(a, b));
                    }
                }
                assert!(is_adjacent(a, county_castle(county)));
            }
        }
    }

    #[test]
    fn castle_chain_reaches_the_crown() {
        assert!(is_adjacent(X_CASTLE, XU_CASTLE));
        assert!(is_adjacent(U_CASTLE, XU_CASTLE));
        assert!(is_adjacent(V_CASTLE, QV_CASTLE));
        assert!(is_adjacent(Q_CASTLE, QV_CASTLE));
        assert!(is_adjacent(XU_CASTLE, KING_CASTLE));
        assert!(is_adjacent(QV_CASTLE, KING_CASTLE));
        assert!(!is_adjacent(X_CASTLE, KING_CASTLE));
    }

    #[test]
    fn duchies_split_the_realm_below_the_crown() {
        for county in County::ALL {
            let ids: Vec<HoldingId> = county_holdings(county).collect();
            assert_eq!(ids.len(), 4);
            assert!(ids.contains(&county_castle(county)));
            for t in county_towns(county) {
                assert!(ids.contains(&t));
            }
        }
        let mut seen: Vec<HoldingId> = Vec::new();
        for duchy in Duchy::ALL {
            let ids: Vec<HoldingId> = duchy_holdings(duchy).collect();
            assert_eq!(ids.len(), 9);
            assert!(ids.contains(&duchy_castle(duchy)));
            seen.extend(ids);
        }
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), NUM_HOLDINGS - 1);
        assert!(!seen.contains(&KING_CASTLE));
    }

    #[test]
    fn every_county_has_one_capitol() {
        for county in County::ALL {
            let cap = capitol(county);
            assert!(holding_def(cap).capitol);
            assert_eq!(holding_def(cap).county, Some(county));
            let n = county_towns(county)
                .iter()
                .filter(|&&t| holding_def(t).capitol)
                .count();
            assert_eq!(n, 1);
        }
    }

    #[test]
    fn slug_lookup_round_trips() {
        for def in HOLDINGS.iter() {
            assert_eq!(find_by_slug(def.slug), Some(def.id));
        }
        assert_eq!(find_by_slug("atlantis"), None);
    }

    #[test]
    fn yields_and_kinds() {
        assert_eq!(holding_def(QUINDARA).gold_yield, 10);
        assert_eq!(holding_def(VELTHAR).soldier_yield, 500);
        assert_eq!(holding_def(QUINDARA).defense, -2);
        assert_eq!(holding_def(UMBRITH).attack, 1);
        assert!(holding_def(KING_CASTLE).is_castle());
        assert_eq!(holding_def(KING_CASTLE).gold_yield, 0);
        assert_eq!(TOWNS.len(), 12);
        assert!(TOWNS.iter().all(|&t| holding_def(t).is_town()));
    }
}
