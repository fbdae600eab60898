//! Provinces, powers, and static metadata for the standard Diplomacy map.
//!
//! The 75 provinces are enumerated alphabetically by 3-letter ID so the
//! enum discriminant doubles as the province index. Metadata (terrain,
//! supply-center status, home power, split coasts) lives in a lookup table
//! indexed by that discriminant.

/// The number of provinces on the standard map.
pub const PROVINCE_COUNT: usize = 75;

/// The number of supply centers on the standard map.
pub const SUPPLY_CENTER_COUNT: usize = 34;

/// The number of great powers.
pub const POWER_COUNT: usize = 7;

/// A province on the standard map, in alphabetical order by abbreviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Province {
    Adr = 0,  // Adriatic Sea
    Aeg = 1,  // Aegean Sea
    Alb = 2,  // Albania
    Ank = 3,  // Ankara
    Apu = 4,  // Apulia
    Arm = 5,  // Armenia
    Bal = 6,  // Baltic Sea
    Bar = 7,  // Barents Sea
    Bel = 8,  // Belgium
    Ber = 9,  // Berlin
    Bla = 10, // Black Sea
    Boh = 11, // Bohemia
    Bot = 12, // Gulf of Bothnia
    Bre = 13, // Brest
    Bud = 14, // Budapest
    Bul = 15, // Bulgaria
    Bur = 16, // Burgundy
    Cly = 17, // Clyde
    Con = 18, // Constantinople
    Den = 19, // Denmark
    Eas = 20, // Eastern Mediterranean
    Edi = 21, // Edinburgh
    Eng = 22, // English Channel
    Fin = 23, // Finland
    Gal = 24, // Galicia
    Gas = 25, // Gascony
    Gol = 26, // Gulf of Lyon
    Gre = 27, // Greece
    Hel = 28, // Heligoland Bight
    Hol = 29, // Holland
    Ion = 30, // Ionian Sea
    Iri = 31, // Irish Sea
    Kie = 32, // Kiel
    Lon = 33, // London
    Lvn = 34, // Livonia
    Lvp = 35, // Liverpool
    Mao = 36, // Mid-Atlantic Ocean
    Mar = 37, // Marseilles
    Mos = 38, // Moscow
    Mun = 39, // Munich
    Naf = 40, // North Africa
    Nao = 41, // North Atlantic Ocean
    Nap = 42, // Naples
    Nrg = 43, // Norwegian Sea
    Nth = 44, // North Sea
    Nwy = 45, // Norway
    Par = 46, // Paris
    Pic = 47, // Picardy
    Pie = 48, // Piedmont
    Por = 49, // Portugal
    Pru = 50, // Prussia
    Rom = 51, // Rome
    Ruh = 52, // Ruhr
    Rum = 53, // Rumania
    Ser = 54, // Serbia
    Sev = 55, // Sevastopol
    Sil = 56, // Silesia
    Ska = 57, // Skagerrak
    Smy = 58, // Smyrna
    Spa = 59, // Spain
    Stp = 60, // St. Petersburg
    Swe = 61, // Sweden
    Syr = 62, // Syria
    Tri = 63, // Trieste
    Tun = 64, // Tunisia
    Tus = 65, // Tuscany
    Tyr = 66, // Tyrolia
    Tys = 67, // Tyrrhenian Sea
    Ukr = 68, // Ukraine
    Ven = 69, // Venice
    Vie = 70, // Vienna
    Wal = 71, // Wales
    War = 72, // Warsaw
    Wes = 73, // Western Mediterranean
    Yor = 74, // Yorkshire
}

/// All province variants in index order.
pub const ALL_PROVINCES: [Province; PROVINCE_COUNT] = [
    Province::Adr, Province::Aeg, Province::Alb, Province::Ank,
    Province::Apu, Province::Arm, Province::Bal, Province::Bar,
    Province::Bel, Province::Ber, Province::Bla, Province::Boh,
    Province::Bot, Province::Bre, Province::Bud, Province::Bul,
    Province::Bur, Province::Cly, Province::Con, Province::Den,
    Province::Eas, Province::Edi, Province::Eng, Province::Fin,
    Province::Gal, Province::Gas, Province::Gol, Province::Gre,
    Province::Hel, Province::Hol, Province::Ion, Province::Iri,
    Province::Kie, Province::Lon, Province::Lvn, Province::Lvp,
    Province::Mao, Province::Mar, Province::Mos, Province::Mun,
    Province::Naf, Province::Nao, Province::Nap, Province::Nrg,
    Province::Nth, Province::Nwy, Province::Par, Province::Pic,
    Province::Pie, Province::Por, Province::Pru, Province::Rom,
    Province::Ruh, Province::Rum, Province::Ser, Province::Sev,
    Province::Sil, Province::Ska, Province::Smy, Province::Spa,
    Province::Stp, Province::Swe, Province::Syr, Province::Tri,
    Province::Tun, Province::Tus, Province::Tyr, Province::Tys,
    Province::Ukr, Province::Ven, Province::Vie, Province::Wal,
    Province::War, Province::Wes, Province::Yor,
];

impl Province {
    /// Canonical uppercase 3-letter abbreviation, as used in order text
    /// and JSON snapshots.
    pub const fn abbr(self) -> &'static str {
        PROVINCE_TABLE[self as usize].abbr
    }

    /// Full display name.
    pub const fn name(self) -> &'static str {
        PROVINCE_TABLE[self as usize].name
    }

    /// Terrain classification.
    pub const fn terrain(self) -> Terrain {
        PROVINCE_TABLE[self as usize].terrain
    }

    /// True if this province is a supply center.
    pub const fn is_supply_center(self) -> bool {
        PROVINCE_TABLE[self as usize].sc
    }

    /// The power that may build here, or None for neutral provinces.
    pub const fn home_power(self) -> Option<Power> {
        PROVINCE_TABLE[self as usize].home
    }

    /// The split coasts of this province, empty for single-coast provinces.
    pub const fn coasts(self) -> &'static [Coast] {
        PROVINCE_TABLE[self as usize].coasts
    }

    /// True if this province has split coasts (BUL, SPA, STP).
    pub const fn has_coasts(self) -> bool {
        !PROVINCE_TABLE[self as usize].coasts.is_empty()
    }

    /// Converts a raw index back to a province.
    pub const fn from_u8(idx: u8) -> Option<Province> {
        if (idx as usize) < PROVINCE_COUNT {
            Some(ALL_PROVINCES[idx as usize])
        } else {
            None
        }
    }

    /// Looks up a province by abbreviation, case-insensitively.
    pub fn from_abbr(abbr: &str) -> Option<Province> {
        if abbr.len() != 3 {
            return None;
        }
        ALL_PROVINCES
            .iter()
            .find(|p| p.abbr().eq_ignore_ascii_case(abbr))
            .copied()
    }
}

/// Coast specifier for split-coast provinces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Coast {
    None,
    East,
    North,
    South,
}

impl Coast {
    /// Canonical uppercase abbreviation; empty for `None`.
    pub const fn abbr(self) -> &'static str {
        match self {
            Coast::None => "",
            Coast::East => "EC",
            Coast::North => "NC",
            Coast::South => "SC",
        }
    }

    /// Parses a coast abbreviation, case-insensitively.
    pub fn from_abbr(s: &str) -> Option<Coast> {
        if s.is_empty() {
            return Some(Coast::None);
        }
        match s.to_ascii_uppercase().as_str() {
            "EC" => Some(Coast::East),
            "NC" => Some(Coast::North),
            "SC" => Some(Coast::South),
            _ => None,
        }
    }
}

/// Terrain classification of a province.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Terrain {
    Inland,
    Sea,
    Coastal,
}

/// One of the seven great powers.
///
/// Variant order is the canonical power order used for scoring vectors.
/// Neutral ownership is modelled as `Option<Power>` rather than a sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Power {
    Austria = 0,
    England = 1,
    France = 2,
    Germany = 3,
    Italy = 4,
    Russia = 5,
    Turkey = 6,
}

/// All seven powers in canonical order.
pub const ALL_POWERS: [Power; POWER_COUNT] = [
    Power::Austria,
    Power::England,
    Power::France,
    Power::Germany,
    Power::Italy,
    Power::Russia,
    Power::Turkey,
];

impl Power {
    /// Canonical uppercase name, as used in API calls and snapshots.
    pub const fn name(self) -> &'static str {
        match self {
            Power::Austria => "AUSTRIA",
            Power::England => "ENGLAND",
            Power::France => "FRANCE",
            Power::Germany => "GERMANY",
            Power::Italy => "ITALY",
            Power::Russia => "RUSSIA",
            Power::Turkey => "TURKEY",
        }
    }

    /// Parses a power name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Power> {
        ALL_POWERS
            .iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
            .copied()
    }

    /// The power's home supply centers.
    pub fn home_centers(self) -> impl Iterator<Item = Province> {
        ALL_PROVINCES
            .into_iter()
            .filter(move |p| p.home_power() == Some(self))
    }
}

/// Static per-province metadata.
pub struct ProvinceEntry {
    pub abbr: &'static str,
    pub name: &'static str,
    pub terrain: Terrain,
    pub sc: bool,
    pub home: Option<Power>,
    pub coasts: &'static [Coast],
}

const fn sea(abbr: &'static str, name: &'static str) -> ProvinceEntry {
    ProvinceEntry { abbr, name, terrain: Terrain::Sea, sc: false, home: None, coasts: &[] }
}

const fn inland(abbr: &'static str, name: &'static str) -> ProvinceEntry {
    ProvinceEntry { abbr, name, terrain: Terrain::Inland, sc: false, home: None, coasts: &[] }
}

const fn coastal(abbr: &'static str, name: &'static str) -> ProvinceEntry {
    ProvinceEntry { abbr, name, terrain: Terrain::Coastal, sc: false, home: None, coasts: &[] }
}

const fn with_sc(e: ProvinceEntry, home: Option<Power>) -> ProvinceEntry {
    ProvinceEntry {
        abbr: e.abbr,
        name: e.name,
        terrain: e.terrain,
        sc: true,
        home,
        coasts: e.coasts,
    }
}

const fn with_coasts(e: ProvinceEntry, coasts: &'static [Coast]) -> ProvinceEntry {
    ProvinceEntry {
        abbr: e.abbr,
        name: e.name,
        terrain: e.terrain,
        sc: e.sc,
        home: e.home,
        coasts,
    }
}

/// Lookup table indexed by `Province as usize`.
pub static PROVINCE_TABLE: [ProvinceEntry; PROVINCE_COUNT] = [
    sea("ADR", "Adriatic Sea"),
    sea("AEG", "Aegean Sea"),
    coastal("ALB", "Albania"),
    with_sc(coastal("ANK", "Ankara"), Some(Power::Turkey)),
    coastal("APU", "Apulia"),
    coastal("ARM", "Armenia"),
    sea("BAL", "Baltic Sea"),
    sea("BAR", "Barents Sea"),
    with_sc(coastal("BEL", "Belgium"), None),
    with_sc(coastal("BER", "Berlin"), Some(Power::Germany)),
    sea("BLA", "Black Sea"),
    inland("BOH", "Bohemia"),
    sea("BOT", "Gulf of Bothnia"),
    with_sc(coastal("BRE", "Brest"), Some(Power::France)),
    with_sc(inland("BUD", "Budapest"), Some(Power::Austria)),
    with_coasts(
        with_sc(coastal("BUL", "Bulgaria"), None),
        &[Coast::East, Coast::South],
    ),
    inland("BUR", "Burgundy"),
    coastal("CLY", "Clyde"),
    with_sc(coastal("CON", "Constantinople"), Some(Power::Turkey)),
    with_sc(coastal("DEN", "Denmark"), None),
    sea("EAS", "Eastern Mediterranean"),
    with_sc(coastal("EDI", "Edinburgh"), Some(Power::England)),
    sea("ENG", "English Channel"),
    coastal("FIN", "Finland"),
    inland("GAL", "Galicia"),
    coastal("GAS", "Gascony"),
    sea("GOL", "Gulf of Lyon"),
    with_sc(coastal("GRE", "Greece"), None),
    sea("HEL", "Heligoland Bight"),
    with_sc(coastal("HOL", "Holland"), None),
    sea("ION", "Ionian Sea"),
    sea("IRI", "Irish Sea"),
    with_sc(coastal("KIE", "Kiel"), Some(Power::Germany)),
    with_sc(coastal("LON", "London"), Some(Power::England)),
    coastal("LVN", "Livonia"),
    with_sc(coastal("LVP", "Liverpool"), Some(Power::England)),
    sea("MAO", "Mid-Atlantic Ocean"),
    with_sc(coastal("MAR", "Marseilles"), Some(Power::France)),
    with_sc(inland("MOS", "Moscow"), Some(Power::Russia)),
    with_sc(inland("MUN", "Munich"), Some(Power::Germany)),
    coastal("NAF", "North Africa"),
    sea("NAO", "North Atlantic Ocean"),
    with_sc(coastal("NAP", "Naples"), Some(Power::Italy)),
    sea("NRG", "Norwegian Sea"),
    sea("NTH", "North Sea"),
    with_sc(coastal("NWY", "Norway"), None),
    with_sc(inland("PAR", "Paris"), Some(Power::France)),
    coastal("PIC", "Picardy"),
    coastal("PIE", "Piedmont"),
    with_sc(coastal("POR", "Portugal"), None),
    coastal("PRU", "Prussia"),
    with_sc(coastal("ROM", "Rome"), Some(Power::Italy)),
    inland("RUH", "Ruhr"),
    with_sc(coastal("RUM", "Rumania"), None),
    with_sc(inland("SER", "Serbia"), None),
    with_sc(coastal("SEV", "Sevastopol"), Some(Power::Russia)),
    inland("SIL", "Silesia"),
    sea("SKA", "Skagerrak"),
    with_sc(coastal("SMY", "Smyrna"), Some(Power::Turkey)),
    with_coasts(
        with_sc(coastal("SPA", "Spain"), None),
        &[Coast::North, Coast::South],
    ),
    with_coasts(
        with_sc(coastal("STP", "St. Petersburg"), Some(Power::Russia)),
        &[Coast::North, Coast::South],
    ),
    with_sc(coastal("SWE", "Sweden"), None),
    coastal("SYR", "Syria"),
    with_sc(coastal("TRI", "Trieste"), Some(Power::Austria)),
    with_sc(coastal("TUN", "Tunisia"), None),
    coastal("TUS", "Tuscany"),
    inland("TYR", "Tyrolia"),
    sea("TYS", "Tyrrhenian Sea"),
    inland("UKR", "Ukraine"),
    with_sc(coastal("VEN", "Venice"), Some(Power::Italy)),
    with_sc(inland("VIE", "Vienna"), Some(Power::Austria)),
    coastal("WAL", "Wales"),
    with_sc(inland("WAR", "Warsaw"), Some(Power::Russia)),
    sea("WES", "Western Mediterranean"),
    coastal("YOR", "Yorkshire"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn province_indices_are_sequential() {
        for (i, p) in ALL_PROVINCES.iter().enumerate() {
            assert_eq!(*p as usize, i, "{:?} has wrong index", p);
        }
    }

    #[test]
    fn supply_center_count() {
        let sc = ALL_PROVINCES.iter().filter(|p| p.is_supply_center()).count();
        assert_eq!(sc, SUPPLY_CENTER_COUNT);
    }

    #[test]
    fn terrain_counts() {
        let inland = ALL_PROVINCES.iter().filter(|p| p.terrain() == Terrain::Inland).count();
        let sea = ALL_PROVINCES.iter().filter(|p| p.terrain() == Terrain::Sea).count();
        let coastal = ALL_PROVINCES.iter().filter(|p| p.terrain() == Terrain::Coastal).count();
        assert_eq!(inland, 14);
        assert_eq!(sea, 19);
        assert_eq!(coastal, 42);
    }

    #[test]
    fn abbr_roundtrip_case_insensitive() {
        for p in ALL_PROVINCES {
            assert_eq!(Province::from_abbr(p.abbr()), Some(p));
            assert_eq!(Province::from_abbr(&p.abbr().to_ascii_lowercase()), Some(p));
        }
        assert_eq!(Province::from_abbr("XYZ"), None);
        assert_eq!(Province::from_abbr(""), None);
    }

    #[test]
    fn split_coast_provinces() {
        assert_eq!(Province::Bul.coasts(), &[Coast::East, Coast::South]);
        assert_eq!(Province::Spa.coasts(), &[Coast::North, Coast::South]);
        assert_eq!(Province::Stp.coasts(), &[Coast::North, Coast::South]);
        let split = ALL_PROVINCES.iter().filter(|p| p.has_coasts()).count();
        assert_eq!(split, 3);
    }

    #[test]
    fn home_center_counts() {
        for (power, expected) in [
            (Power::Austria, 3),
            (Power::England, 3),
            (Power::France, 3),
            (Power::Germany, 3),
            (Power::Italy, 3),
            (Power::Russia, 4),
            (Power::Turkey, 3),
        ] {
            assert_eq!(power.home_centers().count(), expected, "{:?}", power);
        }
        let neutral = ALL_PROVINCES
            .iter()
            .filter(|p| p.is_supply_center() && p.home_power().is_none())
            .count();
        assert_eq!(neutral, 12);
    }

    #[test]
    fn power_name_roundtrip() {
        for p in ALL_POWERS {
            assert_eq!(Power::from_name(p.name()), Some(p));
            assert_eq!(Power::from_name(&p.name().to_ascii_lowercase()), Some(p));
        }
        assert_eq!(Power::from_name("NARNIA"), None);
    }

    #[test]
    fn coast_abbr_roundtrip() {
        for c in [Coast::None, Coast::East, Coast::North, Coast::South] {
            assert_eq!(Coast::from_abbr(c.abbr()), Some(c));
        }
        assert_eq!(Coast::from_abbr("WC"), None);
    }
}
