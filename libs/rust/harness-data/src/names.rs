//! Built-in name tables.
//!
//! Every entry is alphabetic so generated names pass the API's name rules.

pub(crate) const DEFAULT_LOCALE: &str = "en_US";

pub(crate) struct NameTable {
    pub locale: &'static str,
    pub first: &'static [&'static str],
    pub last: &'static [&'static str],
}

pub(crate) const TABLES: &[NameTable] = &[
    NameTable {
        locale: "en_US",
        first: &[
            "James", "Mary", "Robert", "Patricia", "Michael", "Jennifer", "David", "Linda",
            "William", "Elizabeth", "Thomas", "Susan",
        ],
        last: &[
            "Smith", "Johnson", "Williams", "Brown", "Jones", "Miller", "Davis", "Wilson",
            "Anderson", "Taylor", "Moore", "Martin",
        ],
    },
    NameTable {
        locale: "en_GB",
        first: &[
            "Oliver", "Amelia", "George", "Isla", "Harry", "Ava", "Jack", "Emily", "Charlie",
            "Sophie",
        ],
        last: &[
            "Evans", "Thomas", "Roberts", "Walker", "Wright", "Hughes", "Green", "Hall", "Wood",
            "Clarke",
        ],
    },
    NameTable {
        locale: "de_DE",
        first: &[
            "Lukas", "Anna", "Jonas", "Lea", "Felix", "Laura", "Paul", "Marie", "Leon", "Hannah",
        ],
        last: &[
            "Schmidt", "Schneider", "Fischer", "Weber", "Meyer", "Wagner", "Becker", "Hoffmann",
            "Koch", "Richter",
        ],
    },
    NameTable {
        locale: "es_ES",
        first: &[
            "Hugo", "Lucia", "Mateo", "Sofia", "Martin", "Paula", "Daniel", "Julia", "Pablo",
            "Carmen",
        ],
        last: &[
            "Garcia", "Rodriguez", "Gonzalez", "Fernandez", "Lopez", "Martinez", "Sanchez",
            "Perez", "Gomez", "Ruiz",
        ],
    },
];

pub(crate) fn table_for(locale: &str) -> Option<&'static NameTable> {
    TABLES.iter().find(|t| t.locale.eq_ignore_ascii_case(locale))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_entries_are_alphabetic() {
        for table in TABLES {
            for name in table.first.iter().chain(table.last) {
                assert!(name.chars().all(char::is_alphabetic), "{name}");
                assert!(name.len() >= 3, "{name}");
            }
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert!(table_for("EN_us").is_some());
        assert!(table_for(DEFAULT_LOCALE).is_some());
        assert!(table_for("zz_ZZ").is_none());
    }
}
