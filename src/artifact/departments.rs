//! The fixed department table fragments are labelled with.

/// One navigable category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Department {
    /// Short code drawn on the fragment faces.
    pub code: &'static str,
    pub title: &'static str,
    pub path: &'static str,
    pub color: u32,
    pub blurb: &'static str,
}

pub static DEPARTMENTS: [Department; 8] = [
    Department {
        code: "RD",
        title: "R&D: Black Vault",
        path: "/r-and-d",
        color: 0x7c3aed,
        blurb: "Prototype archives, classified schematics.",
    },
    Department {
        code: "SEC",
        title: "Security Operations",
        path: "/security",
        color: 0xff4d4d,
        blurb: "Threat intel, incident logs, counter-ops.",
    },
    Department {
        code: "FIN",
        title: "Finance Directorate",
        path: "/finance",
        color: 0xffa500,
        blurb: "Ledger mirrors, slush accounts, forecasts.",
    },
    Department {
        code: "AI",
        title: "AI Systems Lab",
        path: "/ai-systems",
        color: 0x00ffff,
        blurb: "Autonomous agents, oversight bypasses.",
    },
    Department {
        code: "OPS",
        title: "Field Operations",
        path: "/operations",
        color: 0xffff00,
        blurb: "Contractors, missions, supply routes.",
    },
    Department {
        code: "PR",
        title: "PR & Influence",
        path: "/influence",
        color: 0x66ccff,
        blurb: "Media scaffolds, narrative tuning.",
    },
    Department {
        code: "LGL",
        title: "Legal Instruments",
        path: "/legal",
        color: 0x00ff7f,
        blurb: "Hold-harmless, NDAs, arbitration kits.",
    },
    Department {
        code: "ARC",
        title: "Cold Archives",
        path: "/archives",
        color: 0xff00ff,
        blurb: "Legacy ops, deprecated doctrines.",
    },
];

/// Department for the fragment at `index`, wrapping around the table.
pub fn department_for_index(index: usize) -> &'static Department {
    &DEPARTMENTS[index % DEPARTMENTS.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_wraps_by_table_length() {
        assert_eq!(department_for_index(0).code, "RD");
        assert_eq!(department_for_index(7).code, "ARC");
        assert_eq!(department_for_index(9), &DEPARTMENTS[1]);
    }

    #[test]
    fn paths_are_unique_and_rooted() {
        for (i, a) in DEPARTMENTS.iter().enumerate() {
            assert!(a.path.starts_with('/'));
            for b in &DEPARTMENTS[i + 1..] {
                assert_ne!(a.path, b.path);
                assert_ne!(a.code, b.code);
            }
        }
    }
}
