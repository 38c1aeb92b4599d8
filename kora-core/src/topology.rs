//! # Instrument Topology Module
//!
//! Maps a kora string number to the hand that plays it and its position on
//! that side, counted from the lowest-pitched string. The engine only ever
//! uses these roles for ordering and labeling; pitches never depend on them.
//!
//! The built-in [`KoraLayout`] knows the standard 21- and 22-string bridge
//! layouts. Any other string count falls back to alternating sides: odd
//! numbers on the Left, even numbers on the Right, positions sequential.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The hand side of the bridge. `Left < Right` is the canonical display and
/// conflict-scan order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("Left"),
            Side::Right => f.write_str("Right"),
        }
    }
}

/// Where a string sits on the instrument.
///
/// Field order matters: the derived `Ord` sorts by side first, then by
/// position, which is the canonical row order of every result table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StringRole {
    pub side: Side,
    /// 1-based, counted from the lowest-pitched string on this side.
    pub position_from_low: u8,
}

impl StringRole {
    pub fn new(side: Side, position_from_low: u8) -> Self {
        StringRole {
            side,
            position_from_low,
        }
    }

    /// Short label such as `L3` or `R10`.
    pub fn label(&self) -> String {
        let prefix = match self.side {
            Side::Left => 'L',
            Side::Right => 'R',
        };
        format!("{}{}", prefix, self.position_from_low)
    }
}

/// Read-only string layout lookup supplied by the caller.
///
/// Implementations must be total: every `string_number` in
/// `1..=string_count` gets a role.
pub trait Topology {
    fn role_for(&self, string_count: usize, string_number: u8) -> StringRole;

    /// Left-side string numbers, lowest position first.
    fn left_order(&self, string_count: usize) -> Vec<u8> {
        side_order(self, string_count, Side::Left)
    }

    /// Right-side string numbers, lowest position first.
    fn right_order(&self, string_count: usize) -> Vec<u8> {
        side_order(self, string_count, Side::Right)
    }
}

fn side_order<T: Topology + ?Sized>(topology: &T, string_count: usize, side: Side) -> Vec<u8> {
    let mut numbers: Vec<(u8, u8)> = (1..=string_count)
        .filter_map(|n| u8::try_from(n).ok())
        .map(|n| (topology.role_for(string_count, n), n))
        .filter(|(role, _)| role.side == side)
        .map(|(role, n)| (role.position_from_low, n))
        .collect();
    numbers.sort();
    numbers.into_iter().map(|(_, n)| n).collect()
}

// String numbers ascend with pitch across the whole instrument; each list
// holds one side's numbers from its lowest string upwards.
const LEFT_21: [u8; 11] = [1, 2, 3, 4, 6, 8, 10, 12, 14, 16, 18];
const RIGHT_21: [u8; 10] = [5, 7, 9, 11, 13, 15, 17, 19, 20, 21];
const LEFT_22: [u8; 12] = [1, 2, 3, 4, 6, 8, 10, 12, 14, 16, 18, 22];
const RIGHT_22: [u8; 10] = RIGHT_21;

/// Built-in layouts keyed by string count, then by string number.
static LAYOUTS: Lazy<BTreeMap<usize, BTreeMap<u8, StringRole>>> = Lazy::new(|| {
    fn build(left: &[u8], right: &[u8]) -> BTreeMap<u8, StringRole> {
        let mut roles = BTreeMap::new();
        for (side, numbers) in [(Side::Left, left), (Side::Right, right)] {
            for (i, &number) in numbers.iter().enumerate() {
                roles.insert(number, StringRole::new(side, i as u8 + 1));
            }
        }
        roles
    }

    let mut layouts = BTreeMap::new();
    layouts.insert(21, build(&LEFT_21, &RIGHT_21));
    layouts.insert(22, build(&LEFT_22, &RIGHT_22));
    layouts
});

/// The standard kora bridge layouts with the alternating fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct KoraLayout;

impl KoraLayout {
    /// Role used for string counts without a built-in table.
    pub fn fallback_role(string_number: u8) -> StringRole {
        if string_number % 2 == 1 {
            StringRole::new(Side::Left, string_number.div_ceil(2))
        } else {
            StringRole::new(Side::Right, string_number / 2)
        }
    }

    pub fn has_builtin_layout(string_count: usize) -> bool {
        LAYOUTS.contains_key(&string_count)
    }
}

impl Topology for KoraLayout {
    fn role_for(&self, string_count: usize, string_number: u8) -> StringRole {
        LAYOUTS
            .get(&string_count)
            .and_then(|roles| roles.get(&string_number))
            .copied()
            .unwrap_or_else(|| KoraLayout::fallback_role(string_number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_21_string_layout() {
        let layout = KoraLayout;
        assert_eq!(layout.role_for(21, 1), StringRole::new(Side::Left, 1));
        assert_eq!(layout.role_for(21, 5), StringRole::new(Side::Right, 1));
        assert_eq!(layout.role_for(21, 18), StringRole::new(Side::Left, 11));
        assert_eq!(layout.role_for(21, 21), StringRole::new(Side::Right, 10));
        assert_eq!(layout.left_order(21), LEFT_21.to_vec());
        assert_eq!(layout.right_order(21), RIGHT_21.to_vec());
    }

    #[test]
    fn test_22_string_layout_adds_left_string() {
        let layout = KoraLayout;
        assert_eq!(layout.role_for(22, 22), StringRole::new(Side::Left, 12));
        assert_eq!(layout.left_order(22).len(), 12);
        assert_eq!(layout.right_order(22).len(), 10);
    }

    #[test]
    fn test_fallback_alternates_sides() {
        let layout = KoraLayout;
        assert!(!KoraLayout::has_builtin_layout(7));
        assert_eq!(layout.role_for(7, 1), StringRole::new(Side::Left, 1));
        assert_eq!(layout.role_for(7, 2), StringRole::new(Side::Right, 1));
        assert_eq!(layout.role_for(7, 7), StringRole::new(Side::Left, 4));
        assert_eq!(layout.left_order(7), vec![1, 3, 5, 7]);
        assert_eq!(layout.right_order(7), vec![2, 4, 6]);
    }

    #[test]
    fn test_role_ordering_is_side_then_position() {
        let mut roles = vec![
            StringRole::new(Side::Right, 1),
            StringRole::new(Side::Left, 3),
            StringRole::new(Side::Left, 1),
        ];
        roles.sort();
        assert_eq!(roles[0], StringRole::new(Side::Left, 1));
        assert_eq!(roles[2], StringRole::new(Side::Right, 1));
        assert_eq!(roles[1].label(), "L3");
    }
}
