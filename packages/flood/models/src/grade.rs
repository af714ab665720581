//! Facility flood-danger grades and flood-zone vocabulary.
//!
//! Grades run from 0 (safe) to 5 (danger) and come from the weak-facility
//! layer's `flod_dngr_grd` attribute.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Grade labels indexed by grade number.
const GRADE_LABELS: [&str; 6] = ["Safe", "Low", "Moderate", "Caution", "Alert", "Danger"];

/// Returns the display label for a facility grade.
///
/// Grades outside the 0-5 table fall back to `"Grade N"`.
#[must_use]
pub fn grade_label(grade: i64) -> String {
    usize::try_from(grade)
        .ok()
        .and_then(|i| GRADE_LABELS.get(i))
        .map_or_else(|| format!("Grade {grade}"), |label| (*label).to_string())
}

/// Stroke and fill colors for a facility marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerColors {
    /// Stroke color.
    pub color: &'static str,
    /// Fill color.
    pub fill_color: &'static str,
}

/// Marker colors by grade: orange for 3, amber for 4, red for 5, gray
/// otherwise.
#[must_use]
pub const fn marker_colors(grade: Option<u8>) -> MarkerColors {
    match grade {
        Some(3) => MarkerColors {
            color: "#ea580c",
            fill_color: "#fb923c",
        },
        Some(4) => MarkerColors {
            color: "#b45309",
            fill_color: "#f59e0b",
        },
        Some(5) => MarkerColors {
            color: "#dc2626",
            fill_color: "#ef4444",
        },
        _ => MarkerColors {
            color: "#6b7280",
            fill_color: "#9ca3af",
        },
    }
}

/// Flood-zone memberships flagged on weak facilities.
///
/// Declared in the fixed order used when attributing the basement floor
/// count to a vulnerability reason.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum FloodZone {
    /// National river, 200-year rainfall flood zone.
    NationalRiver,
    /// Local river, 100-year rainfall flood zone.
    LocalRiver,
    /// Urban inundation, 100-year rainfall flood zone.
    Urban,
}

impl FloodZone {
    /// All zones in attribution order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::NationalRiver, Self::LocalRiver, Self::Urban]
    }

    /// WFS attribute holding the `'Y'`/`'N'` membership flag.
    #[must_use]
    pub const fn attribute(self) -> &'static str {
        match self {
            Self::NationalRiver => "ntn_rvr_yr200_freq_rnfl_fldn_yn",
            Self::LocalRiver => "lcl_rvr_yr100_freq_rnfl_fldn_yn",
            Self::Urban => "cty_fldn_yr100_freq_rnfl_fldn_yn",
        }
    }

    /// Short zone label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NationalRiver => "National river flood",
            Self::LocalRiver => "Local river flood",
            Self::Urban => "Urban flood",
        }
    }

    /// Vulnerability reason without basement information.
    #[must_use]
    pub const fn reason(self) -> &'static str {
        match self {
            Self::NationalRiver => "National river flood zone",
            Self::LocalRiver => "Local river flood zone",
            Self::Urban => "Urban flood zone",
        }
    }

    /// Vulnerability reason enriched with the basement floor count.
    #[must_use]
    pub fn reason_with_basement(self, basement_floors: u32) -> String {
        let prefix = match self {
            Self::NationalRiver => "National river flood expected",
            Self::LocalRiver => "Local river flood expected",
            Self::Urban => "Urban flood expected",
        };
        format!("{prefix} (basement {basement_floors} floors)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_labels_cover_table() {
        assert_eq!(grade_label(0), "Safe");
        assert_eq!(grade_label(3), "Caution");
        assert_eq!(grade_label(5), "Danger");
    }

    #[test]
    fn unknown_grades_fall_back() {
        assert_eq!(grade_label(6), "Grade 6");
        assert_eq!(grade_label(-1), "Grade -1");
    }

    #[test]
    fn marker_colors_by_grade() {
        assert_eq!(marker_colors(Some(5)).color, "#dc2626");
        assert_eq!(marker_colors(Some(3)).fill_color, "#fb923c");
        assert_eq!(marker_colors(Some(1)), marker_colors(None));
    }

    #[test]
    fn zone_order_is_national_local_urban() {
        assert_eq!(
            FloodZone::all(),
            &[FloodZone::NationalRiver, FloodZone::LocalRiver, FloodZone::Urban]
        );
    }

    #[test]
    fn basement_reason_mentions_floor_count() {
        assert_eq!(
            FloodZone::Urban.reason_with_basement(2),
            "Urban flood expected (basement 2 floors)"
        );
    }
}
