//! Plain-text rendering of lookup results.

use std::fmt::Write as _;

use flood_map_flood_models::{
    FloodTraceDetail, NO_DATA_LABEL, RegionStats, WeakFacilityDetail, classify,
};
use flood_map_recommend::RankedSolution;
use flood_map_region_models::Region;

fn or_no_data<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| NO_DATA_LABEL.to_string(), |v| v.to_string())
}

/// One line per region: code, name and district count.
#[must_use]
pub fn regions(regions: &[Region]) -> String {
    let mut out = String::new();
    for region in regions {
        let _ = write!(out, "{}  {:<8} {}", region.code, region.id, region.name);
        if !region.districts.is_empty() {
            let _ = write!(out, " ({} districts)", region.districts.len());
        }
        out.push('\n');
    }
    out
}

#[must_use]
pub fn stats(region: &Region, stats: &RegionStats) -> String {
    if let Some(error) = &stats.error {
        return format!("{} ({}): {error}\n", region.name, region.code);
    }

    let level = classify(stats.flood_danger_idx);
    let index = stats
        .flood_danger_idx
        .map_or_else(|| NO_DATA_LABEL.to_string(), |i| format!("{i:.2}"));

    format!(
        "{} ({})\n  Danger index     {index} ({})\n  Danger rank      {}\n  Flood traces     {}\n  Weak facilities  {}\n",
        region.name,
        region.code,
        level.label,
        or_no_data(stats.flood_danger_rank),
        or_no_data(stats.flood_trace_count),
        or_no_data(stats.weak_facility_count),
    )
}

#[must_use]
pub fn recommendations(ranking: &[RankedSolution]) -> String {
    let mut out = String::new();
    for (i, ranked) in ranking.iter().enumerate() {
        let card = ranked.card();
        let priority = if ranked.is_priority { " [priority]" } else { "" };
        let _ = writeln!(
            out,
            "{}. {} (score {}){priority}\n   {}\n   {}",
            i + 1,
            card.title,
            ranked.score,
            card.reason,
            card.tags.join(", ")
        );
    }
    out
}

#[must_use]
pub fn traces(traces: &[FloodTraceDetail]) -> String {
    if traces.is_empty() {
        return "No flood traces recorded.\n".to_string();
    }

    let mut out = String::new();
    for trace in traces {
        let _ = write!(
            out,
            "{}  {}",
            trace.id,
            trace.coordinates.as_deref().unwrap_or("no location")
        );
        if let Some(district) = &trace.district_name {
            let _ = write!(out, "  {district}");
        }
        if let Some(start) = &trace.start_date {
            let _ = write!(out, "  from {start}");
        }
        if let Some(depth) = trace.flood_depth.filter(|d| *d > 0.0) {
            let _ = write!(out, "  depth {depth}cm");
        }
        if let Some(cause) = &trace.cause_detail {
            let _ = write!(out, "  ({cause})");
        }
        out.push('\n');
    }
    out
}

#[must_use]
pub fn facilities(facilities: &[WeakFacilityDetail]) -> String {
    if facilities.is_empty() {
        return "No weak facilities found.\n".to_string();
    }

    let mut out = String::new();
    for facility in facilities {
        let _ = writeln!(
            out,
            "{} [{}] {}  {}",
            facility.facility_name,
            facility.facility_type,
            facility.risk_level.as_deref().unwrap_or(NO_DATA_LABEL),
            facility.address,
        );
        for reason in &facility.vulnerability_reasons {
            let _ = writeln!(out, "    - {reason}");
        }
    }
    out
}
