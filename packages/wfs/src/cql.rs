//! CQL filter builders for the three flood feature types.
//!
//! Values are interpolated into filter text, so every input is validated
//! first: administrative codes must be ASCII digits and names must not
//! contain a single quote.

use flood_map_flood_models::FloodZone;

use crate::WfsError;

/// Length of the city/county prefix of an administrative code.
pub const REGION_CODE_PREFIX_LEN: usize = 5;

/// Lowest facility grade counted as weak.
pub const WEAK_FACILITY_MIN_GRADE: u8 = 3;

/// Validates an administrative code and returns its city/county prefix.
///
/// Codes longer than five digits (e.g. legal-dong codes) are truncated.
///
/// # Errors
///
/// Returns [`WfsError::InvalidInput`] if the code is empty or contains
/// anything other than ASCII digits.
pub fn region_code_prefix(code: &str) -> Result<&str, WfsError> {
    let code = code.trim();
    if code.is_empty() || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(WfsError::InvalidInput {
            message: format!("region code must be ASCII digits, got {code:?}"),
        });
    }
    Ok(&code[..code.len().min(REGION_CODE_PREFIX_LEN)])
}

/// Validates a region name and strips the first `시` and the first `군`.
///
/// The danger-rank layer stores names inconsistently with and without
/// the suffix, so matching is done on the bare stem.
///
/// # Errors
///
/// Returns [`WfsError::InvalidInput`] if the name is blank, contains a
/// single quote, or is empty once stripped.
pub fn region_name_stem(name: &str) -> Result<String, WfsError> {
    let name = name.trim();
    if name.contains('\'') {
        return Err(WfsError::InvalidInput {
            message: format!("region name must not contain quotes, got {name:?}"),
        });
    }

    let stem = name.replacen('시', "", 1).replacen('군', "", 1);
    if stem.trim().is_empty() {
        return Err(WfsError::InvalidInput {
            message: format!("region name is empty, got {name:?}"),
        });
    }
    Ok(stem)
}

/// Fuzzy name filter for the danger-rank layer.
///
/// # Errors
///
/// See [`region_name_stem`].
pub fn danger_name_filter(name: &str) -> Result<String, WfsError> {
    Ok(format!("sigun_nm LIKE '%{}%'", region_name_stem(name)?))
}

/// Code-prefix filter for the flood-trace layer.
///
/// # Errors
///
/// See [`region_code_prefix`].
pub fn trace_filter(code: &str) -> Result<String, WfsError> {
    Ok(format!("stdg_sgg_cd LIKE '{}%'", region_code_prefix(code)?))
}

/// Filter for weak facilities: code prefix, grade of at least
/// [`WEAK_FACILITY_MIN_GRADE`], and at least one flood-zone flag set.
///
/// # Errors
///
/// See [`region_code_prefix`].
pub fn weak_facility_filter(code: &str) -> Result<String, WfsError> {
    let prefix = region_code_prefix(code)?;
    let zones = FloodZone::all()
        .iter()
        .map(|zone| format!("{} = 'Y'", zone.attribute()))
        .collect::<Vec<_>>()
        .join(" OR ");

    Ok(format!(
        "sigun_cd LIKE '{prefix}%' AND flod_dngr_grd >= {WEAK_FACILITY_MIN_GRADE} AND ({zones})"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_prefix_truncates_to_five_digits() {
        assert_eq!(region_code_prefix("4111010100").unwrap(), "41110");
        assert_eq!(region_code_prefix("41110").unwrap(), "41110");
        assert_eq!(region_code_prefix("411").unwrap(), "411");
    }

    #[test]
    fn code_prefix_rejects_non_digits() {
        assert!(region_code_prefix("").is_err());
        assert!(region_code_prefix("41' OR '1'='1").is_err());
        assert!(region_code_prefix("4111a").is_err());
    }

    #[test]
    fn name_stem_strips_first_suffixes() {
        assert_eq!(region_name_stem("수원시").unwrap(), "수원");
        assert_eq!(region_name_stem("가평군").unwrap(), "가평");
        assert_eq!(region_name_stem("시흥시").unwrap(), "흥시");
    }

    #[test]
    fn name_stem_rejects_quotes_and_blanks() {
        assert!(region_name_stem("수원'").is_err());
        assert!(region_name_stem("  ").is_err());
        assert!(region_name_stem("시").is_err());
    }

    #[test]
    fn danger_filter_text() {
        assert_eq!(
            danger_name_filter("수원시").unwrap(),
            "sigun_nm LIKE '%수원%'"
        );
    }

    #[test]
    fn trace_filter_text() {
        assert_eq!(trace_filter("41110").unwrap(), "stdg_sgg_cd LIKE '41110%'");
    }

    #[test]
    fn weak_facility_filter_text() {
        assert_eq!(
            weak_facility_filter("41110").unwrap(),
            "sigun_cd LIKE '41110%' AND flod_dngr_grd >= 3 AND \
             (ntn_rvr_yr200_freq_rnfl_fldn_yn = 'Y' OR \
             lcl_rvr_yr100_freq_rnfl_fldn_yn = 'Y' OR \
             cty_fldn_yr100_freq_rnfl_fldn_yn = 'Y')"
        );
    }
}
