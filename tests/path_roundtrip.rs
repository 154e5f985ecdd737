//! Wire Path Tests
//!
//! The wire naming convention is the compatibility surface with browser
//! clients:
//! - decode(encode(path)) == path at any depth
//! - malformed names fail with a parse error, never a partial path
//! - DOM ids derived from paths stay stable

use schemaforms::path::{decode, encode, FieldPath, PathError, Segment};
use schemaforms::FormError;

// =============================================================================
// Round Trip
// =============================================================================

/// Alternating fields and indices survive encode/decode at every depth.
#[test]
fn test_round_trip_deep_paths() {
    let mut path = FieldPath::root();
    for depth in 0..8 {
        path = path.child(format!("level{}", depth)).index(depth * 3);
        let encoded = path.encode();
        assert_eq!(decode(&encoded).unwrap(), path, "depth {}", depth);
    }
    assert_eq!(
        path.encode(),
        "level0[0].level1[3].level2[6].level3[9].level4[12].level5[15].level6[18].level7[21]"
    );
}

#[test]
fn test_round_trip_segments() {
    let samples: Vec<Vec<Segment>> = vec![
        vec!["name".into()],
        vec!["address".into(), "city".into()],
        vec!["pets".into(), 0usize.into(), "weight".into()],
        vec!["matrix".into(), 1usize.into(), 2usize.into()],
        vec![
            "departments".into(),
            0usize.into(),
            "teams".into(),
            0usize.into(),
            "members".into(),
            0usize.into(),
            "name".into(),
        ],
    ];

    for segments in samples {
        let encoded = encode(&segments);
        assert_eq!(decode(&encoded).unwrap().segments(), segments.as_slice());
    }
}

#[test]
fn test_from_str_matches_decode() {
    let parsed: FieldPath = "a[0].b[2].c".parse().unwrap();
    assert_eq!(parsed, decode("a[0].b[2].c").unwrap());
    assert_eq!(parsed.to_string(), "a[0].b[2].c");
}

// =============================================================================
// Malformed Names
// =============================================================================

#[test]
fn test_malformed_names_rejected() {
    for bad in ["", "a..b", ".a", "a.", "a[", "a]", "a[x]", "a[-1]", "a[01]", "a[0]b"] {
        assert!(decode(bad).is_err(), "{:?} should not decode", bad);
    }
}

#[test]
fn test_parse_error_converts_to_form_error() {
    let err: FormError = decode("a[x]").unwrap_err().into();
    assert_eq!(err.code(), "FORM_PARSE_ERROR");
    assert!(matches!(err, FormError::Parse(PathError::InvalidIndex { .. })));
}

// =============================================================================
// DOM Ids
// =============================================================================

#[test]
fn test_dom_ids() {
    assert_eq!(decode("pets[0].weight").unwrap().to_dom_id(), "pets-0-weight");
    assert_eq!(decode("first_name").unwrap().to_dom_id(), "first_name");
}
