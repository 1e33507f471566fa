//! Property-based tests using proptest
//!
//! These tests verify list query building, identity encoding and the
//! envelope wire shape using randomized inputs.

use arigato::api::query::{build, NAME_KEY, ORG_ID_KEY, PROJECT_ID_KEY};
use arigato::api::FilterSet;
use arigato::apitypes::ServiceResult;
use arigato::identity::{EntropySource, IdentityGenerator, ID, NONCE_LEN};
use arigato::primitive::{Org, Service};
use proptest::prelude::*;
use std::sync::Arc;

struct Fixed([u8; NONCE_LEN]);

impl EntropySource for Fixed {
    fn nonce(&self) -> [u8; NONCE_LEN] {
        self.0
    }
}

/// Generate an org ID from a name and a nonce
fn arb_id() -> impl Strategy<Value = ID> + Clone {
    ("[a-z][a-z0-9-]{0,20}", any::<[u8; NONCE_LEN]>()).prop_map(|(name, nonce)| {
        IdentityGenerator::new(Arc::new(Fixed(nonce)))
            .generate(&Org { name })
            .unwrap()
    })
}

/// A dimension that may be absent, empty or populated
fn arb_dimension<T: std::fmt::Debug + Clone>(
    item: impl Strategy<Value = T> + Clone + 'static,
) -> impl Strategy<Value = Option<Vec<T>>> {
    prop_oneof![
        Just(None),
        Just(Some(Vec::new())),
        prop::collection::vec(item, 1..6).prop_map(Some),
    ]
}

fn arb_filters() -> impl Strategy<Value = FilterSet> {
    (
        arb_dimension(arb_id()),
        arb_dimension(arb_id()),
        arb_dimension("[a-zA-Z0-9 &=+_-]{1,12}"),
    )
        .prop_map(|(org_ids, project_ids, names)| FilterSet {
            org_ids,
            project_ids,
            names,
        })
}

fn as_strs(values: &[String]) -> Vec<&str> {
    values.iter().map(String::as_str).collect()
}

fn len_of<T>(dimension: &Option<Vec<T>>) -> usize {
    dimension.as_ref().map(Vec::len).unwrap_or(0)
}

proptest! {
    /// Absent or empty dimensions never produce a key
    #[test]
    fn empty_dimensions_are_omitted(filters in arb_filters()) {
        let query = filters.to_query();
        for (key, len) in [
            (ORG_ID_KEY, len_of(&filters.org_ids)),
            (PROJECT_ID_KEY, len_of(&filters.project_ids)),
            (NAME_KEY, len_of(&filters.names)),
        ] {
            prop_assert_eq!(query.contains_key(key), len > 0);
            prop_assert!(query.pairs().iter().all(|(k, v)| k != key || !v.is_empty()));
        }
    }

    /// One entry per value, in input order
    #[test]
    fn values_keep_order_and_multiplicity(filters in arb_filters()) {
        let query = filters.to_query();

        let orgs: Vec<String> = filters.org_ids.iter().flatten().map(ID::to_string).collect();
        let projects: Vec<String> = filters
            .project_ids
            .iter()
            .flatten()
            .map(ID::to_string)
            .collect();
        let names: Vec<String> = filters.names.iter().flatten().cloned().collect();

        prop_assert_eq!(query.get_all(ORG_ID_KEY).collect::<Vec<_>>(), as_strs(&orgs));
        prop_assert_eq!(query.get_all(PROJECT_ID_KEY).collect::<Vec<_>>(), as_strs(&projects));
        prop_assert_eq!(query.get_all(NAME_KEY).collect::<Vec<_>>(), as_strs(&names));
        prop_assert_eq!(query.pairs().len(), orgs.len() + projects.len() + names.len());
    }

    /// Same input always encodes to the same string
    #[test]
    fn encoding_is_stable(filters in arb_filters()) {
        let direct = build(
            filters.org_ids.as_deref(),
            filters.project_ids.as_deref(),
            filters.names.as_deref(),
        );
        prop_assert_eq!(filters.to_query().encode(), direct.encode());
        prop_assert_eq!(filters.clone().to_query().encode(), filters.to_query().encode());
    }

    /// Encoded queries decode back to the same pairs
    #[test]
    fn encoding_survives_form_decoding(filters in arb_filters()) {
        let query = filters.to_query();
        let encoded = query.encode();
        let decoded: Vec<(String, String)> = url::form_urlencoded::parse(encoded.as_bytes())
            .into_owned()
            .collect();
        prop_assert_eq!(decoded.as_slice(), query.pairs());
    }

    /// ID string form parses back to the same ID
    #[test]
    fn id_string_form_round_trips(id in arb_id()) {
        let s = id.to_string();
        prop_assert_eq!(s.len(), 29);
        prop_assert_eq!(s.parse::<ID>().unwrap(), id);
    }

    /// Distinct nonces give distinct IDs for the same body
    #[test]
    fn nonce_separates_identical_bodies(
        name in "[a-z]{1,10}",
        a in any::<[u8; NONCE_LEN]>(),
        b in any::<[u8; NONCE_LEN]>(),
    ) {
        prop_assume!(a != b);
        let body = Org { name };
        let first = IdentityGenerator::new(Arc::new(Fixed(a))).generate(&body).unwrap();
        let second = IdentityGenerator::new(Arc::new(Fixed(b))).generate(&body).unwrap();
        prop_assert_ne!(first, second);
    }

    /// Envelopes survive the wire format unchanged
    #[test]
    fn envelope_wire_round_trip(
        id in arb_id(),
        org_id in arb_id(),
        project_id in arb_id(),
        version in any::<u8>(),
        name in "\\PC{0,20}",
    ) {
        let envelope = ServiceResult {
            id,
            version,
            body: Service { name, org_id, project_id },
        };
        let wire = serde_json::to_string(&envelope).unwrap();
        let back: ServiceResult = serde_json::from_str(&wire).unwrap();
        prop_assert_eq!(back, envelope);
    }
}
