//! Tests for the structural comparison of definitions.

#[cfg(test)]
mod tests {
    use crate::diff::{compare, equal, Reason, SkipKeys};
    use crate::fieldpath::Path;
    use crate::value::{from_json, Value};

    fn json(s: &str) -> Value {
        from_json(s).unwrap()
    }

    fn skip(keys: &[&str]) -> SkipKeys {
        keys.iter().copied().collect()
    }

    #[test]
    fn test_metadata_and_status_are_ignored() {
        let expected = json(r#"{"spec":{"host":"a.com","to":{"kind":"Service","name":"svc"}}}"#);
        let actual = json(
            r#"{"spec":{"host":"a.com","to":{"kind":"Service","name":"svc"}},
                "metadata":{"name":"r1"},"status":{}}"#,
        );
        assert!(equal(&expected, &actual, &SkipKeys::new()));
    }

    #[test]
    fn test_scalar_drift_is_detected() {
        let expected = json(r#"{"spec":{"host":"a.com"}}"#);
        let actual = json(r#"{"spec":{"host":"b.com"}}"#);
        assert!(!equal(&expected, &actual, &SkipKeys::new()));

        let m = compare(&expected, &actual, &SkipKeys::new()).unwrap();
        assert_eq!(m.path, Path::parse("spec.host").unwrap());
        assert_eq!(
            m.reason,
            Reason::ValueDiffers {
                expected: Value::from("a.com"),
                actual: Value::from("b.com"),
            }
        );
    }

    #[test]
    fn test_reflexive() {
        let doc = json(
            r#"{"kind":"DeploymentConfig","spec":{"replicas":1,"template":{"spec":{
                "containers":[{"name":"router","ports":[{"containerPort":80}],"env":[{"name":"A","value":"1"}]}]}}},
                "tags":["a","b"]}"#,
        );
        assert!(equal(&doc, &doc, &SkipKeys::new()));
    }

    #[test]
    fn test_keys_only_in_expected_are_tolerated() {
        let expected = json(r#"{"spec":{"host":"a.com"},"extra":true}"#);
        let actual = json(r#"{"spec":{"host":"a.com"}}"#);
        assert!(equal(&expected, &actual, &SkipKeys::new()));
    }

    #[test]
    fn test_missing_top_level_key_fails() {
        let expected = json(r#"{"spec":{"host":"a.com"}}"#);
        let actual = json(r#"{"spec":{"host":"a.com"},"kind":"Route"}"#);
        let m = compare(&expected, &actual, &SkipKeys::new()).unwrap();
        assert_eq!(m.reason, Reason::Missing);
    }

    #[test]
    fn test_nested_key_sets_must_match() {
        // The server defaulted spec.wildcardPolicy.
        let expected = json(r#"{"spec":{"host":"a.com"}}"#);
        let actual = json(r#"{"spec":{"host":"a.com","wildcardPolicy":"None"}}"#);
        let m = compare(&expected, &actual, &SkipKeys::new()).unwrap();
        assert_eq!(
            m.reason,
            Reason::KeysDiffer {
                only_expected: vec![],
                only_actual: vec!["wildcardPolicy".to_string()],
            }
        );

        // Extra keys on the expected side of a nested map fail too.
        let expected = json(r#"{"spec":{"host":"a.com","path":"/"}}"#);
        let actual = json(r#"{"spec":{"host":"a.com"}}"#);
        assert!(!equal(&expected, &actual, &SkipKeys::new()));

        assert!(equal(
            &json(r#"{"spec":{"host":"a.com"}}"#),
            &json(r#"{"spec":{"host":"a.com","wildcardPolicy":"None"}}"#),
            &skip(&["wildcardPolicy"]),
        ));
    }

    #[test]
    fn test_skip_applies_at_every_level() {
        let expected = json(
            r#"{"spec":{"template":{"spec":{"containers":[{"name":"r","livenessProbe":{"a":1}}]}}}}"#,
        );
        let actual = json(
            r#"{"spec":{"template":{"spec":{"containers":[{"name":"r","livenessProbe":{"a":2}}],
                "dnsPolicy":"ClusterFirst"}}}}"#,
        );
        assert!(!equal(&expected, &actual, &SkipKeys::new()));
        assert!(equal(&expected, &actual, &skip(&["livenessProbe", "dnsPolicy"])));
    }

    #[test]
    fn test_nested_metadata_is_skipped() {
        let expected = json(r#"{"spec":{"template":{"metadata":{"labels":{"a":"1"}},"spec":{}}}}"#);
        let actual = json(r#"{"spec":{"template":{"metadata":{"labels":{"a":"2"}},"spec":{}}}}"#);
        assert!(equal(&expected, &actual, &SkipKeys::new()));
    }

    #[test]
    fn test_list_of_maps_recurses_by_position() {
        let expected = json(r#"{"ports":[{"port":80,"protocol":"TCP"}]}"#);
        let actual = json(r#"{"ports":[{"port":80,"protocol":"TCP"}]}"#);
        assert!(equal(&expected, &actual, &SkipKeys::new()));

        let actual = json(r#"{"ports":[{"port":81,"protocol":"TCP"}]}"#);
        let m = compare(&expected, &actual, &SkipKeys::new()).unwrap();
        assert_eq!(m.path, Path::parse("ports[0].port").unwrap());
    }

    #[test]
    fn test_list_length_mismatch_is_tolerated() {
        let expected = json(r#"{"ports":[{"port":80}]}"#);
        let actual = json(r#"{"ports":[{"port":80},{"port":443}]}"#);
        assert!(equal(&expected, &actual, &SkipKeys::new()));

        let expected = json(r#"{"ports":[{"port":80},{"port":443}]}"#);
        let actual = json(r#"{"ports":[{"port":80}]}"#);
        assert!(equal(&expected, &actual, &SkipKeys::new()));
    }

    #[test]
    fn test_scalar_lists_compare_as_a_whole() {
        let expected = json(r#"{"args":["a","b"]}"#);
        assert!(equal(&expected, &json(r#"{"args":["a","b"]}"#), &SkipKeys::new()));
        assert!(!equal(&expected, &json(r#"{"args":["a","c"]}"#), &SkipKeys::new()));
        // Whole-list comparison means a length difference fails here.
        assert!(!equal(&expected, &json(r#"{"args":["a","b","c"]}"#), &SkipKeys::new()));
    }

    #[test]
    fn test_empty_actual_list_always_matches_a_list() {
        let expected = json(r#"{"secrets":[{"name":"a"}]}"#);
        let actual = json(r#"{"secrets":[]}"#);
        assert!(equal(&expected, &actual, &SkipKeys::new()));
    }

    #[test]
    fn test_kind_mismatches() {
        let actual = json(r#"{"ports":[{"port":80}]}"#);
        let m = compare(&json(r#"{"ports":"80"}"#), &actual, &SkipKeys::new()).unwrap();
        assert_eq!(
            m.reason,
            Reason::KindMismatch {
                expected: "string",
                actual: "list",
            }
        );
        assert!(!equal(&json(r#"{}"#), &actual, &SkipKeys::new()));
        assert!(!equal(
            &json(r#"{"spec":[]}"#),
            &json(r#"{"spec":{}}"#),
            &SkipKeys::new()
        ));
    }

    #[test]
    fn test_non_map_roots() {
        assert!(equal(&Value::Int(1), &Value::Int(1), &SkipKeys::new()));
        assert!(!equal(&Value::Int(1), &Value::Int(2), &SkipKeys::new()));
        assert!(!equal(&Value::Null, &Value::empty_map(), &SkipKeys::new()));
    }
}
