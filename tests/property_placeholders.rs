use proptest::prelude::*;
use std::collections::BTreeMap;
use tandem::domain::models::{expand_placeholders, ServiceConfig};

/// Text that cannot itself form a placeholder
fn plain_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 :/._-]{0,16}"
}

proptest! {
    /// Property: every placeholder is replaced and nothing else changes
    #[test]
    fn prop_expansion_replaces_every_placeholder(
        parts in prop::collection::vec(plain_text(), 1..6),
        port in 1u16..,
    ) {
        let template = parts.join("{port}");
        let expanded = expand_placeholders(&template, "127.0.0.1", port);

        prop_assert!(!expanded.contains("{port}"), "expanded still contains {{port}}: {}", expanded);
        prop_assert_eq!(expanded, parts.join(port.to_string().as_str()));
    }

    /// Property: host and port placeholders expand independently
    #[test]
    fn prop_host_and_port_both_expand(
        prefix in plain_text(),
        host in "[a-z]{1,10}(\\.[a-z]{1,5}){0,2}",
        port in 1u16..,
    ) {
        let template = format!("{prefix}http://{{host}}:{{port}}");
        let expanded = expand_placeholders(&template, &host, port);

        prop_assert_eq!(expanded, format!("{prefix}http://{host}:{port}"));
    }

    /// Property: templates without placeholders pass through unchanged
    #[test]
    fn prop_plain_text_is_untouched(text in plain_text(), port in 1u16..) {
        prop_assert_eq!(expand_placeholders(&text, "localhost", port), text);
    }

    /// Property: a spec built from config carries the service's own port in
    /// args and environment, and keeps every overlay key
    #[test]
    fn prop_spec_expands_args_and_env(
        port in 1024u16..,
        keys in prop::collection::btree_set("[A-Z][A-Z_]{0,8}", 0..5),
    ) {
        let mut config = ServiceConfig::default_backend();
        config.port = port;
        config.env = keys
            .iter()
            .map(|key| (key.clone(), "http://{host}:{port}".to_string()))
            .collect::<BTreeMap<_, _>>();

        let spec = config.to_spec();

        prop_assert_eq!(spec.port(), port);
        prop_assert!(spec.args().contains(&port.to_string()));
        prop_assert!(spec.args().iter().all(|arg| !arg.contains('{')), "args still contain braces: {:?}", spec.args());
        prop_assert_eq!(spec.env_overlay().len(), keys.len());
        let expected = format!("http://127.0.0.1:{port}");
        for value in spec.env_overlay().values() {
            prop_assert_eq!(value, &expected);
        }
    }
}
