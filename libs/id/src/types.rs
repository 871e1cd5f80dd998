//! Typed ID definitions for callback paths and request correlation.

use crate::define_id;

define_id!(
    /// Path segment of an announce endpoint installed on the controller.
    ControllerCallbackId,
    "grm"
);

define_id!(
    /// Path segment of a command endpoint installed on a node.
    NodeCallbackId,
    "rrm"
);

define_id!(
    /// Correlation id carried in the `x-request-id` header of issued commands.
    RequestId,
    "req"
);

/// Extracts a callback id from the last path segment of a callback URL.
///
/// Accepts absolute URLs (`http://host:port/grm_…`) as well as bare paths
/// (`/grm_…`). Trailing slashes are ignored.
pub fn callback_id_from_url<T: std::str::FromStr<Err = crate::IdError>>(
    url: &str,
) -> Result<T, crate::IdError> {
    let segment = url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();
    segment.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_callback_id_roundtrip() {
        let id = NodeCallbackId::new();
        let s = id.to_string();
        let parsed: NodeCallbackId = s.parse().unwrap();
        assert_eq!(id, parsed);
        assert!(s.starts_with("rrm_"));
    }

    #[test]
    fn test_controller_id_rejects_node_prefix() {
        let node = NodeCallbackId::new().to_string();
        let result: Result<ControllerCallbackId, _> = node.parse();
        assert!(matches!(
            result.unwrap_err(),
            crate::IdError::InvalidPrefix { expected: "grm", .. }
        ));
    }

    #[test]
    fn test_missing_separator() {
        let result: Result<RequestId, _> = "req01HV4Z2WQXKJNM8GPQY6VBKC3D".parse();
        assert!(matches!(
            result.unwrap_err(),
            crate::IdError::MissingSeparator
        ));
    }

    #[test]
    fn test_empty() {
        let result: Result<RequestId, _> = "".parse();
        assert!(matches!(result.unwrap_err(), crate::IdError::Empty));
    }

    #[test]
    fn test_invalid_ulid() {
        let result: Result<ControllerCallbackId, _> = "grm_invalid".parse();
        assert!(matches!(
            result.unwrap_err(),
            crate::IdError::InvalidUlid(_)
        ));
    }

    #[test]
    fn test_json_is_plain_string() {
        let id = RequestId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        let parsed: RequestId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_callback_id_from_url() {
        let id = ControllerCallbackId::new();
        let url = format!("http://grid.example:8080/{id}");
        let parsed: ControllerCallbackId = callback_id_from_url(&url).unwrap();
        assert_eq!(parsed, id);

        let parsed: ControllerCallbackId = callback_id_from_url(&format!("/{id}/")).unwrap();
        assert_eq!(parsed, id);

        let result: Result<ControllerCallbackId, _> =
            callback_id_from_url("http://grid.example:8080/");
        assert!(result.is_err());
    }

    #[test]
    fn test_all_id_prefixes_unique() {
        let prefixes = [
            ControllerCallbackId::PREFIX,
            NodeCallbackId::PREFIX,
            RequestId::PREFIX,
        ];

        let unique: std::collections::HashSet<_> = prefixes.iter().collect();
        assert_eq!(prefixes.len(), unique.len(), "Duplicate ID prefixes found!");
    }

    proptest! {
        #[test]
        fn prop_fresh_ids_never_collide(count in 2usize..64) {
            let ids: std::collections::HashSet<_> =
                (0..count).map(|_| NodeCallbackId::new()).collect();
            prop_assert_eq!(ids.len(), count);
        }
    }
}
