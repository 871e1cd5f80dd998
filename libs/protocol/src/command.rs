//! Controller-to-node lifecycle commands.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ArchiveUpload, Envelope};

/// Wire value of the `Type` field of a `Shutdown` command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShutdownKind {
    #[default]
    Immediate,
    Delayed,
}

/// How a node should close a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownDirective {
    /// Close now, without warning connected sessions.
    Immediate,
    /// Warn connected sessions, then close after `seconds`.
    Delayed { seconds: u32 },
}

impl ShutdownDirective {
    /// The grace period to announce before closing, if any.
    ///
    /// A delayed shutdown of zero seconds behaves like an immediate one.
    pub fn grace_period(&self) -> Option<Duration> {
        match *self {
            ShutdownDirective::Delayed { seconds } if seconds > 0 => {
                Some(Duration::from_secs(u64::from(seconds)))
            }
            _ => None,
        }
    }
}

/// A lifecycle command addressed to one region's callback endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "Method")]
pub enum Command {
    /// Close the region.
    Shutdown {
        #[serde(rename = "Type", default)]
        kind: ShutdownKind,
        #[serde(rename = "Seconds", default, skip_serializing_if = "Option::is_none")]
        seconds: Option<u32>,
    },

    /// Bring the region online.
    Start,

    /// Persist whether the region starts with its simulator.
    ChangeStartupStatus {
        #[serde(rename = "StatusEnabled")]
        enabled: bool,
    },

    StartScripts,

    StopScripts,

    /// Apply a region archive.
    #[serde(rename = "LoadOAR")]
    LoadOar(ArchiveUpload),
}

impl Command {
    /// Builds a `Shutdown` command for the given directive.
    pub fn shutdown(directive: ShutdownDirective) -> Self {
        match directive {
            ShutdownDirective::Immediate => Command::Shutdown {
                kind: ShutdownKind::Immediate,
                seconds: None,
            },
            ShutdownDirective::Delayed { seconds } => Command::Shutdown {
                kind: ShutdownKind::Delayed,
                seconds: Some(seconds),
            },
        }
    }

    /// The shutdown directive of a `Shutdown` command.
    ///
    /// `Seconds` is only meaningful for delayed shutdowns; a delayed shutdown
    /// without it waits zero seconds.
    pub fn shutdown_directive(&self) -> Option<ShutdownDirective> {
        match *self {
            Command::Shutdown {
                kind: ShutdownKind::Immediate,
                ..
            } => Some(ShutdownDirective::Immediate),
            Command::Shutdown {
                kind: ShutdownKind::Delayed,
                seconds,
            } => Some(ShutdownDirective::Delayed {
                seconds: seconds.unwrap_or(0),
            }),
            _ => None,
        }
    }
}

impl Envelope for Command {
    const METHODS: &'static [&'static str] = &[
        "Shutdown",
        "Start",
        "ChangeStartupStatus",
        "StartScripts",
        "StopScripts",
        "LoadOAR",
    ];

    fn method(&self) -> &'static str {
        match self {
            Command::Shutdown { .. } => "Shutdown",
            Command::Start => "Start",
            Command::ChangeStartupStatus { .. } => "ChangeStartupStatus",
            Command::StartScripts => "StartScripts",
            Command::StopScripts => "StopScripts",
            Command::LoadOar(_) => "LoadOAR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ArchiveOptions, ProtocolError};
    use proptest::prelude::*;
    use rstest::rstest;

    fn upload(data: &[u8]) -> ArchiveUpload {
        ArchiveUpload {
            data: data.to_vec(),
            options: ArchiveOptions {
                merge: true,
                offset_x: -16,
                offset_z: 42,
                flip_y: true,
                check_ownership: true,
                ..Default::default()
            },
        }
    }

    #[rstest]
    #[case::shutdown_immediate(Command::shutdown(ShutdownDirective::Immediate))]
    #[case::shutdown_delayed(Command::shutdown(ShutdownDirective::Delayed { seconds: 60 }))]
    #[case::start(Command::Start)]
    #[case::startup_status(Command::ChangeStartupStatus { enabled: false })]
    #[case::start_scripts(Command::StartScripts)]
    #[case::stop_scripts(Command::StopScripts)]
    #[case::load_oar(Command::LoadOar(upload(b"\x1f\x8b\x08\x00archive")))]
    fn test_command_survives_the_wire(#[case] command: Command) {
        let body = command.encode().unwrap();
        let decoded = Command::decode(&body).unwrap();
        assert_eq!(decoded, command);
        assert_eq!(decoded.method(), command.method());
    }

    #[test]
    fn test_shutdown_wire_shape() {
        let json: serde_json::Value = serde_json::from_slice(
            &Command::shutdown(ShutdownDirective::Delayed { seconds: 30 })
                .encode()
                .unwrap(),
        )
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"Method": "Shutdown", "Type": "Delayed", "Seconds": 30})
        );

        let json: serde_json::Value = serde_json::from_slice(
            &Command::shutdown(ShutdownDirective::Immediate).encode().unwrap(),
        )
        .unwrap();
        assert_eq!(json, serde_json::json!({"Method": "Shutdown", "Type": "Immediate"}));
    }

    #[test]
    fn test_load_oar_wire_shape() {
        let json: serde_json::Value =
            serde_json::from_slice(&Command::LoadOar(upload(b"oar")).encode().unwrap()).unwrap();
        assert_eq!(json["Method"], "LoadOAR");
        assert_eq!(json["Data"], "b2Fy");
        assert_eq!(json["Merge"], true);
        assert_eq!(json["OffsetX"], -16);
        assert_eq!(json["CheckOwnership"], true);
    }

    #[rstest]
    #[case(r#"{"Method":"Shutdown","Type":"Immediate"}"#, ShutdownDirective::Immediate)]
    #[case(r#"{"Method":"Shutdown","Type":"Immediate","Seconds":0}"#, ShutdownDirective::Immediate)]
    #[case(r#"{"Method":"Shutdown"}"#, ShutdownDirective::Immediate)]
    #[case(r#"{"Method":"Shutdown","Type":"Delayed","Seconds":90}"#, ShutdownDirective::Delayed { seconds: 90 })]
    #[case(r#"{"Method":"Shutdown","Type":"Delayed"}"#, ShutdownDirective::Delayed { seconds: 0 })]
    fn test_shutdown_directive(#[case] body: &str, #[case] expected: ShutdownDirective) {
        let command = Command::decode(body.as_bytes()).unwrap();
        assert_eq!(command.shutdown_directive(), Some(expected));
    }

    #[test]
    fn test_grace_period() {
        assert_eq!(ShutdownDirective::Immediate.grace_period(), None);
        assert_eq!(ShutdownDirective::Delayed { seconds: 0 }.grace_period(), None);
        assert_eq!(
            ShutdownDirective::Delayed { seconds: 5 }.grace_period(),
            Some(Duration::from_secs(5))
        );
        assert_eq!(Command::Start.shutdown_directive(), None);
    }

    #[rstest]
    #[case::not_json(&b"not json"[..])]
    #[case::array(&br#"["Start"]"#[..])]
    #[case::method_not_string(&br#"{"Method":7}"#[..])]
    #[case::negative_seconds(&br#"{"Method":"Shutdown","Type":"Delayed","Seconds":-5}"#[..])]
    #[case::status_not_bool(&br#"{"Method":"ChangeStartupStatus","StatusEnabled":"yes"}"#[..])]
    #[case::bad_base64(&br#"{"Method":"LoadOAR","Data":"%%%"}"#[..])]
    #[case::offset_not_int(&br#"{"Method":"LoadOAR","Data":"","OffsetX":"north"}"#[..])]
    fn test_malformed(#[case] body: &[u8]) {
        let err = Command::decode(body).unwrap_err();
        assert!(matches!(err, ProtocolError::Malformed(_)), "got {err:?}");
    }

    #[test]
    fn test_missing_and_unknown_method() {
        assert_eq!(
            Command::decode(br#"{"Type":"Immediate"}"#).unwrap_err(),
            ProtocolError::MissingMethod
        );

        let err = Command::decode(br#"{"Method":"Restart"}"#).unwrap_err();
        assert!(err.is_unknown_method());
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let command = Command::decode(br#"{"Method":"Start","Seconds":0}"#).unwrap();
        assert_eq!(command, Command::Start);
    }

    #[test]
    fn test_load_oar_flags_default_when_absent() {
        let command = Command::decode(br#"{"Method":"LoadOAR","Data":"b2Fy"}"#).unwrap();
        let Command::LoadOar(upload) = command else {
            panic!("expected LoadOAR");
        };
        assert_eq!(upload.data, b"oar");
        assert_eq!(upload.options, ArchiveOptions::default());
    }

    proptest! {
        #[test]
        fn prop_archive_bytes_are_preserved(data in proptest::collection::vec(any::<u8>(), 0..512)) {
            let command = Command::LoadOar(ArchiveUpload { data: data.clone(), options: ArchiveOptions::default() });
            let decoded = Command::decode(&command.encode().unwrap()).unwrap();
            let Command::LoadOar(upload) = decoded else {
                panic!("expected LoadOAR");
            };
            prop_assert_eq!(upload.data, data);
        }
    }
}
