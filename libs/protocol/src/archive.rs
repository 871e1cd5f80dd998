//! Region archive (OAR) upload parameters.

use serde::{Deserialize, Serialize};

/// Flags controlling how an archive is applied to a region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ArchiveOptions {
    /// Merge into existing content instead of replacing it.
    pub merge: bool,
    /// Do not load the assets contained in the archive.
    pub skip_assets: bool,
    pub offset_x: i32,
    pub offset_y: i32,
    pub offset_z: i32,
    pub flip_x: bool,
    pub flip_y: bool,
    /// Keep parcel ownership from the archive.
    pub use_parcel_ownership: bool,
    /// Only load objects whose owner exists on this grid.
    pub check_ownership: bool,
}

impl ArchiveOptions {
    /// Parses console-style load parameters.
    ///
    /// Parameters are space separated and matched by case-insensitive prefix:
    /// `--skip-assets`, `--merge`, `--OffsetX=<n>`, `--OffsetY=<n>`,
    /// `--OffsetZ=<n>`, `--FlipX`, `--FlipY`, `--UseParcelOwnership`,
    /// `--CheckOwnership`. The value of an offset is whatever follows its
    /// first ten characters; anything unparsable reads as zero. Unrecognised
    /// parameters are ignored.
    pub fn from_console_params(params: &str) -> Self {
        let mut options = Self::default();

        for param in params.split(' ') {
            let lower = param.to_lowercase();
            if lower.starts_with("--skip-assets") {
                options.skip_assets = true;
            }
            if lower.starts_with("--merge") {
                options.merge = true;
            }
            if lower.starts_with("--offsetx") {
                options.offset_x = offset_value(param);
            }
            if lower.starts_with("--offsety") {
                options.offset_y = offset_value(param);
            }
            if lower.starts_with("--offsetz") {
                options.offset_z = offset_value(param);
            }
            if lower.starts_with("--flipx") {
                options.flip_x = true;
            }
            if lower.starts_with("--flipy") {
                options.flip_y = true;
            }
            if lower.starts_with("--useparcelownership") {
                options.use_parcel_ownership = true;
            }
            if lower.starts_with("--checkownership") {
                options.check_ownership = true;
            }
        }

        options
    }
}

fn offset_value(param: &str) -> i32 {
    param
        .get(10..)
        .and_then(|value| value.parse().ok())
        .unwrap_or(0)
}

/// An archive and the flags to apply it with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveUpload {
    /// Raw archive bytes, base64 on the wire.
    #[serde(rename = "Data", with = "base64_bytes")]
    pub data: Vec<u8>,

    #[serde(flatten)]
    pub options: ArchiveOptions,
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded.trim()).map_err(de::Error::custom)
    }
}
