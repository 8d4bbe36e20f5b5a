//! Supported-format merging and default codec ordering
//!
//! The negotiation layer offers formats to the remote peer in the order we
//! return them, so the order here is the default codec preference.

use std::collections::HashSet;

use super::codec::SdpVideoFormat;

/// Default codec order: VP8 first for broad compatibility
pub const DEFAULT_CODEC_PRIORITY: [&str; 4] = ["VP8", "VP9", "H264", "AV1X"];

/// Rank of a codec name in the priority table; unknown names rank last
pub fn codec_priority(name: &str) -> usize {
    DEFAULT_CODEC_PRIORITY
        .iter()
        .position(|candidate| *candidate == name)
        .unwrap_or(usize::MAX)
}

/// Stable sort by codec priority
///
/// Formats with equal rank (same codec, or both unknown) keep their relative order.
pub fn sort_by_codec_priority(formats: &mut [SdpVideoFormat]) {
    formats.sort_by_key(|format| codec_priority(&format.name));
}

/// Concatenate backend format lists in order, drop exact duplicates (first
/// occurrence wins) and apply the default codec ordering.
pub fn merge_formats<'a, I>(sources: I) -> Vec<SdpVideoFormat>
where
    I: IntoIterator<Item = &'a [SdpVideoFormat]>,
{
    let mut seen = HashSet::new();
    let mut merged: Vec<SdpVideoFormat> = sources
        .into_iter()
        .flatten()
        .filter(|format| seen.insert(*format))
        .cloned()
        .collect();

    sort_by_codec_priority(&mut merged);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(formats: &[SdpVideoFormat]) -> Vec<&str> {
        formats.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_unknown_codecs_sort_last() {
        let mut formats = vec![
            SdpVideoFormat::new("AV1X"),
            SdpVideoFormat::new("VP8"),
            SdpVideoFormat::new("VP9"),
            SdpVideoFormat::new("Custom1"),
        ];
        sort_by_codec_priority(&mut formats);
        assert_eq!(names(&formats), vec!["VP8", "VP9", "AV1X", "Custom1"]);
    }

    #[test]
    fn test_unknown_codecs_keep_relative_order() {
        let mut formats = vec![
            SdpVideoFormat::new("Zeta"),
            SdpVideoFormat::new("H264"),
            SdpVideoFormat::new("Alpha"),
            SdpVideoFormat::new("VP8"),
        ];
        sort_by_codec_priority(&mut formats);
        assert_eq!(names(&formats), vec!["VP8", "H264", "Zeta", "Alpha"]);
    }

    #[test]
    fn test_sort_is_idempotent() {
        let mut formats = vec![
            SdpVideoFormat::new("H264").param("profile-level-id", "640c1f"),
            SdpVideoFormat::new("Custom1"),
            SdpVideoFormat::new("VP9"),
            SdpVideoFormat::new("H264").param("profile-level-id", "42e01f"),
            SdpVideoFormat::new("VP8"),
        ];
        sort_by_codec_priority(&mut formats);
        let once = formats.clone();
        sort_by_codec_priority(&mut formats);
        assert_eq!(formats, once);
    }

    #[test]
    fn test_same_codec_variants_keep_collection_order() {
        let high = SdpVideoFormat::new("H264").param("profile-level-id", "640c1f");
        let baseline = SdpVideoFormat::new("H264").param("profile-level-id", "42e01f");
        let software = vec![high.clone()];
        let native = vec![SdpVideoFormat::new("VP8"), baseline.clone()];

        let merged = merge_formats([software.as_slice(), native.as_slice()]);
        assert_eq!(merged, vec![SdpVideoFormat::new("VP8"), high, baseline]);
    }

    #[test]
    fn test_merge_drops_exact_duplicates() {
        let software = vec![SdpVideoFormat::new("VP8"), SdpVideoFormat::new("H264")];
        let native = vec![
            SdpVideoFormat::new("H264"),
            SdpVideoFormat::new("H264").param("packetization-mode", "1"),
        ];

        let merged = merge_formats([software.as_slice(), native.as_slice()]);
        assert_eq!(
            merged,
            vec![
                SdpVideoFormat::new("VP8"),
                SdpVideoFormat::new("H264"),
                SdpVideoFormat::new("H264").param("packetization-mode", "1"),
            ]
        );
    }

    #[test]
    fn test_codec_priority_is_case_sensitive() {
        assert_eq!(codec_priority("VP8"), 0);
        assert_eq!(codec_priority("AV1X"), 3);
        assert_eq!(codec_priority("vp8"), usize::MAX);
    }
}
