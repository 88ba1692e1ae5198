use alloy_primitives::Bytes;

/// Vanity strings block builders leave in `extra_data`, paired with a
/// display name. Matching is best effort; anything else reports as unknown.
pub const KNOWN_BUILDERS: &[(&str, &str)] = &[
    ("beaverbuild", "beaverbuild"),
    ("Titan", "Titan Builder"),
    ("rsync", "rsync-builder"),
    ("flashbots", "Flashbots"),
    ("builder0x69", "builder0x69"),
    ("bloXroute", "bloXroute"),
    ("penguinbuild", "penguinbuild"),
    ("eth-builder", "eth-builder"),
];

/// Looks for a known builder signature inside a block's `extra_data`.
///
/// Returns `(matched_signature, display_name)`.
pub fn extract_builder(extra_data: &Bytes) -> Option<(&'static str, &'static str)> {
    let text = String::from_utf8_lossy(extra_data);
    KNOWN_BUILDERS
        .iter()
        .find(|(sig, _)| text.contains(sig))
        .copied()
}
