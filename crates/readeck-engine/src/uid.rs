//! Per-extraction random id, used to namespace ephemeral DOM attributes
//! (spec.md §9) so a source page can't forge one ahead of time.

pub fn generate() -> String {
    let bytes: [u8; 4] = rand::random();
    hex::encode(bytes)
}
